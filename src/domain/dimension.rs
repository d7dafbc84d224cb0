//! Overlay size values and the layout hints a content root may declare.

use super::gravity::Gravity;
use serde::{Deserialize, Serialize};

/// Width or height of an overlay window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// Size to the content ("auto"). Reconcilable with the content's own hint.
    #[default]
    Wrap,
    /// Fill the host along this axis.
    Fill,
    /// Literal size in pixels.
    Px(u32),
}

impl Dimension {
    /// Whether this is the "auto" sentinel.
    #[must_use]
    pub const fn is_auto(self) -> bool {
        matches!(self, Self::Wrap)
    }

    /// Reconciles a staged size with a size declared by the content root.
    ///
    /// An auto size yields to an explicit content size; anything else wins.
    #[must_use]
    pub fn reconcile(self, declared: Option<Self>) -> Self {
        match (self, declared) {
            (Self::Wrap, Some(declared)) if !declared.is_auto() => declared,
            (staged, _) => staged,
        }
    }
}

/// Layout parameters carried by a content root.
///
/// All fields are optional; absent values leave the overlay's own setting in
/// charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LayoutHint {
    pub width: Option<Dimension>,
    pub height: Option<Dimension>,
    pub gravity: Option<Gravity>,
}

impl LayoutHint {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            width: None,
            height: None,
            gravity: None,
        }
    }

    #[must_use]
    pub const fn with_size(mut self, width: Dimension, height: Dimension) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    #[must_use]
    pub const fn with_gravity(mut self, gravity: Gravity) -> Self {
        self.gravity = Some(gravity);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_yields_to_explicit_content_size() {
        assert_eq!(Dimension::Wrap.reconcile(Some(Dimension::Px(320))), Dimension::Px(320));
        assert_eq!(Dimension::Wrap.reconcile(Some(Dimension::Fill)), Dimension::Fill);
    }

    #[test]
    fn explicit_overlay_size_wins_over_content() {
        assert_eq!(Dimension::Px(100).reconcile(Some(Dimension::Fill)), Dimension::Px(100));
        assert_eq!(Dimension::Fill.reconcile(Some(Dimension::Px(10))), Dimension::Fill);
    }

    #[test]
    fn auto_content_hint_changes_nothing() {
        assert_eq!(Dimension::Wrap.reconcile(Some(Dimension::Wrap)), Dimension::Wrap);
        assert_eq!(Dimension::Wrap.reconcile(None), Dimension::Wrap);
    }
}
