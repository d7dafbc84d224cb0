//! Staging model for overlay configuration.
//!
//! [`OverlayDescriptor`] holds everything a builder has been told before a live
//! surface exists. On creation it is resolved once ([`OverlayDescriptor::resolve`])
//! into the concrete [`SurfaceAttributes`] the surface starts from: unset
//! gravity becomes `Center` (after consulting the content root), unset
//! animation is derived from the resolved gravity, and auto sizes yield to
//! sizes the content root declares.

use super::content::ContentRoot;
use super::dimension::Dimension;
use super::gravity::{Animation, Gravity};
use serde::{Deserialize, Serialize};

/// Default values seeded into every descriptor.
///
/// Deserialized from the `[overlay]` table of the configuration file.
///
/// ```toml
/// [overlay]
/// cancelable = true
/// canceled_on_touch_outside = true
/// background_dim_enabled = true
/// background_dim_amount = 0.5
/// resume_animation_delay_ms = 100
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayDefaults {
    pub cancelable: bool,
    pub canceled_on_touch_outside: bool,
    pub background_dim_enabled: bool,
    /// In `[0.0, 1.0]`; checked by [`Config::validate`](crate::Config::validate).
    pub background_dim_amount: f32,
    /// Delay before a suppressed animation is restored after the host resumes.
    pub resume_animation_delay_ms: u64,
}

impl Default for OverlayDefaults {
    fn default() -> Self {
        Self {
            cancelable: true,
            canceled_on_touch_outside: true,
            background_dim_enabled: true,
            background_dim_amount: 0.5,
            resume_animation_delay_ms: 100,
        }
    }
}

/// Concrete attributes of a live surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceAttributes {
    pub width: Dimension,
    pub height: Dimension,
    pub gravity: Gravity,
    pub x_offset: i32,
    pub y_offset: i32,
    pub animation: Animation,
    pub cancelable: bool,
    pub canceled_on_touch_outside: bool,
    pub background_dim_enabled: bool,
    pub background_dim_amount: f32,
}

/// Overlay configuration staged before (and mirrored after) creation.
#[derive(Debug, Clone)]
pub struct OverlayDescriptor {
    pub width: Dimension,
    pub height: Dimension,
    /// `None` until set explicitly, inferred from content, or resolved.
    pub gravity: Option<Gravity>,
    pub x_offset: i32,
    pub y_offset: i32,
    /// `None` until set explicitly or resolved from gravity.
    pub animation: Option<Animation>,
    pub cancelable: bool,
    pub canceled_on_touch_outside: bool,
    pub background_dim_enabled: bool,
    pub background_dim_amount: f32,
    pub content: Option<ContentRoot>,
}

impl OverlayDescriptor {
    #[must_use]
    pub fn new(defaults: &OverlayDefaults) -> Self {
        Self {
            width: Dimension::Wrap,
            height: Dimension::Wrap,
            gravity: None,
            x_offset: 0,
            y_offset: 0,
            animation: None,
            cancelable: defaults.cancelable,
            canceled_on_touch_outside: defaults.canceled_on_touch_outside,
            background_dim_enabled: defaults.background_dim_enabled,
            background_dim_amount: defaults.background_dim_amount,
            content: None,
        }
    }

    /// Stages a content root and adopts its layout parameters where the
    /// overlay has none of its own.
    pub fn set_content(&mut self, content: ContentRoot) {
        self.adopt_layout(&content);
        self.content = Some(content);
    }

    fn adopt_layout(&mut self, content: &ContentRoot) {
        let layout = content.layout();
        self.width = self.width.reconcile(layout.width);
        self.height = self.height.reconcile(layout.height);
        if self.gravity.is_none() {
            self.gravity = layout.gravity;
        }
    }

    /// Resolves defaults and returns the attributes a new surface starts from.
    ///
    /// Returns `None` when no content root has been staged. Resolution writes
    /// the picked gravity and animation back into the descriptor, so later
    /// calls see them as already chosen and pick nothing again.
    pub fn resolve(&mut self) -> Option<SurfaceAttributes> {
        let content = self.content.clone()?;
        self.adopt_layout(&content);

        let gravity = *self.gravity.get_or_insert(Gravity::Center);
        let animation = *self
            .animation
            .get_or_insert_with(|| Animation::for_gravity(gravity));

        Some(SurfaceAttributes {
            width: self.width,
            height: self.height,
            gravity,
            x_offset: self.x_offset,
            y_offset: self.y_offset,
            animation,
            cancelable: self.cancelable,
            canceled_on_touch_outside: self.canceled_on_touch_outside,
            background_dim_enabled: self.background_dim_enabled,
            background_dim_amount: self.background_dim_amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LayoutHint, View};

    fn content(layout: LayoutHint) -> ContentRoot {
        ContentRoot::new(View::new()).with_layout(layout)
    }

    #[test]
    fn resolve_without_content_yields_nothing() {
        let mut descriptor = OverlayDescriptor::new(&OverlayDefaults::default());
        assert!(descriptor.resolve().is_none());
        assert!(descriptor.gravity.is_none());
    }

    #[test]
    fn unset_gravity_falls_back_to_center_and_fade() {
        let mut descriptor = OverlayDescriptor::new(&OverlayDefaults::default());
        descriptor.set_content(content(LayoutHint::new()));
        let attributes = descriptor.resolve().unwrap();
        assert_eq!(attributes.gravity, Gravity::Center);
        assert_eq!(attributes.animation, Animation::Fade);
    }

    #[test]
    fn content_gravity_drives_default_animation() {
        let mut descriptor = OverlayDescriptor::new(&OverlayDefaults::default());
        descriptor.set_content(content(LayoutHint::new().with_gravity(Gravity::Top)));
        let attributes = descriptor.resolve().unwrap();
        assert_eq!(attributes.gravity, Gravity::Top);
        assert_eq!(attributes.animation, Animation::SlideDown);
    }

    #[test]
    fn explicit_gravity_beats_content_gravity() {
        let mut descriptor = OverlayDescriptor::new(&OverlayDefaults::default());
        descriptor.gravity = Some(Gravity::Left);
        descriptor.set_content(content(LayoutHint::new().with_gravity(Gravity::Bottom)));
        assert_eq!(descriptor.resolve().unwrap().gravity, Gravity::Left);
    }

    #[test]
    fn defaults_are_picked_exactly_once() {
        let mut descriptor = OverlayDescriptor::new(&OverlayDefaults::default());
        descriptor.set_content(content(LayoutHint::new()));
        assert_eq!(descriptor.resolve().unwrap().animation, Animation::Fade);

        // A gravity change after resolution does not re-derive the animation.
        descriptor.gravity = Some(Gravity::Bottom);
        let attributes = descriptor.resolve().unwrap();
        assert_eq!(attributes.gravity, Gravity::Bottom);
        assert_eq!(attributes.animation, Animation::Fade);
    }

    #[test]
    fn auto_size_is_reconciled_with_content_size_set_later() {
        let mut descriptor = OverlayDescriptor::new(&OverlayDefaults::default());
        descriptor.set_content(content(
            LayoutHint::new().with_size(Dimension::Fill, Dimension::Px(200)),
        ));
        let attributes = descriptor.resolve().unwrap();
        assert_eq!(attributes.width, Dimension::Fill);
        assert_eq!(attributes.height, Dimension::Px(200));
    }

    #[test]
    fn explicit_size_is_kept() {
        let mut descriptor = OverlayDescriptor::new(&OverlayDefaults::default());
        descriptor.width = Dimension::Px(300);
        descriptor.set_content(content(
            LayoutHint::new().with_size(Dimension::Fill, Dimension::Fill),
        ));
        let attributes = descriptor.resolve().unwrap();
        assert_eq!(attributes.width, Dimension::Px(300));
        assert_eq!(attributes.height, Dimension::Fill);
    }

    #[test]
    fn defaults_seed_flags() {
        let defaults = OverlayDefaults {
            cancelable: false,
            background_dim_amount: 0.2,
            ..OverlayDefaults::default()
        };
        let mut descriptor = OverlayDescriptor::new(&defaults);
        descriptor.set_content(content(LayoutHint::new()));
        let attributes = descriptor.resolve().unwrap();
        assert!(!attributes.cancelable);
        assert!((attributes.background_dim_amount - 0.2).abs() < f32::EPSILON);
    }
}
