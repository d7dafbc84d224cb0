//! Overlay kinds and the surface construction hook.
//!
//! Dialogs and popups share one mechanism. What differs is captured by an
//! [`OverlayKind`]: per-kind staging defaults, per-kind surface state, and a
//! few hooks around show/release. Screens that need a different surface
//! supply their own kind and override [`OverlayKind::create_surface`]; they
//! never subclass the builder.

use super::listeners::ListenerSet;
use super::surface::{HostLink, Overlay};
use crate::domain::{ContentRoot, Gravity, OverlayDescriptor, SurfaceAttributes};
use crate::host::{Host, TaskQueue};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// Everything a new surface is assembled from.
///
/// Produced by the builder on `create()` and handed to
/// [`OverlayKind::create_surface`].
pub struct SurfaceParts<K: OverlayKind> {
    pub attributes: SurfaceAttributes,
    pub content: ContentRoot,
    pub state: K::State,
    pub(crate) listeners: Rc<ListenerSet<K>>,
    pub(crate) queue: Rc<TaskQueue>,
    pub(crate) host: HostLink,
    pub(crate) resume_delay: Duration,
}

impl<K: OverlayKind> fmt::Debug for SurfaceParts<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceParts")
            .field("kind", &K::LABEL)
            .field("attributes", &self.attributes)
            .field("state", &self.state)
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

pub trait OverlayKind: Sized + 'static {
    /// Kind-specific surface state (placement and the like).
    type State: fmt::Debug + Clone + Default + 'static;

    /// Name used in logs.
    const LABEL: &'static str;

    /// Adjusts a freshly seeded descriptor before the caller configures it.
    fn apply_defaults(_descriptor: &mut OverlayDescriptor) {}

    /// Builds the live surface.
    fn create_surface(parts: SurfaceParts<Self>) -> Overlay<Self> {
        Overlay::from_parts(parts)
    }

    /// Runs after the surface became `SHOWN`, before show listeners fire.
    fn on_shown(_overlay: &Overlay<Self>, _host: Option<&Rc<dyn Host>>) {}

    /// Runs when a shown surface is live-reconfigured.
    fn on_attributes_changed(_overlay: &Overlay<Self>, _host: Option<&Rc<dyn Host>>) {}

    /// Runs when a surface that was shown releases its resources.
    fn on_released(_overlay: &Overlay<Self>, _host: Option<&Rc<dyn Host>>) {}
}

/// Modal, blocking overlay with its own dimmed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modal;

impl OverlayKind for Modal {
    type State = ();

    const LABEL: &'static str = "dialog";
}

/// Rectangle of the host view a drop-down popup hangs from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnchorRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Where an anchored overlay is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// At a host-window location; offsets are added.
    AtLocation { x: i32, y: i32 },
    /// Below an anchor view; offsets are added.
    DropDown { anchor: AnchorRect },
}

/// Anchored, non-blocking overlay (popup).
///
/// It has no window of its own to dim, so background dim is applied to the
/// host window while shown. Dim is off by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Anchored;

impl Anchored {
    fn apply_dim(overlay: &Overlay<Self>, host: Option<&Rc<dyn Host>>) {
        let Some(host) = host else {
            return;
        };
        let attributes = overlay.attributes();
        let amount = if attributes.background_dim_enabled {
            attributes.background_dim_amount
        } else {
            0.0
        };
        host.set_background_dim(amount);
    }
}

impl OverlayKind for Anchored {
    type State = Option<Placement>;

    const LABEL: &'static str = "popup";

    fn apply_defaults(descriptor: &mut OverlayDescriptor) {
        descriptor.background_dim_enabled = false;
    }

    fn on_shown(overlay: &Overlay<Self>, host: Option<&Rc<dyn Host>>) {
        Self::apply_dim(overlay, host);
    }

    fn on_attributes_changed(overlay: &Overlay<Self>, host: Option<&Rc<dyn Host>>) {
        Self::apply_dim(overlay, host);
    }

    fn on_released(_overlay: &Overlay<Self>, host: Option<&Rc<dyn Host>>) {
        if let Some(host) = host {
            host.set_background_dim(0.0);
        }
    }
}

impl Overlay<Anchored> {
    #[must_use]
    pub fn placement(&self) -> Option<Placement> {
        self.kind_state()
    }

    /// Moves a popup. Takes effect immediately.
    pub fn update_placement(&self, placement: Placement) {
        self.replace_kind_state(Some(placement));
        tracing::trace!(overlay_id = self.id(), ?placement, "popup placement updated");
    }

    /// Top-left corner of the popup in host-window coordinates.
    ///
    /// A drop-down hangs below its anchor, left-aligned, or right-aligned when
    /// the gravity is `Right`.
    #[must_use]
    pub fn origin(&self) -> Option<(i32, i32)> {
        let attributes = self.attributes();
        let (x, y) = match self.placement()? {
            Placement::AtLocation { x, y } => (x, y),
            Placement::DropDown { anchor } => {
                let bottom = anchor.y.saturating_add_unsigned(anchor.height);
                let x = if attributes.gravity == Gravity::Right {
                    anchor.x.saturating_add_unsigned(anchor.width)
                } else {
                    anchor.x
                };
                (x, bottom)
            }
        };
        Some((
            x.saturating_add(attributes.x_offset),
            y.saturating_add(attributes.y_offset),
        ))
    }
}
