//! Transient overlays bound to a host's lifecycle.
//!
//! One generic mechanism serves both overlay kinds: [`Modal`] dialogs and
//! [`Anchored`] popups. Callers configure an [`OverlayBuilder`], which stages
//! values until a live [`Overlay`] surface exists and forwards them afterwards.
//! Showing a surface binds it to its host through a [`HostBinder`], which
//! force-dismisses it when the host is destroyed.
//!
//! # Modules
//!
//! - [`builder`]: the deferred builder
//! - [`surface`]: the live surface and its state machine
//! - [`binder`]: host-lifecycle binding
//! - [`listeners`]: listener contracts and the shared listener set
//! - [`leak_safe`]: weak listener adapters
//! - [`pending`]: posts deferred until first show
//! - [`input`]: key, touch and click dispatch
//! - [`kind`]: overlay kinds
//!
//! # Example
//!
//! ```rust
//! use scrim::domain::{ContentRoot, View};
//! use scrim::host::HostWindow;
//! use scrim::overlay::DialogBuilder;
//! use scrim::Config;
//!
//! let host = HostWindow::new("settings");
//! let mut builder = DialogBuilder::new(host.context(), &Config::default());
//! builder.set_content_view(ContentRoot::new(View::new()));
//! builder.show().unwrap();
//! assert!(builder.is_showing());
//!
//! host.destroy();
//! assert!(!builder.is_showing());
//! ```

pub mod binder;
pub mod builder;
pub mod input;
pub mod kind;
pub mod leak_safe;
pub mod listeners;
pub mod pending;
pub mod surface;

pub use binder::HostBinder;
pub use builder::OverlayBuilder;
pub use input::{Key, KeyAction, KeyEvent, OverlayInput};
pub use kind::{AnchorRect, Anchored, Modal, OverlayKind, Placement, SurfaceParts};
pub use leak_safe::LeakSafe;
pub use listeners::{
    ListenerSet, OnCancelListener, OnClickListener, OnCreateListener, OnDismissListener, OnKeyListener,
    OnShowListener,
};
pub use pending::Schedule;
pub use surface::{Overlay, OverlayId, OverlayState, WeakOverlay};

/// A modal dialog surface.
pub type Dialog = Overlay<Modal>;
/// An anchored popup surface.
pub type Popup = Overlay<Anchored>;
pub type DialogBuilder = OverlayBuilder<Modal>;
pub type PopupBuilder = OverlayBuilder<Anchored>;
