//! Domain layer: value types shared by every overlay kind.
//!
//! Nothing in here knows about hosts, listeners or lifecycle. These are the
//! plain values a builder stages and a surface carries.
//!
//! # Organization
//!
//! - [`error`]: Error types and result aliases
//! - [`gravity`]: Placement gravity and animation styles
//! - [`dimension`]: Overlay sizes and content layout hints
//! - [`content`]: The content tree inflated inside an overlay
//! - [`descriptor`]: The staging model and resolved surface attributes
//!
//! # Examples
//!
//! ```
//! use scrim::domain::{ContentRoot, OverlayDefaults, OverlayDescriptor, View};
//!
//! let mut descriptor = OverlayDescriptor::new(&OverlayDefaults::default());
//! descriptor.set_content(ContentRoot::new(View::new()));
//! assert!(descriptor.resolve().is_some());
//! ```

pub mod content;
pub mod descriptor;
pub mod dimension;
pub mod error;
pub mod gravity;

pub use content::{ContentRoot, View, ViewId, Visibility};
pub use descriptor::{OverlayDefaults, OverlayDescriptor, SurfaceAttributes};
pub use dimension::{Dimension, LayoutHint};
pub use error::{Result, ScrimError};
pub use gravity::{Animation, Gravity};
