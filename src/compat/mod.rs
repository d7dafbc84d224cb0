//! Platform compatibility shims.
//!
//! Workarounds for host-platform quirks live here, each behind a capability
//! trait, so the overlay lifecycle never has to know about them.

pub mod orientation;

pub use orientation::{fix_translucent_orientation, Orientation, OrientationControl, AFFECTED_PLATFORM_LEVEL};
