//! Infrastructure shared by the host and overlay layers.
//!
//! - [`registry`]: ordered, identity-deduplicated, snapshot-iterated listener
//!   collections used for overlay listeners and host lifecycle observers
//! - [`paths`]: data directory and `~` expansion for config and trace files

pub mod paths;
pub mod registry;

pub use paths::{expand_tilde, get_data_dir};
pub use registry::ListenerRegistry;
