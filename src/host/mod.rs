//! Host containers and the execution queue overlays run on.
//!
//! # Modules
//!
//! - [`lifecycle`]: `Host`, `LifecycleObserver` and `DisplayContext` contracts
//! - [`queue`]: single-threaded virtual-clock task queue
//! - [`window`]: `HostWindow` reference host plus windowed and app contexts
//!
//! # Example
//!
//! ```rust
//! use scrim::host::{DisplayContext, HostLookup, HostWindow};
//!
//! let host = HostWindow::new("settings");
//! let context = host.context();
//! assert!(matches!(context.lookup_host(), HostLookup::Attached(_)));
//! ```

pub mod lifecycle;
pub mod queue;
pub mod window;

pub use lifecycle::{DisplayContext, Host, HostLookup, HostState, LifecycleEvent, LifecycleObserver};
pub use queue::{TaskId, TaskQueue};
pub use window::{AppContext, HostWindow};
