//! Contracts between overlays and the container that hosts them.
//!
//! The overlay layer needs three things from its host: whether it is still
//! usable, a way to observe its lifecycle, and (from an arbitrary display
//! context) a way to find the host at all. Everything else about the host is
//! opaque.

use super::queue::TaskQueue;
use std::fmt;
use std::rc::Rc;

/// Lifecycle state of a host container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostState {
    Created,
    Resumed,
    Paused,
    /// Teardown has been requested; the host is no longer usable.
    Finishing,
    Destroyed,
}

impl HostState {
    /// Whether overlays may still be shown or dismissed against this host.
    #[must_use]
    pub const fn is_usable(self) -> bool {
        !matches!(self, Self::Finishing | Self::Destroyed)
    }
}

/// Lifecycle notifications delivered to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    Resumed,
    Paused,
    Destroyed,
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resumed => write!(f, "resumed"),
            Self::Paused => write!(f, "paused"),
            Self::Destroyed => write!(f, "destroyed"),
        }
    }
}

/// Receives lifecycle notifications from a host or from an overlay's own
/// presentation.
pub trait LifecycleObserver {
    fn on_lifecycle(&self, event: LifecycleEvent);
}

impl<F: Fn(LifecycleEvent)> LifecycleObserver for F {
    fn on_lifecycle(&self, event: LifecycleEvent) {
        self(event);
    }
}

/// A windowed container overlays can be bound to.
pub trait Host {
    /// Short name used in logs.
    fn name(&self) -> &str;

    fn state(&self) -> HostState;

    fn is_usable(&self) -> bool {
        self.state().is_usable()
    }

    /// Registers `observer`. Registering the same `Rc` twice has no effect.
    fn add_observer(&self, observer: Rc<dyn LifecycleObserver>);

    fn remove_observer(&self, observer: &Rc<dyn LifecycleObserver>);

    /// The host's execution queue.
    fn queue(&self) -> Rc<TaskQueue>;

    /// Dims the host's own window, `0.0` meaning not dimmed.
    ///
    /// Used by overlay kinds that do not own a dimmable window.
    fn set_background_dim(&self, amount: f32);
}

/// Outcome of resolving a host from a display context.
#[derive(Clone)]
pub enum HostLookup {
    /// The context belongs to a live host.
    Attached(Rc<dyn Host>),
    /// The context belonged to a host that no longer exists.
    Detached,
    /// The context has no host at all (application-wide). Overlays run in
    /// degraded mode, without teardown on host destruction.
    Unbound,
}

impl fmt::Debug for HostLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attached(host) => f.debug_tuple("Attached").field(&host.name()).finish(),
            Self::Detached => write!(f, "Detached"),
            Self::Unbound => write!(f, "Unbound"),
        }
    }
}

/// Where an overlay is being built from.
pub trait DisplayContext {
    fn queue(&self) -> Rc<TaskQueue>;

    fn lookup_host(&self) -> HostLookup;
}
