//! In-process reference host.
//!
//! [`HostWindow`] models a windowed screen: it moves through
//! [`HostState`]s, dispatches lifecycle events to observers on a snapshot
//! (observers commonly remove themselves while handling `Destroyed`), owns an
//! execution queue and a window dim level. Embedders bridging a real platform
//! implement [`Host`] on their own type instead.

use super::lifecycle::{DisplayContext, Host, HostLookup, HostState, LifecycleEvent, LifecycleObserver};
use super::queue::TaskQueue;
use crate::compat::{Orientation, OrientationControl};
use crate::infrastructure::ListenerRegistry;
use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

pub struct HostWindow {
    name: String,
    state: Cell<HostState>,
    observers: ListenerRegistry<dyn LifecycleObserver>,
    queue: Rc<TaskQueue>,
    background_dim: Cell<f32>,
    translucent: Cell<bool>,
    orientation: Cell<Orientation>,
}

impl HostWindow {
    /// Creates a host in the `Created` state with its own queue.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Rc<Self> {
        Self::with_queue(name, TaskQueue::new())
    }

    /// Creates a host sharing an existing queue, as screens of one process do.
    #[must_use]
    pub fn with_queue(name: impl Into<String>, queue: Rc<TaskQueue>) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            state: Cell::new(HostState::Created),
            observers: ListenerRegistry::new(),
            queue,
            background_dim: Cell::new(0.0),
            translucent: Cell::new(false),
            orientation: Cell::new(Orientation::Unspecified),
        })
    }

    /// A windowed display context that resolves back to this host while it
    /// exists.
    #[must_use]
    pub fn context(self: &Rc<Self>) -> Rc<dyn DisplayContext> {
        Rc::new(WindowContext {
            host: Rc::downgrade(self),
            queue: Rc::clone(&self.queue),
        })
    }

    pub fn resume(&self) {
        self.transition(HostState::Resumed, LifecycleEvent::Resumed);
    }

    pub fn pause(&self) {
        self.transition(HostState::Paused, LifecycleEvent::Paused);
    }

    /// Marks the host as finishing. No event is dispatched until `destroy`.
    pub fn finish(&self) {
        if self.state.get() != HostState::Destroyed {
            tracing::debug!(host = %self.name, "host finishing");
            self.state.set(HostState::Finishing);
        }
    }

    /// Destroys the host. A second call is a no-op.
    pub fn destroy(&self) {
        self.transition(HostState::Destroyed, LifecycleEvent::Destroyed);
    }

    fn transition(&self, next: HostState, event: LifecycleEvent) {
        let current = self.state.get();
        if current == HostState::Destroyed || current == next {
            return;
        }
        if current == HostState::Finishing && next != HostState::Destroyed {
            return;
        }
        self.state.set(next);
        tracing::debug!(host = %self.name, %event, observers = self.observers.len(), "host lifecycle");
        for observer in self.observers.snapshot() {
            observer.on_lifecycle(event);
        }
    }

    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    #[must_use]
    pub fn background_dim(&self) -> f32 {
        self.background_dim.get()
    }

    pub fn set_translucent(&self, translucent: bool) {
        self.translucent.set(translucent);
    }
}

impl Host for HostWindow {
    fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> HostState {
        self.state.get()
    }

    fn add_observer(&self, observer: Rc<dyn LifecycleObserver>) {
        self.observers.add(observer);
    }

    fn remove_observer(&self, observer: &Rc<dyn LifecycleObserver>) {
        self.observers.remove(observer);
    }

    fn queue(&self) -> Rc<TaskQueue> {
        Rc::clone(&self.queue)
    }

    fn set_background_dim(&self, amount: f32) {
        self.background_dim.set(amount);
    }
}

impl OrientationControl for HostWindow {
    fn is_translucent(&self) -> bool {
        self.translucent.get()
    }

    fn requested_orientation(&self) -> Orientation {
        self.orientation.get()
    }

    fn set_requested_orientation(&self, orientation: Orientation) {
        self.orientation.set(orientation);
    }
}

impl fmt::Debug for HostWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostWindow")
            .field("name", &self.name)
            .field("state", &self.state.get())
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

// A host dropped without `destroy` still tears down its observers, so a
// shown overlay bound to it is dismissed instead of being kept alive by
// its own binder.
impl Drop for HostWindow {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Display context of a [`HostWindow`]. Holds the host weakly.
struct WindowContext {
    host: Weak<HostWindow>,
    queue: Rc<TaskQueue>,
}

impl DisplayContext for WindowContext {
    fn queue(&self) -> Rc<TaskQueue> {
        Rc::clone(&self.queue)
    }

    fn lookup_host(&self) -> HostLookup {
        match self.host.upgrade() {
            Some(host) => HostLookup::Attached(host),
            None => HostLookup::Detached,
        }
    }
}

/// Application-wide display context with no host behind it.
#[derive(Debug)]
pub struct AppContext {
    queue: Rc<TaskQueue>,
}

impl AppContext {
    #[must_use]
    pub fn new() -> Rc<Self> {
        Self::with_queue(TaskQueue::new())
    }

    #[must_use]
    pub fn with_queue(queue: Rc<TaskQueue>) -> Rc<Self> {
        Rc::new(Self { queue })
    }
}

impl DisplayContext for AppContext {
    fn queue(&self) -> Rc<TaskQueue> {
        Rc::clone(&self.queue)
    }

    fn lookup_host(&self) -> HostLookup {
        HostLookup::Unbound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn recording_observer(log: &Rc<RefCell<Vec<LifecycleEvent>>>) -> Rc<dyn LifecycleObserver> {
        let log = Rc::clone(log);
        Rc::new(move |event: LifecycleEvent| log.borrow_mut().push(event))
    }

    #[test]
    fn observers_see_transitions_once() {
        let host = HostWindow::new("main");
        let log = Rc::new(RefCell::new(Vec::new()));
        host.add_observer(recording_observer(&log));

        host.resume();
        host.resume();
        host.pause();
        host.destroy();
        host.destroy();

        assert_eq!(
            *log.borrow(),
            [LifecycleEvent::Resumed, LifecycleEvent::Paused, LifecycleEvent::Destroyed]
        );
    }

    #[test]
    fn dropping_a_live_host_dispatches_destroyed_once() {
        let host = HostWindow::new("main");
        let log = Rc::new(RefCell::new(Vec::new()));
        host.add_observer(recording_observer(&log));
        host.resume();
        drop(host);
        assert_eq!(*log.borrow(), [LifecycleEvent::Resumed, LifecycleEvent::Destroyed]);

        let host = HostWindow::new("main");
        let log = Rc::new(RefCell::new(Vec::new()));
        host.add_observer(recording_observer(&log));
        host.destroy();
        drop(host);
        assert_eq!(*log.borrow(), [LifecycleEvent::Destroyed]);
    }

    #[test]
    fn finishing_host_is_unusable_and_only_accepts_destroy() {
        let host = HostWindow::new("main");
        host.resume();
        host.finish();
        assert!(!host.is_usable());
        host.resume();
        assert_eq!(host.state(), HostState::Finishing);
        host.destroy();
        assert_eq!(host.state(), HostState::Destroyed);
    }

    #[test]
    fn observer_removing_itself_during_dispatch_is_safe() {
        let host = HostWindow::new("main");
        let slot: Rc<RefCell<Option<Rc<dyn LifecycleObserver>>>> = Rc::new(RefCell::new(None));
        let log = Rc::new(RefCell::new(Vec::new()));

        let observer: Rc<dyn LifecycleObserver> = {
            let host = Rc::downgrade(&host);
            let slot = Rc::clone(&slot);
            Rc::new(move |_event: LifecycleEvent| {
                let me = slot.borrow().clone();
                if let (Some(host), Some(me)) = (host.upgrade(), me) {
                    host.remove_observer(&me);
                }
            })
        };
        *slot.borrow_mut() = Some(Rc::clone(&observer));
        host.add_observer(observer);
        host.add_observer(recording_observer(&log));

        host.destroy();
        assert_eq!(*log.borrow(), [LifecycleEvent::Destroyed]);
        assert_eq!(host.observer_count(), 1);
    }

    #[test]
    fn context_detaches_when_host_is_gone() {
        let host = HostWindow::new("main");
        let context = host.context();
        assert!(matches!(context.lookup_host(), HostLookup::Attached(_)));
        drop(host);
        assert!(matches!(context.lookup_host(), HostLookup::Detached));
    }

    #[test]
    fn app_context_is_unbound() {
        let context = AppContext::new();
        assert!(matches!(context.lookup_host(), HostLookup::Unbound));
    }
}
