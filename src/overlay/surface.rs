//! The live overlay surface.
//!
//! An [`Overlay`] is a cheap, cloneable handle to one surface instance. It
//! owns the surface's current attributes, its content and its state machine:
//!
//! ```text
//! Created ──show──▶ Shown ──cancel──▶ Canceled ──▶ Dismissed
//!    │                 └─────────dismiss────────────▶ ▲
//!    └─────────────────dismiss─────────────────────────┘
//! ```
//!
//! `Dismissed` is terminal. A dismissed instance never shows again; the
//! builder creates a fresh one instead.

use super::binder::HostBinder;
use super::kind::{OverlayKind, SurfaceParts};
use super::listeners::ListenerSet;
use crate::domain::{Animation, ContentRoot, Dimension, Gravity, SurfaceAttributes, View, ViewId};
use crate::host::{Host, HostLookup, LifecycleEvent, LifecycleObserver, TaskId, TaskQueue};
use crate::infrastructure::ListenerRegistry;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Process-unique surface identifier, used in logs.
pub type OverlayId = u64;

static NEXT_OVERLAY_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayState {
    Created,
    Shown,
    /// Cancel listeners are running; dismissal follows.
    Canceled,
    Dismissed,
}

/// How a surface reaches its host.
#[derive(Debug, Clone)]
pub(crate) enum HostLink {
    Windowed(Weak<dyn Host>),
    /// The host was destroyed before or while the surface existed.
    Gone,
    /// Degraded mode: no host, no teardown on host destruction.
    Unbound,
}

impl From<HostLookup> for HostLink {
    fn from(lookup: HostLookup) -> Self {
        match lookup {
            HostLookup::Attached(host) => Self::Windowed(Rc::downgrade(&host)),
            HostLookup::Detached => Self::Gone,
            HostLookup::Unbound => Self::Unbound,
        }
    }
}

struct OverlayInner<K: OverlayKind> {
    id: OverlayId,
    state: Cell<OverlayState>,
    attributes: RefCell<SurfaceAttributes>,
    kind_state: RefCell<K::State>,
    content: ContentRoot,
    listeners: Rc<ListenerSet<K>>,
    presentation: ListenerRegistry<dyn LifecycleObserver>,
    queue: Rc<TaskQueue>,
    host: RefCell<HostLink>,
    binder: RefCell<Option<Rc<HostBinder<K>>>>,
    resume_delay: Duration,
}

pub struct Overlay<K: OverlayKind> {
    inner: Rc<OverlayInner<K>>,
}

impl<K: OverlayKind> Clone for Overlay<K> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<K: OverlayKind> fmt::Debug for Overlay<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Overlay")
            .field("kind", &K::LABEL)
            .field("id", &self.inner.id)
            .field("state", &self.inner.state.get())
            .field("attributes", &*self.inner.attributes.borrow())
            .field("kind_state", &*self.inner.kind_state.borrow())
            .finish_non_exhaustive()
    }
}

impl<K: OverlayKind> Overlay<K> {
    /// Assembles a surface in the `Created` state.
    #[must_use]
    pub fn from_parts(parts: SurfaceParts<K>) -> Self {
        let SurfaceParts {
            attributes,
            content,
            state,
            listeners,
            queue,
            host,
            resume_delay,
        } = parts;
        Self {
            inner: Rc::new(OverlayInner {
                id: NEXT_OVERLAY_ID.fetch_add(1, Ordering::Relaxed),
                state: Cell::new(OverlayState::Created),
                attributes: RefCell::new(attributes),
                kind_state: RefCell::new(state),
                content,
                listeners,
                presentation: ListenerRegistry::new(),
                queue,
                host: RefCell::new(host),
                binder: RefCell::new(None),
                resume_delay,
            }),
        }
    }

    #[must_use]
    pub fn id(&self) -> OverlayId {
        self.inner.id
    }

    #[must_use]
    pub fn state(&self) -> OverlayState {
        self.inner.state.get()
    }

    #[must_use]
    pub fn is_showing(&self) -> bool {
        self.state() == OverlayState::Shown
    }

    #[must_use]
    pub fn is_dismissed(&self) -> bool {
        self.state() == OverlayState::Dismissed
    }

    /// Current attributes (a copy).
    #[must_use]
    pub fn attributes(&self) -> SurfaceAttributes {
        *self.inner.attributes.borrow()
    }

    #[must_use]
    pub fn animation(&self) -> Animation {
        self.inner.attributes.borrow().animation
    }

    #[must_use]
    pub fn content(&self) -> &ContentRoot {
        &self.inner.content
    }

    #[must_use]
    pub fn find_view(&self, id: ViewId) -> Option<Rc<View>> {
        self.inner.content.find_view(id)
    }

    #[must_use]
    pub fn kind_state(&self) -> K::State {
        self.inner.kind_state.borrow().clone()
    }

    pub(crate) fn replace_kind_state(&self, state: K::State) -> K::State {
        self.inner.kind_state.replace(state)
    }

    /// The host this surface is attached to, if it is still alive.
    #[must_use]
    pub fn host(&self) -> Option<Rc<dyn Host>> {
        match &*self.inner.host.borrow() {
            HostLink::Windowed(host) => host.upgrade(),
            HostLink::Gone | HostLink::Unbound => None,
        }
    }

    /// Whether the surface runs without a host (degraded mode).
    #[must_use]
    pub fn is_unbound(&self) -> bool {
        matches!(*self.inner.host.borrow(), HostLink::Unbound)
    }

    /// Whether a lifecycle binder currently ties this surface to its host.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.inner.binder.borrow().is_some()
    }

    #[must_use]
    pub fn downgrade(&self) -> WeakOverlay<K> {
        WeakOverlay {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Whether both handles refer to the same surface instance.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn listeners(&self) -> &Rc<ListenerSet<K>> {
        &self.inner.listeners
    }

    pub(crate) fn queue(&self) -> &Rc<TaskQueue> {
        &self.inner.queue
    }

    pub(crate) fn set_binder(&self, binder: Option<Rc<HostBinder<K>>>) {
        *self.inner.binder.borrow_mut() = binder;
    }

    pub fn set_width(&self, width: Dimension) {
        self.update(|attributes| attributes.width = width);
    }

    pub fn set_height(&self, height: Dimension) {
        self.update(|attributes| attributes.height = height);
    }

    pub fn set_gravity(&self, gravity: Gravity) {
        self.update(|attributes| attributes.gravity = gravity);
    }

    pub fn set_x_offset(&self, x_offset: i32) {
        self.update(|attributes| attributes.x_offset = x_offset);
    }

    pub fn set_y_offset(&self, y_offset: i32) {
        self.update(|attributes| attributes.y_offset = y_offset);
    }

    /// While the host is paused the surface keeps its animation suppressed;
    /// a value set meanwhile is applied once the host has resumed.
    pub fn set_animation(&self, animation: Animation) {
        let binder = self.inner.binder.borrow().clone();
        if binder.is_some_and(|binder| binder.note_animation(animation)) {
            return;
        }
        self.apply_animation(animation);
    }

    /// Writes the animation without consulting the binder.
    pub(crate) fn apply_animation(&self, animation: Animation) {
        self.update(|attributes| attributes.animation = animation);
    }

    pub fn set_cancelable(&self, cancelable: bool) {
        self.update(|attributes| attributes.cancelable = cancelable);
    }

    /// Enabling outside-touch cancel also makes the surface cancelable.
    pub fn set_canceled_on_touch_outside(&self, cancel: bool) {
        self.update(|attributes| {
            attributes.canceled_on_touch_outside = cancel;
            if cancel {
                attributes.cancelable = true;
            }
        });
    }

    pub fn set_background_dim_enabled(&self, enabled: bool) {
        self.update(|attributes| attributes.background_dim_enabled = enabled);
    }

    pub fn set_background_dim_amount(&self, amount: f32) {
        self.update(|attributes| attributes.background_dim_amount = amount.clamp(0.0, 1.0));
    }

    fn update(&self, change: impl FnOnce(&mut SurfaceAttributes)) {
        if self.is_dismissed() {
            return;
        }
        change(&mut *self.inner.attributes.borrow_mut());
        if self.is_showing() {
            let host = self.host();
            K::on_attributes_changed(self, host.as_ref());
        }
    }

    /// Presents the surface.
    ///
    /// Only a `Created` surface can be shown. A surface whose host has gone
    /// away or is no longer usable stays hidden.
    pub fn show(&self) {
        if self.state() != OverlayState::Created {
            tracing::trace!(kind = K::LABEL, overlay_id = self.id(), state = ?self.state(), "show ignored");
            return;
        }
        let link = self.inner.host.borrow().clone();
        let host = match link {
            HostLink::Windowed(host) => match host.upgrade() {
                Some(host) if host.is_usable() => Some(host),
                _ => {
                    tracing::debug!(kind = K::LABEL, overlay_id = self.id(), "host unusable, show ignored");
                    return;
                }
            },
            HostLink::Gone => {
                tracing::debug!(kind = K::LABEL, overlay_id = self.id(), "host gone, show ignored");
                return;
            }
            HostLink::Unbound => None,
        };

        self.inner.state.set(OverlayState::Shown);
        if let Some(host) = &host {
            HostBinder::bind(host, self, self.inner.resume_delay);
        }
        tracing::debug!(
            kind = K::LABEL,
            overlay_id = self.id(),
            host = host.as_ref().map(|host| host.name()),
            "overlay shown"
        );
        K::on_shown(self, host.as_ref());

        for listener in self.inner.listeners.show.snapshot() {
            listener.on_show(self);
        }
        if self.is_showing() {
            self.notify_presentation(LifecycleEvent::Resumed);
        }
    }

    /// Cancels a shown surface: cancel listeners fire, then it is dismissed.
    pub fn cancel(&self) {
        if !self.is_showing() {
            return;
        }
        self.inner.state.set(OverlayState::Canceled);
        tracing::debug!(kind = K::LABEL, overlay_id = self.id(), "overlay canceled");
        for listener in self.inner.listeners.cancel.snapshot() {
            listener.on_cancel(self);
        }
        self.dismiss();
    }

    /// Dismisses the surface. A second call is a no-op.
    ///
    /// Focus is released first, then dismiss listeners fire, then the host
    /// binder is torn down and finally the surface's resources are released.
    /// A surface dismissed before it was ever shown fires no dismiss listeners
    /// and drops every post still waiting for a first show.
    pub fn dismiss(&self) {
        let previous = self.inner.state.replace(OverlayState::Dismissed);
        if previous == OverlayState::Dismissed {
            return;
        }
        let presented = previous != OverlayState::Created;

        if self.inner.content.release_focus() {
            tracing::trace!(overlay_id = self.id(), "input focus released");
        }

        if presented {
            for listener in self.inner.listeners.dismiss.snapshot() {
                listener.on_dismiss(self);
            }
        } else {
            for post in self.inner.listeners.take_pending() {
                post.discard();
            }
        }

        let binder = self.inner.binder.borrow_mut().take();
        if let Some(binder) = binder {
            binder.unbind();
        }

        if presented {
            let host = self.host();
            K::on_released(self, host.as_ref());
            self.notify_presentation(LifecycleEvent::Destroyed);
        }
        *self.inner.host.borrow_mut() = HostLink::Gone;
        self.inner.presentation.clear();
        tracing::debug!(kind = K::LABEL, overlay_id = self.id(), presented, "overlay dismissed");
    }

    /// Dispatches a click on the view `id` to its click listeners.
    ///
    /// Returns `true` if at least one listener ran. Clicks on a surface that
    /// is not showing are dropped.
    pub fn perform_click(&self, id: ViewId) -> bool {
        if !self.is_showing() {
            tracing::trace!(overlay_id = self.id(), %id, "stale click dropped");
            return false;
        }
        let Some(view) = self.find_view(id) else {
            return false;
        };
        let listeners = self.inner.listeners.click_snapshot(id);
        if listeners.is_empty() {
            return false;
        }
        for listener in listeners {
            listener.on_click(self, &view);
        }
        true
    }

    /// Queues `task` to run while this surface is still showing.
    ///
    /// Returns `None` if the surface is not showing now. A queued task whose
    /// surface has been dismissed by the time it is due is skipped.
    pub fn post(&self, task: impl FnOnce() + 'static) -> Option<TaskId> {
        let task = self.guarded(task)?;
        Some(self.inner.queue.post(task))
    }

    pub fn post_delayed(&self, task: impl FnOnce() + 'static, delay: Duration) -> Option<TaskId> {
        let task = self.guarded(task)?;
        Some(self.inner.queue.post_delayed(task, delay))
    }

    /// Like [`post`](Self::post), at an absolute queue uptime.
    pub fn post_at(&self, task: impl FnOnce() + 'static, uptime: Duration) -> Option<TaskId> {
        let task = self.guarded(task)?;
        Some(self.inner.queue.post_at(task, uptime))
    }

    fn guarded(&self, task: impl FnOnce() + 'static) -> Option<impl FnOnce() + 'static> {
        if !self.is_showing() {
            return None;
        }
        let overlay = self.downgrade();
        Some(move || {
            if overlay.upgrade().is_some_and(|overlay| overlay.is_showing()) {
                task();
            }
        })
    }

    /// Observes the surface's own presentation: `Resumed` once shown,
    /// `Destroyed` once a shown surface is dismissed.
    pub fn add_presentation_observer(&self, observer: Rc<dyn LifecycleObserver>) -> bool {
        if self.is_dismissed() {
            return false;
        }
        self.inner.presentation.add(observer)
    }

    pub fn remove_presentation_observer(&self, observer: &Rc<dyn LifecycleObserver>) -> bool {
        self.inner.presentation.remove(observer)
    }

    fn notify_presentation(&self, event: LifecycleEvent) {
        for observer in self.inner.presentation.snapshot() {
            observer.on_lifecycle(event);
        }
    }
}

/// Non-owning handle to a surface.
pub struct WeakOverlay<K: OverlayKind> {
    inner: Weak<OverlayInner<K>>,
}

impl<K: OverlayKind> WeakOverlay<K> {
    #[must_use]
    pub fn upgrade(&self) -> Option<Overlay<K>> {
        self.inner.upgrade().map(|inner| Overlay { inner })
    }

    /// Whether the surface has been freed.
    #[must_use]
    pub fn is_reclaimed(&self) -> bool {
        self.inner.strong_count() == 0
    }
}

impl<K: OverlayKind> Clone for WeakOverlay<K> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<K: OverlayKind> fmt::Debug for WeakOverlay<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakOverlay")
            .field("kind", &K::LABEL)
            .field("reclaimed", &self.is_reclaimed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OverlayDefaults, OverlayDescriptor};
    use crate::host::HostWindow;
    use crate::overlay::Modal;

    fn parts(host: HostLink, queue: Rc<TaskQueue>) -> SurfaceParts<Modal> {
        let mut descriptor = OverlayDescriptor::new(&OverlayDefaults::default());
        descriptor.set_content(ContentRoot::new(View::with_id(ViewId(1))));
        SurfaceParts {
            attributes: descriptor.resolve().unwrap(),
            content: descriptor.content.clone().unwrap(),
            state: (),
            listeners: Rc::new(ListenerSet::new()),
            queue,
            host,
            resume_delay: Duration::from_millis(100),
        }
    }

    fn unbound() -> Overlay<Modal> {
        Overlay::from_parts(parts(HostLink::Unbound, TaskQueue::new()))
    }

    #[test]
    fn walks_the_state_machine() {
        let overlay = unbound();
        assert_eq!(overlay.state(), OverlayState::Created);
        overlay.show();
        assert!(overlay.is_showing());
        overlay.cancel();
        assert!(overlay.is_dismissed());
        overlay.show();
        assert!(overlay.is_dismissed());
    }

    #[test]
    fn cancel_requires_shown() {
        let overlay = unbound();
        overlay.cancel();
        assert_eq!(overlay.state(), OverlayState::Created);
    }

    #[test]
    fn gone_host_keeps_surface_hidden() {
        let overlay = Overlay::from_parts(parts(HostLink::Gone, TaskQueue::new()));
        overlay.show();
        assert_eq!(overlay.state(), OverlayState::Created);
    }

    #[test]
    fn show_binds_and_dismiss_unbinds() {
        let host = HostWindow::new("main");
        let as_host: Rc<dyn Host> = host.clone();
        let overlay = Overlay::from_parts(parts(HostLink::Windowed(Rc::downgrade(&as_host)), host.queue()));

        overlay.show();
        assert!(overlay.is_bound());
        assert_eq!(host.observer_count(), 1);

        overlay.dismiss();
        assert!(!overlay.is_bound());
        assert_eq!(host.observer_count(), 0);
        assert!(overlay.host().is_none());
    }

    #[test]
    fn posts_are_skipped_once_dismissed() {
        let queue = TaskQueue::new();
        let overlay = Overlay::from_parts(parts(HostLink::Unbound, Rc::clone(&queue)));
        let ran = Rc::new(Cell::new(false));

        let flag = Rc::clone(&ran);
        assert!(overlay.post(move || flag.set(true)).is_none());

        overlay.show();
        let flag = Rc::clone(&ran);
        assert!(overlay.post_delayed(move || flag.set(true), Duration::from_millis(10)).is_some());
        overlay.dismiss();
        queue.advance(Duration::from_millis(10));
        assert!(!ran.get());
    }

    #[test]
    fn live_setters_are_ignored_after_dismiss() {
        let overlay = unbound();
        overlay.show();
        overlay.set_x_offset(12);
        overlay.dismiss();
        overlay.set_x_offset(40);
        assert_eq!(overlay.attributes().x_offset, 12);
    }

    #[test]
    fn presentation_observers_see_resume_then_destroy() {
        let overlay = unbound();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let observer: Rc<dyn LifecycleObserver> = {
            let seen = Rc::clone(&seen);
            Rc::new(move |event: LifecycleEvent| seen.borrow_mut().push(event))
        };
        overlay.add_presentation_observer(observer);
        overlay.show();
        overlay.dismiss();
        assert_eq!(*seen.borrow(), [LifecycleEvent::Resumed, LifecycleEvent::Destroyed]);
    }
}
