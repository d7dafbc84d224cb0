//! Posts requested before the surface is shown.
//!
//! A builder asked to post work while nothing is showing cannot queue it yet:
//! it has to run relative to the first show. A [`PendingPost`] is a one-shot
//! show listener that, on that show, removes itself and forwards the work to
//! the now live surface.

use super::kind::OverlayKind;
use super::listeners::{ListenerSet, OnShowListener};
use super::surface::Overlay;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

/// When a deferred post runs once it is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// `Delay(Duration::ZERO)` is a plain post.
    Delay(Duration),
    /// Absolute queue uptime.
    At(Duration),
}

pub struct PendingPost<K: OverlayKind> {
    action: RefCell<Option<Box<dyn FnOnce()>>>,
    schedule: Schedule,
    listeners: Weak<ListenerSet<K>>,
}

impl<K: OverlayKind> PendingPost<K> {
    /// Creates the post and hooks it into `listeners`.
    pub(crate) fn register(
        listeners: &Rc<ListenerSet<K>>,
        action: Box<dyn FnOnce()>,
        schedule: Schedule,
    ) -> Rc<Self> {
        let post = Rc::new(Self {
            action: RefCell::new(Some(action)),
            schedule,
            listeners: Rc::downgrade(listeners),
        });
        let as_listener: Rc<dyn OnShowListener<K>> = post.clone();
        listeners.show.add(as_listener);
        listeners.track_pending(Rc::clone(&post));
        tracing::trace!(kind = K::LABEL, ?schedule, "post deferred until first show");
        post
    }

    #[must_use]
    pub const fn schedule(&self) -> Schedule {
        self.schedule
    }

    /// Drops the work without running it.
    pub(crate) fn discard(&self) {
        if self.action.borrow_mut().take().is_some() {
            tracing::trace!(kind = K::LABEL, "deferred post discarded");
        }
        self.detach();
    }

    fn detach(&self) {
        let addr = (self as *const Self).cast::<()>();
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.show.remove_addr(addr);
            listeners.untrack_pending(addr);
        }
    }
}

impl<K: OverlayKind> OnShowListener<K> for PendingPost<K> {
    fn on_show(&self, overlay: &Overlay<K>) {
        self.detach();
        let Some(action) = self.action.borrow_mut().take() else {
            return;
        };
        let posted = match self.schedule {
            Schedule::Delay(delay) if delay.is_zero() => overlay.post(action),
            Schedule::Delay(delay) => overlay.post_delayed(action, delay),
            Schedule::At(uptime) => overlay.post_at(action, uptime),
        };
        if posted.is_none() {
            tracing::trace!(overlay_id = overlay.id(), "deferred post dropped, surface not showing");
        }
    }
}

impl<K: OverlayKind> fmt::Debug for PendingPost<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingPost")
            .field("schedule", &self.schedule)
            .field("armed", &self.action.borrow().is_some())
            .finish()
    }
}
