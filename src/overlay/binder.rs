//! Ties a shown surface to its host's lifecycle.
//!
//! A [`HostBinder`] is registered as a lifecycle observer of the host while the
//! surface is shown. It keeps the surface alive for as long as the host might
//! still need to dismiss it, and no longer:
//!
//! - `Paused`: the surface's animation is suppressed, so that coming back to
//!   the screen does not replay the enter animation.
//! - `Resumed`: the animation is restored after a short delay on the queue.
//! - `Destroyed`: the surface is force-dismissed, then the binder removes
//!   itself from the host and drops both references.

use super::kind::OverlayKind;
use super::surface::Overlay;
use crate::domain::Animation;
use crate::host::{Host, LifecycleEvent, LifecycleObserver};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

pub struct HostBinder<K: OverlayKind> {
    me: Weak<Self>,
    host: RefCell<Option<Weak<dyn Host>>>,
    overlay: RefCell<Option<Overlay<K>>>,
    saved_animation: Cell<Option<Animation>>,
    // Bumped on every pause/resume/unbind; a scheduled restore only applies
    // if the epoch it was scheduled in is still current.
    epoch: Cell<u64>,
    resume_delay: Duration,
}

impl<K: OverlayKind> HostBinder<K> {
    /// Binds `overlay` to `host` and records the binder on the overlay.
    pub(crate) fn bind(host: &Rc<dyn Host>, overlay: &Overlay<K>, resume_delay: Duration) -> Rc<Self> {
        let binder = Rc::new_cyclic(|me| Self {
            me: Weak::clone(me),
            host: RefCell::new(Some(Rc::downgrade(host))),
            overlay: RefCell::new(Some(overlay.clone())),
            saved_animation: Cell::new(None),
            epoch: Cell::new(0),
            resume_delay,
        });
        let observer: Rc<dyn LifecycleObserver> = binder.clone();
        host.add_observer(observer);
        overlay.set_binder(Some(Rc::clone(&binder)));
        tracing::trace!(kind = K::LABEL, overlay_id = overlay.id(), host = host.name(), "binder attached");
        binder
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.overlay.borrow().is_some()
    }

    /// Deregisters from the host and drops both references. Idempotent.
    pub fn unbind(&self) {
        let host = self.host.borrow_mut().take();
        let overlay = self.overlay.borrow_mut().take();
        if host.is_none() && overlay.is_none() {
            return;
        }
        self.bump_epoch();
        self.saved_animation.set(None);

        if let (Some(host), Some(me)) = (host.and_then(|host| host.upgrade()), self.me.upgrade()) {
            let me: Rc<dyn LifecycleObserver> = me;
            host.remove_observer(&me);
        }
        if let Some(overlay) = overlay {
            tracing::trace!(kind = K::LABEL, overlay_id = overlay.id(), "binder detached");
        }
    }

    /// Records a caller's animation change while the animation is
    /// suppressed, so the pending restore applies it instead of the value
    /// saved on pause.
    ///
    /// Returns `true` if the change was taken over.
    pub(crate) fn note_animation(&self, animation: Animation) -> bool {
        if self.saved_animation.get().is_none() {
            return false;
        }
        self.saved_animation.set(Some(animation));
        tracing::trace!(?animation, "animation change deferred until restore");
        true
    }

    fn bump_epoch(&self) -> u64 {
        let epoch = self.epoch.get().wrapping_add(1);
        self.epoch.set(epoch);
        epoch
    }

    fn overlay(&self) -> Option<Overlay<K>> {
        self.overlay.borrow().clone()
    }

    fn suppress_animation(&self) {
        let Some(overlay) = self.overlay().filter(Overlay::is_showing) else {
            return;
        };
        self.bump_epoch();
        if self.saved_animation.get().is_none() {
            self.saved_animation.set(Some(overlay.animation()));
        }
        overlay.apply_animation(Animation::None);
        tracing::trace!(overlay_id = overlay.id(), "animation suppressed while host paused");
    }

    fn schedule_restore(&self) {
        let Some(overlay) = self.overlay() else {
            return;
        };
        if self.saved_animation.get().is_none() {
            return;
        }
        let epoch = self.bump_epoch();
        let binder = Weak::clone(&self.me);
        overlay.queue().post_delayed(
            move || {
                if let Some(binder) = binder.upgrade() {
                    binder.restore_animation(epoch);
                }
            },
            self.resume_delay,
        );
    }

    fn restore_animation(&self, epoch: u64) {
        if self.epoch.get() != epoch {
            return;
        }
        let Some(animation) = self.saved_animation.take() else {
            return;
        };
        if let Some(overlay) = self.overlay().filter(Overlay::is_showing) {
            overlay.apply_animation(animation);
            tracing::trace!(overlay_id = overlay.id(), ?animation, "animation restored");
        }
    }

    fn host_destroyed(&self) {
        if let Some(overlay) = self.overlay() {
            tracing::debug!(
                kind = K::LABEL,
                overlay_id = overlay.id(),
                "host destroyed, dismissing overlay"
            );
            overlay.dismiss();
        }
        self.unbind();
    }
}

impl<K: OverlayKind> LifecycleObserver for HostBinder<K> {
    fn on_lifecycle(&self, event: LifecycleEvent) {
        match event {
            LifecycleEvent::Paused => self.suppress_animation(),
            LifecycleEvent::Resumed => self.schedule_restore(),
            LifecycleEvent::Destroyed => self.host_destroyed(),
        }
    }
}

impl<K: OverlayKind> fmt::Debug for HostBinder<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostBinder")
            .field("kind", &K::LABEL)
            .field("bound", &self.is_bound())
            .field("saved_animation", &self.saved_animation.get())
            .finish_non_exhaustive()
    }
}
