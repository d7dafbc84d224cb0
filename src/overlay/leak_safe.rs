//! Weak listener adapters.
//!
//! A surface keeps its listeners alive for as long as it exists, and host
//! machinery can keep a surface alive longer than the screen that built it.
//! A listener that captures that screen would pin it too. [`LeakSafe`] breaks
//! the chain: it holds the real listener weakly, forwards while the listener
//! is alive and silently drops the callback once it has been reclaimed.

use super::input::KeyEvent;
use super::kind::OverlayKind;
use super::listeners::{OnCancelListener, OnDismissListener, OnKeyListener, OnShowListener};
use super::surface::Overlay;
use std::fmt;
use std::rc::{Rc, Weak};

pub struct LeakSafe<L: ?Sized> {
    target: Weak<L>,
}

impl<L: ?Sized> LeakSafe<L> {
    /// Wraps `target` without keeping it alive.
    ///
    /// The caller must hold the returned target's `Rc` for as long as it wants
    /// callbacks.
    ///
    /// ```rust
    /// use scrim::overlay::{LeakSafe, OnDismissListener};
    /// use scrim::Modal;
    /// use std::rc::Rc;
    ///
    /// let listener: Rc<dyn OnDismissListener<Modal>> = Rc::new(|_: &scrim::Dialog| {});
    /// let wrapped = LeakSafe::wrap(&listener);
    /// assert!(!wrapped.is_reclaimed());
    /// drop(listener);
    /// assert!(wrapped.is_reclaimed());
    /// ```
    #[must_use]
    pub fn wrap(target: &Rc<L>) -> Rc<Self> {
        Rc::new(Self {
            target: Rc::downgrade(target),
        })
    }

    #[must_use]
    pub fn is_reclaimed(&self) -> bool {
        self.target.strong_count() == 0
    }

    fn target(&self, callback: &'static str) -> Option<Rc<L>> {
        let target = self.target.upgrade();
        if target.is_none() {
            tracing::trace!(callback, "listener reclaimed, callback dropped");
        }
        target
    }
}

impl<L: ?Sized> fmt::Debug for LeakSafe<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeakSafe")
            .field("reclaimed", &self.is_reclaimed())
            .finish()
    }
}

impl<K: OverlayKind> OnShowListener<K> for LeakSafe<dyn OnShowListener<K>> {
    fn on_show(&self, overlay: &Overlay<K>) {
        if let Some(target) = self.target("show") {
            target.on_show(overlay);
        }
    }
}

impl<K: OverlayKind> OnCancelListener<K> for LeakSafe<dyn OnCancelListener<K>> {
    fn on_cancel(&self, overlay: &Overlay<K>) {
        if let Some(target) = self.target("cancel") {
            target.on_cancel(overlay);
        }
    }
}

impl<K: OverlayKind> OnDismissListener<K> for LeakSafe<dyn OnDismissListener<K>> {
    fn on_dismiss(&self, overlay: &Overlay<K>) {
        if let Some(target) = self.target("dismiss") {
            target.on_dismiss(overlay);
        }
    }
}

impl<K: OverlayKind> OnKeyListener<K> for LeakSafe<dyn OnKeyListener<K>> {
    fn on_key(&self, overlay: &Overlay<K>, event: &KeyEvent) -> bool {
        self.target("key")
            .is_some_and(|target| target.on_key(overlay, event))
    }
}
