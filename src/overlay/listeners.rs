//! Listener contracts and the per-builder listener set.
//!
//! Each contract is a single-method trait with a blanket implementation for
//! matching closures, so callers can register either a closure or their own
//! type. Listeners are registered as `Rc<dyn ...>` handles; the handle's
//! identity is what deduplication and removal go by.

use super::input::KeyEvent;
use super::kind::OverlayKind;
use super::pending::PendingPost;
use super::surface::Overlay;
use crate::domain::{View, ViewId};
use crate::infrastructure::registry::{addr_of, ListenerRegistry};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Called once per surface, right after the builder created it.
pub trait OnCreateListener<K: OverlayKind> {
    fn on_create(&self, overlay: &Overlay<K>);
}

pub trait OnShowListener<K: OverlayKind> {
    fn on_show(&self, overlay: &Overlay<K>);
}

/// Called before the dismiss that every cancel leads to.
pub trait OnCancelListener<K: OverlayKind> {
    fn on_cancel(&self, overlay: &Overlay<K>);
}

pub trait OnDismissListener<K: OverlayKind> {
    fn on_dismiss(&self, overlay: &Overlay<K>);
}

/// Sees key events before the overlay's own handling. Return `true` to
/// consume the event.
pub trait OnKeyListener<K: OverlayKind> {
    fn on_key(&self, overlay: &Overlay<K>, event: &KeyEvent) -> bool;
}

pub trait OnClickListener<K: OverlayKind> {
    fn on_click(&self, overlay: &Overlay<K>, view: &Rc<View>);
}

impl<K: OverlayKind, F: Fn(&Overlay<K>)> OnCreateListener<K> for F {
    fn on_create(&self, overlay: &Overlay<K>) {
        self(overlay);
    }
}

impl<K: OverlayKind, F: Fn(&Overlay<K>)> OnShowListener<K> for F {
    fn on_show(&self, overlay: &Overlay<K>) {
        self(overlay);
    }
}

impl<K: OverlayKind, F: Fn(&Overlay<K>)> OnCancelListener<K> for F {
    fn on_cancel(&self, overlay: &Overlay<K>) {
        self(overlay);
    }
}

impl<K: OverlayKind, F: Fn(&Overlay<K>)> OnDismissListener<K> for F {
    fn on_dismiss(&self, overlay: &Overlay<K>) {
        self(overlay);
    }
}

impl<K: OverlayKind, F: Fn(&Overlay<K>, &KeyEvent) -> bool> OnKeyListener<K> for F {
    fn on_key(&self, overlay: &Overlay<K>, event: &KeyEvent) -> bool {
        self(overlay, event)
    }
}

impl<K: OverlayKind, F: Fn(&Overlay<K>, &Rc<View>)> OnClickListener<K> for F {
    fn on_click(&self, overlay: &Overlay<K>, view: &Rc<View>) {
        self(overlay, view);
    }
}

/// Click listeners of one view.
pub type ClickRegistry<K> = ListenerRegistry<dyn OnClickListener<K>>;

/// All listeners of one builder.
///
/// Shared between the builder and every surface it creates, so a listener
/// registered before creation reaches the surface on creation, one registered
/// afterwards reaches the live surface at once, and both survive recreation.
pub struct ListenerSet<K: OverlayKind> {
    pub create: ListenerRegistry<dyn OnCreateListener<K>>,
    pub show: ListenerRegistry<dyn OnShowListener<K>>,
    pub cancel: ListenerRegistry<dyn OnCancelListener<K>>,
    pub dismiss: ListenerRegistry<dyn OnDismissListener<K>>,
    pub key: ListenerRegistry<dyn OnKeyListener<K>>,
    click: RefCell<BTreeMap<ViewId, Rc<ClickRegistry<K>>>>,
    pending: RefCell<Vec<Rc<PendingPost<K>>>>,
}

impl<K: OverlayKind> ListenerSet<K> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            create: ListenerRegistry::new(),
            show: ListenerRegistry::new(),
            cancel: ListenerRegistry::new(),
            dismiss: ListenerRegistry::new(),
            key: ListenerRegistry::new(),
            click: RefCell::new(BTreeMap::new()),
            pending: RefCell::new(Vec::new()),
        }
    }

    pub fn add_click(&self, id: ViewId, listener: Rc<dyn OnClickListener<K>>) -> bool {
        let registry = Rc::clone(self.click.borrow_mut().entry(id).or_default());
        registry.add(listener)
    }

    pub fn remove_click(&self, id: ViewId, listener: &Rc<dyn OnClickListener<K>>) -> bool {
        let registry = self.click.borrow().get(&id).cloned();
        registry.is_some_and(|registry| registry.remove(listener))
    }

    /// Click listeners of `id`, copied for a firing pass.
    #[must_use]
    pub fn click_snapshot(&self, id: ViewId) -> Vec<Rc<dyn OnClickListener<K>>> {
        let registry = self.click.borrow().get(&id).cloned();
        registry.map_or_else(Vec::new, |registry| registry.snapshot())
    }

    /// Number of posts waiting for a first show.
    #[must_use]
    pub fn pending_posts(&self) -> usize {
        self.pending.borrow().len()
    }

    pub(crate) fn track_pending(&self, post: Rc<PendingPost<K>>) {
        self.pending.borrow_mut().push(post);
    }

    pub(crate) fn untrack_pending(&self, addr: *const ()) {
        self.pending
            .borrow_mut()
            .retain(|post| addr_of(post) != addr);
    }

    pub(crate) fn take_pending(&self) -> Vec<Rc<PendingPost<K>>> {
        std::mem::take(&mut *self.pending.borrow_mut())
    }
}

impl<K: OverlayKind> Default for ListenerSet<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: OverlayKind> fmt::Debug for ListenerSet<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerSet")
            .field("create", &self.create.len())
            .field("show", &self.show.len())
            .field("cancel", &self.cancel.len())
            .field("dismiss", &self.dismiss.len())
            .field("key", &self.key.len())
            .field("click_views", &self.click.borrow().len())
            .field("pending", &self.pending.borrow().len())
            .finish()
    }
}
