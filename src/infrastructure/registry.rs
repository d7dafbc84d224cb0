//! Ordered, identity-deduplicated listener collections.
//!
//! A [`ListenerRegistry`] keeps shared listener handles in registration order.
//! Adding the same `Rc` twice is a silent no-op. Firing always works on a
//! [`snapshot`](ListenerRegistry::snapshot), so a listener may add or remove
//! entries (itself included) while a pass is running: the running pass still
//! reaches every listener it started with, and the change applies to the next
//! pass.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Address of the value behind an `Rc`, without the vtable half of a fat pointer.
pub(crate) fn addr_of<L: ?Sized>(listener: &Rc<L>) -> *const () {
    Rc::as_ptr(listener).cast::<()>()
}

pub struct ListenerRegistry<L: ?Sized> {
    entries: RefCell<Vec<Rc<L>>>,
}

impl<L: ?Sized> ListenerRegistry<L> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
        }
    }

    /// Appends `listener` unless that very `Rc` is already registered.
    ///
    /// Returns `true` if it was added.
    ///
    /// ```rust
    /// use scrim::infrastructure::ListenerRegistry;
    /// use std::rc::Rc;
    ///
    /// let registry: ListenerRegistry<dyn Fn()> = ListenerRegistry::new();
    /// let listener: Rc<dyn Fn()> = Rc::new(|| {});
    /// assert!(registry.add(Rc::clone(&listener)));
    /// assert!(!registry.add(listener));
    /// assert_eq!(registry.len(), 1);
    /// ```
    pub fn add(&self, listener: Rc<L>) -> bool {
        if self.contains(&listener) {
            return false;
        }
        self.entries.borrow_mut().push(listener);
        true
    }

    /// Removes `listener` by identity. Returns `true` if it was present.
    pub fn remove(&self, listener: &Rc<L>) -> bool {
        self.remove_addr(addr_of(listener))
    }

    /// Removes the entry whose value lives at `addr`.
    ///
    /// Lets a listener deregister itself from inside its own callback, where
    /// it only has `&self`.
    pub(crate) fn remove_addr(&self, addr: *const ()) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|entry| addr_of(entry) != addr);
        entries.len() != before
    }

    #[must_use]
    pub fn contains(&self, listener: &Rc<L>) -> bool {
        let addr = addr_of(listener);
        self.entries.borrow().iter().any(|entry| addr_of(entry) == addr)
    }

    /// Copies the current entries for a firing pass.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Rc<L>> {
        self.entries.borrow().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl<L: ?Sized> Default for ListenerRegistry<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: ?Sized> fmt::Debug for ListenerRegistry<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("len", &self.len())
            .finish()
    }
}
