//! Content tree inflated inside an overlay.
//!
//! A [`ContentRoot`] is what a content author hands to the builder: a tree of
//! [`View`] nodes, some carrying a [`ViewId`] so the builder can address them
//! (text, visibility, click handlers), plus the root's own [`LayoutHint`].
//! Views are shared (`Rc`) so handles obtained through `find_view` observe the
//! same node the overlay renders.

use super::dimension::LayoutHint;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Identifier of an addressable view inside a content tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ViewId(pub u32);

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Visible,
    Invisible,
    Gone,
}

/// A node of the content tree.
#[derive(Debug, Default)]
pub struct View {
    id: Option<ViewId>,
    text: RefCell<String>,
    hint: RefCell<String>,
    visibility: Cell<Visibility>,
    focused: Cell<bool>,
    children: Vec<Rc<View>>,
}

impl View {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a view addressable by `id`.
    #[must_use]
    pub fn with_id(id: ViewId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn text(self, text: impl Into<String>) -> Self {
        *self.text.borrow_mut() = text.into();
        self
    }

    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(Rc::new(child));
        self
    }

    #[must_use]
    pub const fn id(&self) -> Option<ViewId> {
        self.id
    }

    #[must_use]
    pub fn current_text(&self) -> String {
        self.text.borrow().clone()
    }

    pub fn set_text(&self, text: impl Into<String>) {
        *self.text.borrow_mut() = text.into();
    }

    #[must_use]
    pub fn current_hint(&self) -> String {
        self.hint.borrow().clone()
    }

    pub fn set_hint(&self, hint: impl Into<String>) {
        *self.hint.borrow_mut() = hint.into();
    }

    #[must_use]
    pub fn visibility(&self) -> Visibility {
        self.visibility.get()
    }

    pub fn set_visibility(&self, visibility: Visibility) {
        self.visibility.set(visibility);
    }

    /// Gives this view input-method focus.
    pub fn request_focus(&self) {
        self.focused.set(true);
    }

    #[must_use]
    pub fn has_focus(&self) -> bool {
        self.focused.get()
    }

    #[must_use]
    pub fn children(&self) -> &[Rc<Self>] {
        &self.children
    }

    fn find_child(&self, id: ViewId) -> Option<Rc<Self>> {
        self.children.iter().find_map(|child| {
            if child.id == Some(id) {
                Some(Rc::clone(child))
            } else {
                child.find_child(id)
            }
        })
    }

    fn clear_focus_recursive(&self) -> bool {
        let mut released = self.focused.replace(false);
        for child in &self.children {
            released |= child.clear_focus_recursive();
        }
        released
    }
}

/// The root of an overlay's content, with the root's layout parameters.
#[derive(Debug, Clone)]
pub struct ContentRoot {
    root: Rc<View>,
    layout: LayoutHint,
}

impl ContentRoot {
    /// Wraps a view tree with no layout parameters.
    #[must_use]
    pub fn new(root: View) -> Self {
        Self {
            root: Rc::new(root),
            layout: LayoutHint::default(),
        }
    }

    /// Attaches the root's declared layout parameters.
    #[must_use]
    pub fn with_layout(mut self, layout: LayoutHint) -> Self {
        self.layout = layout;
        self
    }

    #[must_use]
    pub const fn layout(&self) -> &LayoutHint {
        &self.layout
    }

    #[must_use]
    pub fn root(&self) -> &Rc<View> {
        &self.root
    }

    /// Looks up a view by id, the root included, depth first.
    ///
    /// ```rust
    /// use scrim::domain::{ContentRoot, View, ViewId};
    ///
    /// let content = ContentRoot::new(
    ///     View::new().child(View::with_id(ViewId(7)).text("OK")),
    /// );
    /// assert_eq!(content.find_view(ViewId(7)).unwrap().current_text(), "OK");
    /// assert!(content.find_view(ViewId(8)).is_none());
    /// ```
    #[must_use]
    pub fn find_view(&self, id: ViewId) -> Option<Rc<View>> {
        if self.root.id == Some(id) {
            return Some(Rc::clone(&self.root));
        }
        self.root.find_child(id)
    }

    /// Drops input-method focus anywhere in the tree.
    ///
    /// Returns `true` if some view was holding focus.
    pub fn release_focus(&self) -> bool {
        self.root.clear_focus_recursive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Dimension, Gravity};

    fn sample() -> ContentRoot {
        ContentRoot::new(
            View::with_id(ViewId(1))
                .child(View::with_id(ViewId(2)).text("title"))
                .child(View::new().child(View::with_id(ViewId(3)).text("nested"))),
        )
    }

    #[test]
    fn finds_root_and_nested_views() {
        let content = sample();
        assert!(content.find_view(ViewId(1)).is_some());
        assert_eq!(content.find_view(ViewId(3)).unwrap().current_text(), "nested");
    }

    #[test]
    fn handles_share_the_rendered_node() {
        let content = sample();
        content.find_view(ViewId(2)).unwrap().set_text("changed");
        assert_eq!(content.find_view(ViewId(2)).unwrap().current_text(), "changed");
    }

    #[test]
    fn release_focus_reports_whether_anything_was_focused() {
        let content = sample();
        assert!(!content.release_focus());

        let nested = content.find_view(ViewId(3)).unwrap();
        nested.request_focus();
        assert!(content.release_focus());
        assert!(!nested.has_focus());
    }

    #[test]
    fn layout_hint_is_carried() {
        let content = sample().with_layout(
            LayoutHint::new()
                .with_size(Dimension::Fill, Dimension::Wrap)
                .with_gravity(Gravity::Bottom),
        );
        assert_eq!(content.layout().gravity, Some(Gravity::Bottom));
        assert_eq!(content.layout().width, Some(Dimension::Fill));
    }
}
