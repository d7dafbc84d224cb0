//! User input routed through a surface.
//!
//! Key events go to key listeners first; the first one that consumes the
//! event stops dispatch. Unconsumed `Back` cancels a cancelable surface. A
//! touch outside the surface cancels it only when it is both cancelable and
//! cancelable on outside touch. Clicks on content views are routed through
//! the surface, never directly to the view, so a dismissed surface cannot
//! deliver a stale click.

use super::kind::OverlayKind;
use super::surface::Overlay;
use crate::domain::ViewId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Back,
    Enter,
    /// Any other platform key code.
    Other(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyAction {
    Down,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: Key,
    pub action: KeyAction,
}

impl KeyEvent {
    #[must_use]
    pub const fn down(key: Key) -> Self {
        Self {
            key,
            action: KeyAction::Down,
        }
    }

    #[must_use]
    pub const fn up(key: Key) -> Self {
        Self {
            key,
            action: KeyAction::Up,
        }
    }
}

/// Input a host delivers to a shown surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayInput {
    Key(KeyEvent),
    TouchOutside,
    Click(ViewId),
}

impl<K: OverlayKind> Overlay<K> {
    /// Routes one input event. Returns `true` if the surface consumed it.
    pub fn handle_input(&self, input: OverlayInput) -> bool {
        match input {
            OverlayInput::Key(event) => self.dispatch_key(event),
            OverlayInput::TouchOutside => self.touch_outside(),
            OverlayInput::Click(id) => self.perform_click(id),
        }
    }

    /// `Back` is always consumed by a shown surface; it cancels on key-up if
    /// the surface is cancelable.
    pub fn dispatch_key(&self, event: KeyEvent) -> bool {
        if !self.is_showing() {
            return false;
        }
        for listener in self.listeners().key.snapshot() {
            if listener.on_key(self, &event) {
                tracing::trace!(overlay_id = self.id(), ?event, "key consumed by listener");
                return true;
            }
        }
        if event.key != Key::Back {
            return false;
        }
        if event.action == KeyAction::Up && self.attributes().cancelable {
            self.cancel();
        }
        true
    }

    pub fn touch_outside(&self) -> bool {
        if !self.is_showing() {
            return false;
        }
        let attributes = self.attributes();
        if attributes.cancelable && attributes.canceled_on_touch_outside {
            self.cancel();
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ContentRoot, View};
    use crate::host::AppContext;
    use crate::overlay::{Dialog, DialogBuilder};
    use crate::Config;
    use std::cell::Cell;
    use std::rc::Rc;

    fn builder() -> DialogBuilder {
        let mut builder = DialogBuilder::new(AppContext::new(), &Config::default());
        builder.set_content_view(ContentRoot::new(View::new().child(View::with_id(ViewId(4)))));
        builder
    }

    fn shown(builder: &mut DialogBuilder) -> Dialog {
        builder.show().unwrap();
        builder.surface().unwrap()
    }

    #[test]
    fn back_cancels_on_key_up() {
        let mut builder = builder();
        let dialog = shown(&mut builder);
        assert!(dialog.dispatch_key(KeyEvent::down(Key::Back)));
        assert!(dialog.is_showing());
        assert!(dialog.dispatch_key(KeyEvent::up(Key::Back)));
        assert!(dialog.is_dismissed());
    }

    #[test]
    fn back_is_swallowed_when_not_cancelable() {
        let mut builder = builder();
        builder.set_cancelable(false);
        let dialog = shown(&mut builder);
        assert!(dialog.handle_input(OverlayInput::Key(KeyEvent::up(Key::Back))));
        assert!(dialog.is_showing());
    }

    #[test]
    fn key_listener_can_consume_back() {
        let mut builder = builder();
        builder.add_on_key_listener(Rc::new(|_: &Dialog, event: &KeyEvent| event.key == Key::Back));
        let dialog = shown(&mut builder);
        assert!(dialog.dispatch_key(KeyEvent::up(Key::Back)));
        assert!(dialog.is_showing());
        assert!(!dialog.dispatch_key(KeyEvent::up(Key::Enter)));
    }

    #[test]
    fn outside_touch_needs_both_flags() {
        let mut builder = builder();
        builder.set_canceled_on_touch_outside(false);
        let dialog = shown(&mut builder);
        assert!(!dialog.touch_outside());
        assert!(dialog.is_showing());

        dialog.set_canceled_on_touch_outside(true);
        assert!(dialog.touch_outside());
        assert!(dialog.is_dismissed());
    }

    #[test]
    fn clicks_route_through_the_surface() {
        let mut builder = builder();
        let clicks = Rc::new(Cell::new(0));
        {
            let clicks = Rc::clone(&clicks);
            builder.set_on_click_listener(ViewId(4), Rc::new(move |_: &Dialog, _: &Rc<View>| {
                clicks.set(clicks.get() + 1);
            }));
        }
        let dialog = shown(&mut builder);
        assert!(dialog.handle_input(OverlayInput::Click(ViewId(4))));
        assert!(!dialog.handle_input(OverlayInput::Click(ViewId(5))));
        dialog.dismiss();
        assert!(!dialog.handle_input(OverlayInput::Click(ViewId(4))));
        assert_eq!(clicks.get(), 1);
    }
}
