//! The deferred builder.
//!
//! An [`OverlayBuilder`] accepts configuration in any order, before or after
//! the live surface exists, with the same net effect either way. Before
//! creation, values are staged in an [`OverlayDescriptor`]. Afterwards they
//! update the descriptor and are forwarded to the live surface at once.
//! Listeners live in a [`ListenerSet`] shared with every surface the builder
//! creates, so they survive recreation.

use super::kind::{Anchored, AnchorRect, OverlayKind, Placement, SurfaceParts};
use super::leak_safe::LeakSafe;
use super::listeners::{
    ListenerSet, OnCancelListener, OnClickListener, OnCreateListener, OnDismissListener, OnKeyListener,
    OnShowListener,
};
use super::pending::{PendingPost, Schedule};
use super::surface::{HostLink, Overlay};
use crate::domain::{
    Animation, ContentRoot, Dimension, Gravity, OverlayDescriptor, Result, ScrimError, View, ViewId, Visibility,
};
use crate::host::{DisplayContext, HostLookup};
use crate::Config;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// Adapters registered through the single-slot setters, kept so the next
/// call can replace them.
struct LegacySlots<K: OverlayKind> {
    show: Option<Rc<dyn OnShowListener<K>>>,
    cancel: Option<Rc<dyn OnCancelListener<K>>>,
    dismiss: Option<Rc<dyn OnDismissListener<K>>>,
    key: Option<Rc<dyn OnKeyListener<K>>>,
}

impl<K: OverlayKind> Default for LegacySlots<K> {
    fn default() -> Self {
        Self {
            show: None,
            cancel: None,
            dismiss: None,
            key: None,
        }
    }
}

pub struct OverlayBuilder<K: OverlayKind> {
    context: Rc<dyn DisplayContext>,
    debug: bool,
    resume_delay: Duration,
    descriptor: OverlayDescriptor,
    kind_state: K::State,
    listeners: Rc<ListenerSet<K>>,
    legacy: LegacySlots<K>,
    surface: Option<Overlay<K>>,
}

impl<K: OverlayKind> OverlayBuilder<K> {
    /// Starts a builder for overlays shown from `context`.
    ///
    /// The descriptor is seeded from `config.overlay` and then adjusted by
    /// the overlay kind.
    #[must_use]
    pub fn new(context: Rc<dyn DisplayContext>, config: &Config) -> Self {
        let mut descriptor = OverlayDescriptor::new(&config.overlay);
        K::apply_defaults(&mut descriptor);
        Self {
            context,
            debug: config.debug,
            resume_delay: Duration::from_millis(config.overlay.resume_animation_delay_ms),
            descriptor,
            kind_state: K::State::default(),
            listeners: Rc::new(ListenerSet::new()),
            legacy: LegacySlots::default(),
            surface: None,
        }
    }

    /// The live surface, unless there is none or it has been dismissed.
    fn live(&self) -> Option<&Overlay<K>> {
        self.surface.as_ref().filter(|surface| !surface.is_dismissed())
    }

    fn host_usable(&self) -> bool {
        match self.context.lookup_host() {
            HostLookup::Attached(host) => host.is_usable(),
            HostLookup::Detached => false,
            HostLookup::Unbound => true,
        }
    }

    // Staging setters

    pub fn set_width(&mut self, width: Dimension) -> &mut Self {
        self.descriptor.width = width;
        if let Some(surface) = self.live() {
            surface.set_width(width);
        }
        self
    }

    pub fn set_height(&mut self, height: Dimension) -> &mut Self {
        self.descriptor.height = height;
        if let Some(surface) = self.live() {
            surface.set_height(height);
        }
        self
    }

    pub fn set_size(&mut self, width: Dimension, height: Dimension) -> &mut Self {
        self.set_width(width).set_height(height)
    }

    pub fn set_gravity(&mut self, gravity: Gravity) -> &mut Self {
        self.descriptor.gravity = Some(gravity);
        if let Some(surface) = self.live() {
            surface.set_gravity(gravity);
        }
        self
    }

    /// Sets the gravity from a raw platform constant.
    ///
    /// # Errors
    ///
    /// [`ScrimError::UnsupportedGravity`] if `bits` is not one of the
    /// supported constants. `0` clears the gravity back to "unset".
    pub fn set_gravity_bits(&mut self, bits: u32) -> Result<&mut Self> {
        match Gravity::from_bits(bits)? {
            Some(gravity) => Ok(self.set_gravity(gravity)),
            None => {
                if self.live().is_none() {
                    self.descriptor.gravity = None;
                }
                Ok(self)
            }
        }
    }

    pub fn set_x_offset(&mut self, x_offset: i32) -> &mut Self {
        self.descriptor.x_offset = x_offset;
        if let Some(surface) = self.live() {
            surface.set_x_offset(x_offset);
        }
        self
    }

    pub fn set_y_offset(&mut self, y_offset: i32) -> &mut Self {
        self.descriptor.y_offset = y_offset;
        if let Some(surface) = self.live() {
            surface.set_y_offset(y_offset);
        }
        self
    }

    pub fn set_animation(&mut self, animation: Animation) -> &mut Self {
        self.descriptor.animation = Some(animation);
        if let Some(surface) = self.live() {
            surface.set_animation(animation);
        }
        self
    }

    pub fn set_cancelable(&mut self, cancelable: bool) -> &mut Self {
        self.descriptor.cancelable = cancelable;
        if let Some(surface) = self.live() {
            surface.set_cancelable(cancelable);
        }
        self
    }

    /// Enabling outside-touch cancel also makes the overlay cancelable.
    pub fn set_canceled_on_touch_outside(&mut self, cancel: bool) -> &mut Self {
        self.descriptor.canceled_on_touch_outside = cancel;
        if cancel {
            self.descriptor.cancelable = true;
        }
        if let Some(surface) = self.live() {
            surface.set_canceled_on_touch_outside(cancel);
        }
        self
    }

    pub fn set_background_dim_enabled(&mut self, enabled: bool) -> &mut Self {
        self.descriptor.background_dim_enabled = enabled;
        if let Some(surface) = self.live() {
            surface.set_background_dim_enabled(enabled);
        }
        self
    }

    /// Clamped to `[0.0, 1.0]`, the same as on a live surface.
    pub fn set_background_dim_amount(&mut self, amount: f32) -> &mut Self {
        let amount = amount.clamp(0.0, 1.0);
        self.descriptor.background_dim_amount = amount;
        if let Some(surface) = self.live() {
            surface.set_background_dim_amount(amount);
        }
        self
    }

    /// Stages the content root.
    ///
    /// Unset sizes and gravity are taken from the root's layout parameters.
    /// A surface keeps the content it was created with; new content is used
    /// by the next surface this builder creates.
    pub fn set_content_view(&mut self, content: ContentRoot) -> &mut Self {
        if self.live().is_some() {
            tracing::debug!(kind = K::LABEL, "content staged for the next surface");
        }
        self.descriptor.set_content(content);
        self
    }

    // Content helpers

    /// Looks a view up in the live surface's content, or in the staged
    /// content before creation.
    #[must_use]
    pub fn find_view(&self, id: ViewId) -> Option<Rc<View>> {
        match self.live() {
            Some(surface) => surface.find_view(id),
            None => self.descriptor.content.as_ref()?.find_view(id),
        }
    }

    pub fn set_text(&mut self, id: ViewId, text: impl Into<String>) -> &mut Self {
        match self.find_view(id) {
            Some(view) => view.set_text(text),
            None => tracing::trace!(%id, "set_text: no such view"),
        }
        self
    }

    pub fn set_hint(&mut self, id: ViewId, hint: impl Into<String>) -> &mut Self {
        match self.find_view(id) {
            Some(view) => view.set_hint(hint),
            None => tracing::trace!(%id, "set_hint: no such view"),
        }
        self
    }

    pub fn set_visibility(&mut self, id: ViewId, visibility: Visibility) -> &mut Self {
        match self.find_view(id) {
            Some(view) => view.set_visibility(visibility),
            None => tracing::trace!(%id, "set_visibility: no such view"),
        }
        self
    }

    // Listeners

    pub fn add_on_create_listener(&mut self, listener: Rc<dyn OnCreateListener<K>>) -> &mut Self {
        self.listeners.create.add(listener);
        self
    }

    pub fn remove_on_create_listener(&mut self, listener: &Rc<dyn OnCreateListener<K>>) -> &mut Self {
        self.listeners.create.remove(listener);
        self
    }

    pub fn add_on_show_listener(&mut self, listener: Rc<dyn OnShowListener<K>>) -> &mut Self {
        self.listeners.show.add(listener);
        self
    }

    pub fn remove_on_show_listener(&mut self, listener: &Rc<dyn OnShowListener<K>>) -> &mut Self {
        self.listeners.show.remove(listener);
        self
    }

    pub fn add_on_cancel_listener(&mut self, listener: Rc<dyn OnCancelListener<K>>) -> &mut Self {
        self.listeners.cancel.add(listener);
        self
    }

    pub fn remove_on_cancel_listener(&mut self, listener: &Rc<dyn OnCancelListener<K>>) -> &mut Self {
        self.listeners.cancel.remove(listener);
        self
    }

    pub fn add_on_dismiss_listener(&mut self, listener: Rc<dyn OnDismissListener<K>>) -> &mut Self {
        self.listeners.dismiss.add(listener);
        self
    }

    pub fn remove_on_dismiss_listener(&mut self, listener: &Rc<dyn OnDismissListener<K>>) -> &mut Self {
        self.listeners.dismiss.remove(listener);
        self
    }

    pub fn add_on_key_listener(&mut self, listener: Rc<dyn OnKeyListener<K>>) -> &mut Self {
        self.listeners.key.add(listener);
        self
    }

    pub fn remove_on_key_listener(&mut self, listener: &Rc<dyn OnKeyListener<K>>) -> &mut Self {
        self.listeners.key.remove(listener);
        self
    }

    pub fn set_on_click_listener(&mut self, id: ViewId, listener: Rc<dyn OnClickListener<K>>) -> &mut Self {
        self.listeners.add_click(id, listener);
        self
    }

    /// Registers one listener for several views.
    pub fn set_on_click_listener_for(&mut self, ids: &[ViewId], listener: &Rc<dyn OnClickListener<K>>) -> &mut Self {
        for &id in ids {
            self.listeners.add_click(id, Rc::clone(listener));
        }
        self
    }

    pub fn remove_on_click_listener(&mut self, id: ViewId, listener: &Rc<dyn OnClickListener<K>>) -> &mut Self {
        self.listeners.remove_click(id, listener);
        self
    }

    /// Single-slot show listener, held weakly.
    ///
    /// Replaces whatever the previous call installed; `None` clears the slot.
    /// The caller keeps `listener` alive; once it is dropped the slot goes
    /// quiet.
    pub fn set_on_show_listener(&mut self, listener: Option<&Rc<dyn OnShowListener<K>>>) -> &mut Self {
        if let Some(previous) = self.legacy.show.take() {
            self.listeners.show.remove(&previous);
        }
        if let Some(listener) = listener {
            let adapter: Rc<dyn OnShowListener<K>> = LeakSafe::wrap(listener);
            self.listeners.show.add(Rc::clone(&adapter));
            self.legacy.show = Some(adapter);
        }
        self
    }

    /// Single-slot cancel listener, held weakly. See
    /// [`set_on_show_listener`](Self::set_on_show_listener).
    pub fn set_on_cancel_listener(&mut self, listener: Option<&Rc<dyn OnCancelListener<K>>>) -> &mut Self {
        if let Some(previous) = self.legacy.cancel.take() {
            self.listeners.cancel.remove(&previous);
        }
        if let Some(listener) = listener {
            let adapter: Rc<dyn OnCancelListener<K>> = LeakSafe::wrap(listener);
            self.listeners.cancel.add(Rc::clone(&adapter));
            self.legacy.cancel = Some(adapter);
        }
        self
    }

    /// Single-slot dismiss listener, held weakly. See
    /// [`set_on_show_listener`](Self::set_on_show_listener).
    pub fn set_on_dismiss_listener(&mut self, listener: Option<&Rc<dyn OnDismissListener<K>>>) -> &mut Self {
        if let Some(previous) = self.legacy.dismiss.take() {
            self.listeners.dismiss.remove(&previous);
        }
        if let Some(listener) = listener {
            let adapter: Rc<dyn OnDismissListener<K>> = LeakSafe::wrap(listener);
            self.listeners.dismiss.add(Rc::clone(&adapter));
            self.legacy.dismiss = Some(adapter);
        }
        self
    }

    pub fn set_on_key_listener(&mut self, listener: Option<&Rc<dyn OnKeyListener<K>>>) -> &mut Self {
        if let Some(previous) = self.legacy.key.take() {
            self.listeners.key.remove(&previous);
        }
        if let Some(listener) = listener {
            let adapter: Rc<dyn OnKeyListener<K>> = LeakSafe::wrap(listener);
            self.listeners.key.add(Rc::clone(&adapter));
            self.legacy.key = Some(adapter);
        }
        self
    }

    // Lifecycle

    /// Creates a fresh surface from the staged configuration.
    ///
    /// A surface that is currently shown is dismissed first. Create listeners
    /// fire once the new surface is in place.
    ///
    /// # Errors
    ///
    /// [`ScrimError::NoContent`] if no content root has been staged.
    pub fn create(&mut self) -> Result<Overlay<K>> {
        let _span = tracing::debug_span!("create", kind = K::LABEL).entered();
        let attributes = self.descriptor.resolve().ok_or(ScrimError::NoContent)?;
        let content = self.descriptor.content.clone().ok_or(ScrimError::NoContent)?;

        if let Some(previous) = self.surface.take() {
            if previous.is_showing() {
                tracing::debug!(overlay_id = previous.id(), "dismissing previous surface");
                previous.dismiss();
            }
        }

        let lookup = self.context.lookup_host();
        match &lookup {
            HostLookup::Attached(_) => {}
            HostLookup::Detached => tracing::debug!("host already destroyed, surface will not show"),
            HostLookup::Unbound => {
                tracing::debug!("display context has no host, running without lifecycle binding");
            }
        }

        let surface = K::create_surface(SurfaceParts {
            attributes,
            content,
            state: self.kind_state.clone(),
            listeners: Rc::clone(&self.listeners),
            queue: self.context.queue(),
            host: HostLink::from(lookup),
            resume_delay: self.resume_delay,
        });
        self.surface = Some(surface.clone());

        if self.debug {
            tracing::info!(overlay_id = surface.id(), ?attributes, "overlay created");
        } else {
            tracing::debug!(overlay_id = surface.id(), "overlay created");
        }
        for listener in self.listeners.create.snapshot() {
            listener.on_create(&surface);
        }
        Ok(surface)
    }

    /// Shows the overlay, creating a surface first if there is no live one.
    ///
    /// Does nothing if the host is gone or finishing, or if the overlay is
    /// already showing.
    ///
    /// # Errors
    ///
    /// [`ScrimError::NoContent`] if a surface has to be created and no
    /// content root has been staged.
    pub fn show(&mut self) -> Result<()> {
        let _span = tracing::debug_span!("show", kind = K::LABEL).entered();
        if !self.host_usable() {
            tracing::debug!("host unusable, show ignored");
            return Ok(());
        }
        let surface = match self.live() {
            Some(surface) => surface.clone(),
            None => self.create()?,
        };
        if !surface.is_showing() {
            surface.show();
        }
        Ok(())
    }

    /// Dismisses the live surface. Does nothing while the host is finishing
    /// or destroyed. A surface whose host has already been dropped is still
    /// dismissed, which releases it.
    pub fn dismiss(&self) {
        let _span = tracing::debug_span!("dismiss", kind = K::LABEL).entered();
        match self.context.lookup_host() {
            HostLookup::Attached(host) if !host.is_usable() => {
                tracing::debug!("host unusable, dismiss ignored");
                return;
            }
            HostLookup::Detached => tracing::debug!("host dropped, releasing surface"),
            HostLookup::Attached(_) | HostLookup::Unbound => {}
        }
        if let Some(surface) = self.live() {
            surface.dismiss();
        }
    }

    /// Runs `action` on the surface's queue once it is showing.
    ///
    /// While showing, the action is queued at once. Otherwise it waits for
    /// the next show, then is queued; it never runs twice and never runs
    /// against a surface that is no longer showing.
    pub fn post(&self, action: impl FnOnce() + 'static) {
        self.schedule(Box::new(action), Schedule::Delay(Duration::ZERO));
    }

    pub fn post_delayed(&self, action: impl FnOnce() + 'static, delay: Duration) {
        self.schedule(Box::new(action), Schedule::Delay(delay));
    }

    /// Like [`post`](Self::post), at an absolute queue uptime.
    pub fn post_at(&self, action: impl FnOnce() + 'static, uptime: Duration) {
        self.schedule(Box::new(action), Schedule::At(uptime));
    }

    fn schedule(&self, action: Box<dyn FnOnce()>, schedule: Schedule) {
        if let Some(surface) = self.live().filter(|surface| surface.is_showing()) {
            let posted = match schedule {
                Schedule::Delay(delay) => surface.post_delayed(action, delay),
                Schedule::At(uptime) => surface.post_at(action, uptime),
            };
            if posted.is_none() {
                tracing::trace!(overlay_id = surface.id(), "post dropped, surface not showing");
            }
            return;
        }
        PendingPost::register(&self.listeners, action, schedule);
    }

    /// Whether a surface exists and has not been dismissed.
    #[must_use]
    pub fn is_created(&self) -> bool {
        self.live().is_some()
    }

    #[must_use]
    pub fn is_showing(&self) -> bool {
        self.live().is_some_and(Overlay::is_showing)
    }

    /// The most recently created surface, dismissed or not.
    #[must_use]
    pub fn surface(&self) -> Option<Overlay<K>> {
        self.surface.clone()
    }

    #[must_use]
    pub fn descriptor(&self) -> &OverlayDescriptor {
        &self.descriptor
    }

    #[must_use]
    pub fn context(&self) -> &Rc<dyn DisplayContext> {
        &self.context
    }

    /// The listener set shared with every surface of this builder.
    #[must_use]
    pub fn listeners(&self) -> &Rc<ListenerSet<K>> {
        &self.listeners
    }

    /// Number of posts waiting for a first show.
    #[must_use]
    pub fn pending_posts(&self) -> usize {
        self.listeners.pending_posts()
    }
}

impl OverlayBuilder<Anchored> {
    /// Sets where the popup is placed; moves a live popup immediately.
    pub fn set_placement(&mut self, placement: Placement) -> &mut Self {
        self.kind_state = Some(placement);
        if let Some(surface) = self.live() {
            surface.update_placement(placement);
        }
        self
    }

    /// Shows the popup hanging below `anchor`.
    ///
    /// # Errors
    ///
    /// See [`show`](Self::show).
    pub fn show_as_drop_down(&mut self, anchor: AnchorRect) -> Result<()> {
        self.set_placement(Placement::DropDown { anchor });
        self.show()
    }

    /// Shows the popup at a host-window location with `gravity`.
    ///
    /// # Errors
    ///
    /// See [`show`](Self::show).
    pub fn show_at_location(&mut self, gravity: Gravity, x: i32, y: i32) -> Result<()> {
        self.set_gravity(gravity);
        self.set_placement(Placement::AtLocation { x, y });
        self.show()
    }
}

impl<K: OverlayKind> fmt::Debug for OverlayBuilder<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayBuilder")
            .field("kind", &K::LABEL)
            .field("descriptor", &self.descriptor)
            .field("kind_state", &self.kind_state)
            .field("listeners", &self.listeners)
            .field("surface", &self.surface)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LayoutHint;
    use crate::host::{AppContext, Host, HostState, HostWindow, LifecycleObserver, TaskQueue};
    use crate::overlay::{Dialog, DialogBuilder, Modal, Popup, PopupBuilder};
    use std::cell::{Cell, RefCell};
    use std::rc::Weak;

    fn content() -> ContentRoot {
        ContentRoot::new(
            View::with_id(ViewId(1))
                .child(View::with_id(ViewId(2)).text("title"))
                .child(View::with_id(ViewId(3))),
        )
    }

    fn dialog_builder() -> DialogBuilder {
        let mut builder = DialogBuilder::new(AppContext::new(), &Config::default());
        builder.set_content_view(content());
        builder
    }

    #[test]
    fn create_without_content_fails() {
        let mut builder = DialogBuilder::new(AppContext::new(), &Config::default());
        assert!(matches!(builder.create(), Err(ScrimError::NoContent)));
        assert!(matches!(builder.show(), Err(ScrimError::NoContent)));
        assert!(!builder.is_created());
    }

    #[test]
    fn content_layout_fills_unset_size_and_gravity() {
        let mut builder = DialogBuilder::new(AppContext::new(), &Config::default());
        builder.set_content_view(
            ContentRoot::new(View::new()).with_layout(
                LayoutHint::new()
                    .with_size(Dimension::Fill, Dimension::Px(240))
                    .with_gravity(Gravity::Bottom),
            ),
        );
        let attributes = builder.create().unwrap().attributes();
        assert_eq!(attributes.width, Dimension::Fill);
        assert_eq!(attributes.height, Dimension::Px(240));
        assert_eq!(attributes.gravity, Gravity::Bottom);
        assert_eq!(attributes.animation, Animation::SlideUp);
    }

    #[test]
    fn setters_forward_to_live_surface() {
        let mut builder = dialog_builder();
        let dialog = builder.create().unwrap();
        builder.set_x_offset(8).set_gravity(Gravity::Top).set_cancelable(false);
        assert_eq!(dialog.attributes().x_offset, 8);
        assert_eq!(dialog.attributes().gravity, Gravity::Top);
        assert!(!dialog.attributes().cancelable);
        assert_eq!(builder.descriptor().x_offset, 8);
    }

    #[test]
    fn dim_amount_is_clamped_whether_staged_or_forwarded() {
        let mut builder = dialog_builder();
        builder.set_background_dim_amount(1.5);
        assert_eq!(builder.descriptor().background_dim_amount, 1.0);
        let dialog = builder.create().unwrap();
        assert_eq!(dialog.attributes().background_dim_amount, 1.0);

        builder.set_background_dim_amount(-0.5);
        assert_eq!(builder.descriptor().background_dim_amount, 0.0);
        assert_eq!(dialog.attributes().background_dim_amount, 0.0);
    }

    #[test]
    fn unsupported_gravity_bits_are_rejected() {
        let mut builder = dialog_builder();
        assert!(matches!(
            builder.set_gravity_bits(0x1234),
            Err(ScrimError::UnsupportedGravity(0x1234))
        ));
        builder.set_gravity_bits(crate::domain::gravity::bits::BOTTOM).unwrap();
        assert_eq!(builder.descriptor().gravity, Some(Gravity::Bottom));
    }

    #[test]
    fn create_listener_fires_per_surface() {
        let mut builder = dialog_builder();
        let created = Rc::new(Cell::new(0));
        {
            let created = Rc::clone(&created);
            builder.add_on_create_listener(Rc::new(move |_: &Dialog| created.set(created.get() + 1)));
        }
        builder.show().unwrap();
        builder.dismiss();
        builder.show().unwrap();
        assert_eq!(created.get(), 2);
    }

    #[test]
    fn show_twice_is_a_no_op() {
        let mut builder = dialog_builder();
        let shows = Rc::new(Cell::new(0));
        {
            let shows = Rc::clone(&shows);
            builder.add_on_show_listener(Rc::new(move |_: &Dialog| shows.set(shows.get() + 1)));
        }
        builder.show().unwrap();
        builder.show().unwrap();
        assert_eq!(shows.get(), 1);
    }

    #[test]
    fn recreate_dismisses_the_shown_surface() {
        let mut builder = dialog_builder();
        builder.show().unwrap();
        let first = builder.surface().unwrap();
        let second = builder.create().unwrap();
        assert!(first.is_dismissed());
        assert!(!second.ptr_eq(&first));
        assert!(builder.is_created());
        assert!(!builder.is_showing());
    }

    #[test]
    fn content_helpers_reach_staged_and_live_views() {
        let mut builder = dialog_builder();
        builder.set_text(ViewId(2), "staged");
        builder.set_hint(ViewId(3), "type here");
        let dialog = builder.create().unwrap();
        builder.set_visibility(ViewId(3), Visibility::Gone);

        let title = dialog.find_view(ViewId(2)).unwrap();
        assert_eq!(title.current_text(), "staged");
        let field = dialog.find_view(ViewId(3)).unwrap();
        assert_eq!(field.current_hint(), "type here");
        assert_eq!(field.visibility(), Visibility::Gone);
    }

    #[test]
    fn legacy_setter_replaces_previous_slot() {
        let mut builder = dialog_builder();
        let log = Rc::new(RefCell::new(Vec::new()));
        let first: Rc<dyn OnDismissListener<Modal>> = {
            let log = Rc::clone(&log);
            Rc::new(move |_: &Dialog| log.borrow_mut().push("first"))
        };
        let second: Rc<dyn OnDismissListener<Modal>> = {
            let log = Rc::clone(&log);
            Rc::new(move |_: &Dialog| log.borrow_mut().push("second"))
        };
        builder.set_on_dismiss_listener(Some(&first));
        builder.set_on_dismiss_listener(Some(&second));
        builder.show().unwrap();
        builder.dismiss();
        assert_eq!(*log.borrow(), ["second"]);
    }

    #[test]
    fn post_before_show_waits_for_first_show() {
        let mut builder = dialog_builder();
        let queue = builder.context().queue();
        let ran = Rc::new(Cell::new(0));
        {
            let ran = Rc::clone(&ran);
            builder.post_delayed(move || ran.set(ran.get() + 1), Duration::from_millis(20));
        }
        assert_eq!(builder.pending_posts(), 1);
        queue.advance(Duration::from_millis(50));
        assert_eq!(ran.get(), 0);

        builder.show().unwrap();
        assert_eq!(builder.pending_posts(), 0);
        queue.advance(Duration::from_millis(20));
        assert_eq!(ran.get(), 1);

        builder.dismiss();
        builder.show().unwrap();
        queue.advance(Duration::from_millis(100));
        assert_eq!(ran.get(), 1);
    }

    #[test]
    fn post_is_discarded_when_surface_dismissed_unshown() {
        let mut builder = dialog_builder();
        let queue = builder.context().queue();
        let ran = Rc::new(Cell::new(false));
        let surface = builder.create().unwrap();
        {
            let ran = Rc::clone(&ran);
            builder.post(move || ran.set(true));
        }
        surface.dismiss();
        assert_eq!(builder.pending_posts(), 0);

        builder.show().unwrap();
        queue.run_pending();
        assert!(!ran.get());
    }

    #[test]
    fn stale_host_show_and_dismiss_are_no_ops() {
        let host = HostWindow::new("main");
        let mut builder = DialogBuilder::new(host.context(), &Config::default());
        builder.set_content_view(content());
        builder.show().unwrap();
        let dialog = builder.surface().unwrap();

        host.finish();
        builder.dismiss();
        assert!(dialog.is_showing());

        host.destroy();
        assert!(dialog.is_dismissed());
        builder.show().unwrap();
        assert!(!builder.is_created());
    }

    /// Host that, unlike `HostWindow`, sends nothing to its observers when
    /// it is dropped.
    struct SilentHost {
        queue: Rc<TaskQueue>,
        observers: RefCell<Vec<Rc<dyn LifecycleObserver>>>,
    }

    impl Host for SilentHost {
        fn name(&self) -> &str {
            "silent"
        }

        fn state(&self) -> HostState {
            HostState::Resumed
        }

        fn add_observer(&self, observer: Rc<dyn LifecycleObserver>) {
            self.observers.borrow_mut().push(observer);
        }

        fn remove_observer(&self, observer: &Rc<dyn LifecycleObserver>) {
            self.observers.borrow_mut().retain(|held| !Rc::ptr_eq(held, observer));
        }

        fn queue(&self) -> Rc<TaskQueue> {
            Rc::clone(&self.queue)
        }

        fn set_background_dim(&self, _amount: f32) {}
    }

    struct SilentContext {
        host: Weak<SilentHost>,
        queue: Rc<TaskQueue>,
    }

    impl DisplayContext for SilentContext {
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

    #[test]
    fn dismiss_releases_a_surface_whose_host_was_dropped() {
        let queue = TaskQueue::new();
        let host = Rc::new(SilentHost {
            queue: Rc::clone(&queue),
            observers: RefCell::new(Vec::new()),
        });
        let context = Rc::new(SilentContext {
            host: Rc::downgrade(&host),
            queue,
        });
        let mut builder = DialogBuilder::new(context, &Config::default());
        builder.set_content_view(content());
        builder.show().unwrap();
        let weak = builder.surface().unwrap().downgrade();
        assert!(weak.upgrade().is_some_and(|dialog| dialog.is_bound()));

        drop(host);
        assert!(builder.is_showing());

        builder.dismiss();
        assert!(!builder.is_created());
        assert!(weak.upgrade().is_some_and(|dialog| dialog.is_dismissed() && !dialog.is_bound()));
        drop(builder);
        assert!(weak.is_reclaimed());
    }

    #[test]
    fn popup_dims_host_while_shown() {
        let host = HostWindow::new("main");
        let mut builder = PopupBuilder::new(host.context(), &Config::default());
        builder.set_content_view(content());
        builder.set_background_dim_enabled(true).set_background_dim_amount(0.3);
        builder
            .show_as_drop_down(AnchorRect {
                x: 10,
                y: 20,
                width: 100,
                height: 30,
            })
            .unwrap();
        let popup: Popup = builder.surface().unwrap();
        assert!((host.background_dim() - 0.3).abs() < f32::EPSILON);
        assert_eq!(popup.origin(), Some((10, 50)));

        builder.set_y_offset(4);
        assert_eq!(popup.origin(), Some((10, 54)));
        builder.set_placement(Placement::AtLocation { x: 0, y: 0 });
        assert_eq!(popup.origin(), Some((0, 4)));

        builder.dismiss();
        assert_eq!(host.background_dim(), 0.0);
        assert!(!popup.is_bound());
        assert_eq!(host.observer_count(), 0);
        assert!(host.is_usable());
    }

    #[test]
    fn popup_defaults_to_no_dim() {
        let host = HostWindow::new("main");
        let mut builder = PopupBuilder::new(host.context(), &Config::default());
        builder.set_content_view(content());
        builder.show_at_location(Gravity::Right, 5, 6).unwrap();
        assert_eq!(host.background_dim(), 0.0);
        let popup = builder.surface().unwrap();
        assert_eq!(popup.attributes().gravity, Gravity::Right);
        assert_eq!(popup.placement(), Some(Placement::AtLocation { x: 5, y: 6 }));
    }
}
