//! Scripted walkthrough of the overlay lifecycle.
//!
//! Runs a dialog and a popup against an in-process [`HostWindow`], drives the
//! host through pause, resume and destruction, and prints one JSON line per
//! step describing what the overlays did.
//!
//! # Usage
//!
//! ```text
//! scrim [CONFIG.toml]
//! ```
//!
//! Without an argument `config.toml` from the data directory is used if it
//! exists. Spans are exported to the configured trace file.
//!
//! # Script
//!
//! 1. **Host**: translucent backdrop, orientation shim applied before resume
//! 2. **Dialog**: a post requested before showing, a confirm button, back key
//! 3. **Pause/resume**: enter animation suppressed, restored after the delay
//! 4. **Popup**: drop-down below an anchor, host window dimmed while shown
//! 5. **Teardown**: host destroyed with both overlays shown

#![allow(clippy::multiple_crate_versions)]

use scrim::compat::{fix_translucent_orientation, Orientation, OrientationControl, AFFECTED_PLATFORM_LEVEL};
use scrim::domain::{ContentRoot, Dimension, View, ViewId};
use scrim::host::{Host, HostWindow};
use scrim::observability::init_tracing;
use scrim::overlay::{AnchorRect, Dialog, Key, KeyEvent, OverlayInput, Popup};
use scrim::{Config, DialogBuilder, Gravity, PopupBuilder};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

const CONFIRM: ViewId = ViewId(1);
const MESSAGE: ViewId = ViewId(2);

fn load_config() -> scrim::Result<Config> {
    match std::env::args_os().nth(1) {
        Some(path) => Config::from_file(path),
        None => Config::load_default(),
    }
}

fn report(step: &str, detail: serde_json::Value) {
    println!("{}", json!({ "step": step, "detail": detail }));
}

fn dialog_content() -> ContentRoot {
    ContentRoot::new(
        View::new()
            .child(View::with_id(MESSAGE))
            .child(View::with_id(CONFIRM).text("OK")),
    )
}

fn main() -> scrim::Result<()> {
    let config = load_config()?;
    init_tracing(&config);
    tracing::info!(debug = config.debug, "scrim demo starting");

    let host = HostWindow::new("demo");
    host.set_translucent(true);
    host.set_requested_orientation(Orientation::Portrait);
    let orientation_reset = fix_translucent_orientation(&*host, AFFECTED_PLATFORM_LEVEL);
    host.resume();
    report(
        "host resumed",
        json!({
            "orientation_reset": orientation_reset,
            "orientation": host.requested_orientation(),
        }),
    );
    let events = Rc::new(RefCell::new(Vec::<String>::new()));

    let mut dialog = DialogBuilder::new(host.context(), &config);
    dialog
        .set_content_view(dialog_content())
        .set_gravity(Gravity::Bottom)
        .set_width(Dimension::Fill)
        .set_text(MESSAGE, "Discard draft?");
    {
        let events = Rc::clone(&events);
        dialog.add_on_dismiss_listener(Rc::new(move |overlay: &Dialog| {
            events.borrow_mut().push(format!("dialog {} dismissed", overlay.id()));
        }));
    }
    {
        let events = Rc::clone(&events);
        dialog.set_on_click_listener(
            CONFIRM,
            Rc::new(move |overlay: &Dialog, view: &Rc<View>| {
                events.borrow_mut().push(format!("clicked {}", view.current_text()));
                overlay.dismiss();
            }),
        );
    }
    {
        let events = Rc::clone(&events);
        dialog.post_delayed(
            move || events.borrow_mut().push("deferred post ran".to_string()),
            Duration::from_millis(50),
        );
    }

    dialog.show()?;
    let surface = dialog.surface();
    report(
        "dialog shown",
        json!({
            "showing": dialog.is_showing(),
            "attributes": surface.as_ref().map(Dialog::attributes),
            "pending_posts": dialog.pending_posts(),
        }),
    );
    host.queue().advance(Duration::from_millis(50));

    host.pause();
    let paused = surface.as_ref().map(Dialog::animation);
    host.resume();
    host.queue().advance(Duration::from_millis(config.overlay.resume_animation_delay_ms));
    report(
        "pause and resume",
        json!({
            "while_paused": paused,
            "after_resume": surface.as_ref().map(Dialog::animation),
        }),
    );

    if let Some(surface) = &surface {
        surface.handle_input(OverlayInput::Click(CONFIRM));
    }
    dialog.show()?;
    let second = dialog.surface();
    if let Some(second) = &second {
        second.handle_input(OverlayInput::Key(KeyEvent::up(Key::Back)));
    }
    let recreated = match (&surface, &second) {
        (Some(first), Some(second)) => !first.ptr_eq(second),
        _ => false,
    };
    report(
        "dialog recreated and canceled",
        json!({
            "new_instance": recreated,
            "showing": dialog.is_showing(),
        }),
    );

    let mut popup = PopupBuilder::new(host.context(), &config);
    popup
        .set_content_view(ContentRoot::new(View::new().text("Copied")))
        .set_background_dim_enabled(true)
        .set_background_dim_amount(0.2)
        .set_y_offset(4);
    popup.show_as_drop_down(AnchorRect {
        x: 40,
        y: 120,
        width: 200,
        height: 32,
    })?;
    report(
        "popup shown",
        json!({
            "origin": popup.surface().as_ref().and_then(Popup::origin),
            "host_dim": host.background_dim(),
        }),
    );

    dialog.show()?;
    host.destroy();
    report(
        "host destroyed",
        json!({
            "dialog_showing": dialog.is_showing(),
            "popup_showing": popup.is_showing(),
            "host_dim": host.background_dim(),
            "host_observers": host.observer_count(),
            "host_usable": host.is_usable(),
            "events": events.borrow().clone(),
        }),
    );

    tracing::info!("scrim demo finished");
    Ok(())
}
