//! Scrim: transient overlays (dialogs and popups) bound to their host's lifecycle.
//!
//! Scrim manages the lifecycle of overlays shown above a host container's
//! main content:
//! - Deferred configuration: set anything before or after the surface exists
//! - One generic mechanism for modal dialogs and anchored popups
//! - Automatic force-dismiss and reference release when the host is destroyed
//! - Listener registries that survive surface recreation and never leak
//! - Posts that wait for the first show and never run against a dead surface
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Demo binary (main.rs)                              │  ← Scripted walkthrough
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Overlay Layer (overlay/)                           │
//! │  - Deferred builder                                 │  ← Staging + forwarding
//! │  - Overlay surface state machine                    │  ← Source of truth
//! │  - Host-lifecycle binder                            │  ← Teardown on destroy
//! │  - Listener registries, leak-safe adapters          │
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ Host Layer    │   │ Domain Layer  │   │ Compat Layer  │
//! │ (host/)       │   │ (domain/)     │   │ (compat/)     │
//! │ - Lifecycle   │   │ - Descriptor  │   │ - Orientation │
//! │ - Task queue  │   │ - Gravity     │   │   shim        │
//! │ - HostWindow  │   │ - Content     │   │               │
//! └───────────────┘   └───────────────┘   └───────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Infrastructure (infrastructure/)                   │
//! │  - Identity-deduplicated listener registry          │
//! │  - Data directory paths                             │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Observability (observability/)                     │  ← Optional
//! │  - OpenTelemetry tracing, file-based OTLP export    │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`overlay`]: Builders, surfaces, binder, listeners
//! - [`host`]: Host contracts, task queue, reference host
//! - [`domain`]: Value types (descriptor, gravity, content, errors)
//! - [`compat`]: Platform quirk workarounds
//! - [`infrastructure`]: Listener registry and paths
//! - [`observability`]: Tracing initialisation
//!
//! # Configuration
//!
//! Defaults for every new overlay come from a TOML file:
//!
//! ```toml
//! # ~/.local/share/scrim/config.toml
//! debug = false
//! trace_level = "info"
//!
//! [overlay]
//! cancelable = true
//! canceled_on_touch_outside = true
//! background_dim_enabled = true
//! background_dim_amount = 0.5
//! resume_animation_delay_ms = 100
//! ```
//!
//! # Threading
//!
//! Everything runs on the host's single sequencing thread. Handles are `Rc`
//! based and neither `Send` nor `Sync`; deferred work goes through the host's
//! [`TaskQueue`](host::TaskQueue).
//!
//! # Example
//!
//! ```rust
//! use scrim::domain::{ContentRoot, View, ViewId};
//! use scrim::host::HostWindow;
//! use scrim::overlay::{Dialog, DialogBuilder};
//! use scrim::Config;
//! use std::rc::Rc;
//!
//! let host = HostWindow::new("checkout");
//! let mut builder = DialogBuilder::new(host.context(), &Config::default());
//! builder
//!     .set_content_view(ContentRoot::new(
//!         View::new().child(View::with_id(ViewId(1)).text("Pay now?")),
//!     ))
//!     .add_on_dismiss_listener(Rc::new(|dialog: &Dialog| {
//!         tracing::info!(overlay_id = dialog.id(), "payment dialog closed");
//!     }));
//!
//! builder.show()?;
//! assert!(builder.is_showing());
//!
//! // Host teardown dismisses the dialog and releases the binder.
//! host.destroy();
//! assert!(!builder.is_showing());
//! assert_eq!(host.observer_count(), 0);
//! # Ok::<(), scrim::ScrimError>(())
//! ```

#![allow(clippy::multiple_crate_versions)]

pub mod compat;
pub mod domain;
pub mod host;
pub mod infrastructure;
pub mod overlay;

pub mod observability;

pub use domain::{Animation, Dimension, Gravity, OverlayDefaults, Result, ScrimError};
pub use overlay::{
    Anchored, Dialog, DialogBuilder, Modal, Overlay, OverlayBuilder, OverlayKind, Popup, PopupBuilder,
};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Name of the configuration file inside the data directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Name of the trace file inside the data directory.
pub const TRACE_FILE_NAME: &str = "scrim-otlp.json";

/// Library configuration.
///
/// Passed explicitly to every builder; nothing reads process-wide switches.
///
/// # Example
///
/// ```rust
/// use scrim::Config;
///
/// let config = Config::from_toml_str(
///     r#"
///     debug = true
///
///     [overlay]
///     background_dim_amount = 0.8
///     "#,
/// )?;
/// assert!(config.debug);
/// assert!(config.overlay.cancelable);
/// assert!((config.overlay.background_dim_amount - 0.8).abs() < f32::EPSILON);
/// # Ok::<(), scrim::ScrimError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logs surface creation at `info` level with the resolved attributes.
    pub debug: bool,

    /// Filter directive for tracing.
    ///
    /// Options: `trace`, `debug`, `info`, `warn`, `error`, or any
    /// `EnvFilter` directive. Default: `"info"` (`"debug"` when `debug` is set)
    pub trace_level: Option<String>,

    /// Where spans are exported. A leading `~` is expanded.
    ///
    /// Default: `scrim-otlp.json` in the data directory.
    pub trace_file: Option<PathBuf>,

    /// Defaults seeded into every overlay descriptor.
    pub overlay: OverlayDefaults,
}

impl Config {
    /// Parses and validates TOML configuration text.
    ///
    /// # Errors
    ///
    /// [`ScrimError::ConfigParse`] for malformed TOML,
    /// [`ScrimError::Config`] for out-of-range values.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// [`ScrimError::Io`] if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// Loads `config.toml` from the data directory, or the defaults if there
    /// is no such file.
    ///
    /// # Errors
    ///
    /// As [`from_file`](Self::from_file) when the file exists.
    pub fn load_default() -> Result<Self> {
        let path = infrastructure::get_data_dir().join(CONFIG_FILE_NAME);
        if !path.is_file() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    /// Builds configuration from flat key/value pairs, as embedders pass it.
    ///
    /// Parsing is lenient: unknown keys are ignored and unparsable values
    /// fall back to their defaults.
    ///
    /// # Parsing Rules
    ///
    /// - `debug`, `cancelable`, `canceled_on_touch_outside`,
    ///   `background_dim_enabled`: `"true"` / `"false"`
    /// - `background_dim_amount`: float, clamped to `[0.0, 1.0]`
    /// - `resume_animation_delay_ms`: unsigned integer
    /// - `trace_level`, `trace_file`: taken as-is, `~` expanded for the file
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::collections::BTreeMap;
    /// use scrim::Config;
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("cancelable".to_string(), "false".to_string());
    /// map.insert("background_dim_amount".to_string(), "lots".to_string());
    ///
    /// let config = Config::from_map(&map);
    /// assert!(!config.overlay.cancelable);
    /// assert!((config.overlay.background_dim_amount - 0.5).abs() < f32::EPSILON);
    /// ```
    #[must_use]
    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        fn flag(map: &BTreeMap<String, String>, key: &str, default: bool) -> bool {
            map.get(key)
                .and_then(|value| value.trim().parse::<bool>().ok())
                .unwrap_or(default)
        }

        let defaults = OverlayDefaults::default();
        let overlay = OverlayDefaults {
            cancelable: flag(map, "cancelable", defaults.cancelable),
            canceled_on_touch_outside: flag(map, "canceled_on_touch_outside", defaults.canceled_on_touch_outside),
            background_dim_enabled: flag(map, "background_dim_enabled", defaults.background_dim_enabled),
            background_dim_amount: map
                .get("background_dim_amount")
                .and_then(|value| value.trim().parse::<f32>().ok())
                .filter(|amount| amount.is_finite())
                .map_or(defaults.background_dim_amount, |amount| amount.clamp(0.0, 1.0)),
            resume_animation_delay_ms: map
                .get("resume_animation_delay_ms")
                .and_then(|value| value.trim().parse::<u64>().ok())
                .unwrap_or(defaults.resume_animation_delay_ms),
        };

        Self {
            debug: flag(map, "debug", false),
            trace_level: map.get("trace_level").cloned(),
            trace_file: map.get("trace_file").map(|path| infrastructure::expand_tilde(path)),
            overlay,
        }
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// [`ScrimError::Config`] if the dim amount is outside `[0.0, 1.0]`.
    pub fn validate(&self) -> Result<()> {
        let amount = self.overlay.background_dim_amount;
        if !(0.0..=1.0).contains(&amount) {
            return Err(ScrimError::Config(format!(
                "overlay.background_dim_amount must be within [0.0, 1.0], got {amount}"
            )));
        }
        Ok(())
    }

    /// The effective tracing filter directive.
    #[must_use]
    pub fn effective_trace_level(&self) -> String {
        self.trace_level.clone().unwrap_or_else(|| {
            if self.debug {
                "debug".to_string()
            } else {
                "info".to_string()
            }
        })
    }

    /// The file spans are exported to.
    #[must_use]
    pub fn trace_path(&self) -> PathBuf {
        match &self.trace_file {
            Some(path) => path
                .to_str()
                .map_or_else(|| path.clone(), infrastructure::expand_tilde),
            None => infrastructure::get_data_dir().join(TRACE_FILE_NAME),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.overlay.resume_animation_delay_ms, 100);
    }

    #[test]
    fn out_of_range_dim_is_rejected() {
        let err = Config::from_toml_str("[overlay]\nbackground_dim_amount = 1.5\n").unwrap_err();
        assert!(matches!(err, ScrimError::Config(_)));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = Config::from_toml_str("debug = ").unwrap_err();
        assert!(matches!(err, ScrimError::ConfigParse(_)));
    }

    #[test]
    fn reads_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "trace_level = \"trace\"\n[overlay]\ncancelable = false").unwrap();
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.effective_trace_level(), "trace");
        assert!(!config.overlay.cancelable);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::from_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ScrimError::Io(_)));
    }

    #[test]
    fn from_map_clamps_and_falls_back() {
        let mut map = BTreeMap::new();
        map.insert("background_dim_amount".to_string(), "3.0".to_string());
        map.insert("resume_animation_delay_ms".to_string(), "-5".to_string());
        map.insert("debug".to_string(), "true".to_string());
        let config = Config::from_map(&map);
        assert!((config.overlay.background_dim_amount - 1.0).abs() < f32::EPSILON);
        assert_eq!(config.overlay.resume_animation_delay_ms, 100);
        assert_eq!(config.effective_trace_level(), "debug");
    }

    #[test]
    fn explicit_trace_file_wins() {
        let config = Config {
            trace_file: Some(PathBuf::from("/tmp/scrim-test.json")),
            ..Config::default()
        };
        assert_eq!(config.trace_path(), PathBuf::from("/tmp/scrim-test.json"));
    }
}
