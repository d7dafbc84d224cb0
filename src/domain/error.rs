//! Error types for the overlay framework.
//!
//! This module defines the centralized error type [`ScrimError`] and a type alias
//! [`Result`]. Only programmer-misuse faults and configuration/IO failures are
//! errors. Stale hosts, reclaimed listeners and unresolvable hosts are normal
//! operating conditions and never produce an error value.

use thiserror::Error;

/// The main error type for overlay construction and configuration.
///
/// # Examples
///
/// ```
/// use scrim::ScrimError;
/// use scrim::host::AppContext;
/// use scrim::overlay::OverlayBuilder;
/// use scrim::Config;
///
/// let mut builder = OverlayBuilder::<scrim::Modal>::new(AppContext::new(), &Config::default());
/// let err: ScrimError = builder.create().unwrap_err();
/// assert!(matches!(err, ScrimError::NoContent));
/// ```
#[derive(Debug, Error)]
pub enum ScrimError {
    /// An overlay was created or shown before any content root was set.
    ///
    /// Raised by `create()` and by `show()` when it has to create the surface.
    #[error("overlay has no content view: call set_content_view before create or show")]
    NoContent,

    /// A raw platform gravity constant is not one the framework can place.
    ///
    /// Raised by the raw-bits gravity setters; typed [`Gravity`](crate::Gravity)
    /// values are always accepted.
    #[error("unsupported gravity constant: {0:#x}")]
    UnsupportedGravity(u32),

    /// Configuration is invalid.
    ///
    /// The string describes the offending key and value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration text could not be parsed as TOML.
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized `Result` type for overlay operations.
pub type Result<T> = std::result::Result<T, ScrimError>;
