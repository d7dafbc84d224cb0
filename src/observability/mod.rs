//! OpenTelemetry-based tracing with file-based span export.
//!
//! Lifecycle events (create, show, dismiss, binder attach/detach, deferred
//! posts) are emitted through `tracing`. When tracing is initialised, spans
//! are bridged into OpenTelemetry and written as OTLP JSON lines to a local
//! file for offline inspection:
//!
//! ```text
//! tracing → tracing-opentelemetry → OpenTelemetry SDK → FileSpanExporter → JSON lines
//! ```
//!
//! # Features
//!
//! - **File export**: one OTLP JSON document per exported batch, one per line
//! - **Rotation**: the file rotates at 10 MiB, 3 timestamped backups are kept
//! - **Resource metadata**: `service.name` and `service.version`
//!
//! # Configuration
//!
//! The filter directive is `Config::trace_level`, falling back to `"debug"`
//! when `Config::debug` is set and `"info"` otherwise. The target file is
//! `Config::trace_path()`.
//!
//! # Usage
//!
//! ```rust
//! use scrim::observability::init_tracing;
//! use scrim::Config;
//!
//! let dir = std::env::temp_dir().join("scrim-doc-traces");
//! let config = Config {
//!     trace_file: Some(dir.join("traces.json")),
//!     ..Config::default()
//! };
//! init_tracing(&config);
//!
//! tracing::debug!("tracing is now active");
//! ```
//!
//! # Modules
//!
//! - `init`: subscriber setup
//! - `tracer`: tracer provider with the file exporter
//! - `span_formatter`: OTLP JSON encoding
//! - `file_writer`: size-rotated line writer

mod file_writer;
mod init;
mod span_formatter;
mod tracer;

pub use init::init_tracing;
