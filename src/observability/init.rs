//! Subscriber setup.

use super::tracer;
use crate::Config;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_sdk::resource::Resource;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const SERVICE_NAME: &str = "scrim";

/// Installs the global subscriber with file-based OTLP export.
///
/// Returns `true` if this call installed the subscriber. Tracing is optional:
/// if the trace directory cannot be created, or a global subscriber is
/// already set, nothing happens and `false` is returned.
///
/// # Example
///
/// ```rust
/// use scrim::observability::init_tracing;
/// use scrim::Config;
///
/// let config = Config {
///     trace_level: Some("scrim=trace".to_string()),
///     trace_file: Some(std::env::temp_dir().join("scrim-init-doc.json")),
///     ..Config::default()
/// };
/// let installed = init_tracing(&config);
/// // A second call never replaces the first subscriber.
/// assert!(!init_tracing(&config) || !installed);
/// ```
pub fn init_tracing(config: &Config) -> bool {
    let trace_file = config.trace_path();
    if let Some(parent) = trace_file.parent() {
        if std::fs::create_dir_all(parent).is_err() {
            return false;
        }
    }

    let resource = Resource::new(vec![
        KeyValue::new("service.name", SERVICE_NAME),
        KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
    ]);
    let provider = tracer::file_tracer_provider(trace_file, resource);
    let otel_layer = OpenTelemetryLayer::new(provider.tracer(SERVICE_NAME));

    tracing_subscriber::registry()
        .with(EnvFilter::new(config.effective_trace_level()))
        .with(otel_layer)
        .try_init()
        .is_ok()
}
