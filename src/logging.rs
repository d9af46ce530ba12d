//! Subscriber setup and per-request logging.

use axum::{
    extract::{MatchedPath, Request},
    http::{Method, StatusCode},
    middleware::Next,
    response::Response,
};
use opentelemetry::{KeyValue, global, trace::TraceError};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    Resource,
    propagation::TraceContextPropagator,
    runtime,
    trace::{self as sdk_trace, RandomIdGenerator, Sampler, Tracer},
};
use opentelemetry_semantic_conventions::resource::{SERVICE_NAME, SERVICE_VERSION};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use crate::metrics::is_observability_enabled;

const LOG_DIR: &str = "storage/logs";
const DEFAULT_COLLECTOR: &str = "http://localhost:4317";
const DEFAULT_ENVIRONMENT: &str = "development";

/// Logs each request on the way in and its outcome on the way out.
///
/// The route template (`/api/students/{id}`) is logged rather than the raw
/// path so log lines group by endpoint.
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = req.method().clone();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());
    let request_id = Uuid::new_v4().to_string();

    info!(request_id = %request_id, method = %method, path = %route, "Incoming request");

    let response = next.run(req).await;
    log_outcome(&request_id, &method, &route, response.status(), started.elapsed());
    response
}

fn log_outcome(request_id: &str, method: &Method, route: &str, status: StatusCode, took: Duration) {
    let status = status.as_u16();
    let latency_ms = u64::try_from(took.as_millis()).unwrap_or(u64::MAX);

    match status {
        500..=599 => error!(request_id, %method, path = route, status, latency_ms, "Server error"),
        400..=499 => warn!(request_id, %method, path = route, status, latency_ms, "Client error"),
        _ => info!(request_id, %method, path = route, status, latency_ms, "Request completed"),
    }
}

/// Where spans go and how this process labels itself.
#[derive(Debug, Clone, PartialEq, Eq)]
struct OtlpExport {
    collector: String,
    environment: String,
}

impl OtlpExport {
    fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            collector: non_empty("OTEL_EXPORTER_OTLP_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_COLLECTOR.to_owned()),
            environment: non_empty("ENVIRONMENT").unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_owned()),
        }
    }

    fn resource(&self) -> Resource {
        Resource::new([
            KeyValue::new(SERVICE_NAME, env!("CARGO_PKG_NAME")),
            KeyValue::new(SERVICE_VERSION, env!("CARGO_PKG_VERSION")),
            KeyValue::new("environment", self.environment.clone()),
        ])
    }

    /// Installs the batch span pipeline and returns a tracer bound to it.
    fn install(self) -> Result<Tracer, TraceError> {
        info!(collector = %self.collector, "Starting OTLP span export");
        global::set_text_map_propagator(TraceContextPropagator::new());

        let trace_config = sdk_trace::Config::default()
            .with_sampler(Sampler::AlwaysOn)
            .with_id_generator(RandomIdGenerator::default())
            .with_resource(self.resource());
        let exporter = opentelemetry_otlp::new_exporter()
            .tonic()
            .with_endpoint(self.collector);

        opentelemetry_otlp::new_pipeline()
            .tracing()
            .with_exporter(exporter)
            .with_trace_config(trace_config)
            .install_batch(runtime::Tokio)
    }
}

/// Console filter: `RUST_LOG` wins, then `LOG_LEVEL` for this crate, then `info`.
fn console_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        EnvFilter::new(format!(
            "{}={level},edudesk_core={level},tower_http=warn,sqlx=warn,hyper=info,tonic=info",
            env!("CARGO_CRATE_NAME")
        ))
    })
}

/// Installs the global subscriber.
///
/// With observability enabled this writes compact console output, an
/// error log and a JSON log (daily rolling, under `storage/logs`) and
/// exports spans over OTLP when a collector is reachable. With
/// `OBSERVABILITY_ENABLED=false` only the console layer is installed.
pub fn init_tracing() -> std::io::Result<()> {
    let console_layer = fmt::layer()
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .compact()
        .with_filter(console_filter());

    if !is_observability_enabled() {
        tracing_subscriber::registry().with(console_layer).init();
        info!("Tracing initialized (console only, observability disabled)");
        return Ok(());
    }

    std::fs::create_dir_all(LOG_DIR)?;

    let error_log = fmt::layer()
        .with_writer(RollingFileAppender::new(Rotation::DAILY, LOG_DIR, "edudesk.log"))
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_filter(EnvFilter::new("error"));

    let json_log = fmt::layer()
        .json()
        .with_writer(RollingFileAppender::new(Rotation::DAILY, LOG_DIR, "edudesk.json"))
        .with_current_span(true)
        .with_span_list(true)
        .with_filter(EnvFilter::new("info"));

    // An absent layer is a no-op, so one registry covers both outcomes.
    let (span_export, export_error) = match OtlpExport::from_env().install() {
        Ok(tracer) => (Some(tracing_opentelemetry::layer().with_tracer(tracer)), None),
        Err(e) => (None, Some(e)),
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(error_log)
        .with(json_log)
        .with(span_export)
        .init();

    match export_error {
        None => info!("Tracing initialized with OTLP export and file logging"),
        Some(e) => warn!(error = %e, "OTLP export unavailable, tracing initialized with file logging only"),
    }

    Ok(())
}

/// Flushes pending spans. No-op when observability is disabled.
pub async fn shutdown_tracer() {
    if !is_observability_enabled() {
        return;
    }
    info!("Flushing OTLP spans");
    global::shutdown_tracer_provider();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn export_with(vars: &[(&str, &str)]) -> OtlpExport {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        OtlpExport::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_otlp_export_defaults() {
        let export = export_with(&[]);
        assert_eq!(export.collector, "http://localhost:4317");
        assert_eq!(export.environment, "development");
    }

    #[test]
    fn test_otlp_export_reads_overrides() {
        let export = export_with(&[
            ("OTEL_EXPORTER_OTLP_ENDPOINT", "http://collector:4317"),
            ("ENVIRONMENT", "production"),
        ]);
        assert_eq!(export.collector, "http://collector:4317");
        assert_eq!(export.environment, "production");
    }

    #[test]
    fn test_otlp_export_ignores_blank_values() {
        let export = export_with(&[("OTEL_EXPORTER_OTLP_ENDPOINT", "  "), ("ENVIRONMENT", "")]);
        assert_eq!(export, export_with(&[]));
    }
}
