use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
    routing::get,
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

static OBSERVABILITY_ENABLED: OnceLock<bool> = OnceLock::new();

/// Check if observability is enabled via OBSERVABILITY_ENABLED env var
pub fn is_observability_enabled() -> bool {
    *OBSERVABILITY_ENABLED.get_or_init(|| {
        std::env::var("OBSERVABILITY_ENABLED")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(true)
    })
}

/// Installs the Prometheus recorder and spawns its upkeep task.
/// Returns `None` if observability is disabled.
pub fn init_metrics() -> Result<Option<PrometheusHandle>, BuildError> {
    if !is_observability_enabled() {
        return Ok(None);
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[
                0.001, 0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5,
                10.0,
            ],
        )?
        .install_recorder()?;

    let upkeep_handle = handle.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(5)).await;
            upkeep_handle.run_upkeep();
        }
    });

    Ok(Some(handle))
}

/// Metrics middleware to track HTTP requests
pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    if !is_observability_enabled() {
        return next.run(req).await;
    }

    let start = Instant::now();
    let method = req.method().as_str().to_owned();
    let uri_path = req.uri().path().to_owned();

    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or(uri_path);

    gauge!("http_requests_active").increment(1.0);

    let response = next.run(req).await;

    let latency = start.elapsed().as_secs_f64();
    let status = response.status().as_u16();

    counter!("http_requests_total", "method" => method.clone(), "path" => path.clone(), "status" => status.to_string()).increment(1);
    histogram!("http_request_duration_seconds", "method" => method, "path" => path).record(latency);

    let status_category = match status {
        200..=299 => "2xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    };
    counter!("http_requests_by_status", "status_category" => status_category).increment(1);

    gauge!("http_requests_active").decrement(1.0);

    response
}

/// Router for metrics server
pub fn metrics_app(handle: PrometheusHandle) -> Router {
    Router::new().route("/metrics", get(move || async move { handle.render() }))
}

// Business metrics helpers

pub fn track_student_enrolled() {
    if !is_observability_enabled() {
        return;
    }
    counter!("students_enrolled_total").increment(1);
}

pub fn track_fee_created(item_count: usize) {
    if !is_observability_enabled() {
        return;
    }
    counter!("fees_created_total").increment(1);
    histogram!("fee_items_per_fee").record(item_count as f64);
}

pub fn track_payment_recorded(method: &str, amount: f64) {
    if !is_observability_enabled() {
        return;
    }
    counter!("payments_recorded_total", "method" => method.to_string()).increment(1);
    counter!("payments_amount_cents_total", "method" => method.to_string())
        .increment((amount * 100.0).round() as u64);
}

pub fn track_payment_reversed() {
    if !is_observability_enabled() {
        return;
    }
    counter!("payments_reversed_total").increment(1);
}

/// Track bulk timetable saves by how many entries actually changed
pub fn track_schedule_bulk_update(updated: usize, unchanged: usize) {
    if !is_observability_enabled() {
        return;
    }
    counter!("schedule_bulk_updates_total").increment(1);
    counter!("schedule_entries_updated_total").increment(updated as u64);
    counter!("schedule_entries_unchanged_total").increment(unchanged as u64);
}

pub fn track_schedule_conflicts(kind: &str, count: usize) {
    if !is_observability_enabled() || count == 0 {
        return;
    }
    counter!("schedule_conflicts_total", "kind" => kind.to_string()).increment(count as u64);
}
