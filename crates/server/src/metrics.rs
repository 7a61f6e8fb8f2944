//! Prometheus metrics

use axum::http::StatusCode;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static PROMETHEUS: OnceCell<Option<PrometheusHandle>> = OnceCell::new();

/// Install the global Prometheus recorder (idempotent)
pub fn init_metrics() -> Option<PrometheusHandle> {
    PROMETHEUS
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install Prometheus recorder");
                None
            },
        })
        .clone()
}

/// `GET /metrics`
pub async fn metrics_handler() -> impl IntoResponse {
    match PROMETHEUS.get().and_then(|h| h.as_ref()) {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics disabled".to_string()),
    }
}

pub fn record_transcript() {
    metrics::counter!("jinny_transcripts_total").increment(1);
}

pub fn record_completion_latency(provider: &'static str, elapsed_ms: f64) {
    metrics::histogram!("jinny_completion_latency_ms", "provider" => provider).record(elapsed_ms);
}

pub fn record_completion_error(kind: &'static str) {
    metrics::counter!("jinny_completion_errors_total", "kind" => kind).increment(1);
}

pub fn connection_opened() {
    metrics::gauge!("jinny_active_connections").increment(1.0);
}

pub fn connection_closed() {
    metrics::gauge!("jinny_active_connections").decrement(1.0);
}
