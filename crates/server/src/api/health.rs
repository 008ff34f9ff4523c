//! `/healthz`, `/readyz`, `/metrics` from §6. Liveness is unconditional;
//! readiness additionally checks the classifier's breaker hasn't tripped
//! open, since an open breaker means the process is degraded but still
//! alive. Metrics render the pipeline counters as Prometheus text, the way
//! the in-process `PipelineMetrics` snapshot is designed to be exposed.

use axum::extract::State;
use axum::http::StatusCode;

use super::AppState;

pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

pub async fn readyz(State(state): State<AppState>) -> StatusCode {
    if state.classifier.breaker_is_open().await {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    }
}

pub async fn metrics(State(state): State<AppState>) -> String {
    let snapshot = state.pipeline.metrics().snapshot();
    let mut out = String::new();
    out.push_str(&format!("alertgate_alerts_received_total {}\n", snapshot.alerts_received));
    out.push_str(&format!("alertgate_alerts_processed_total {}\n", snapshot.alerts_processed));
    out.push_str(&format!("alertgate_inhibited_total {}\n", snapshot.inhibited_total));
    out.push_str(&format!("alertgate_published_total {}\n", snapshot.published_total));
    out.push_str(&format!("alertgate_history_write_failures_total {}\n", snapshot.history_write_failures));
    for (silence_id, count) in &snapshot.silence_matched {
        out.push_str(&format!("alertgate_silence_matched_total{{silence_id=\"{silence_id}\"}} {count}\n"));
    }
    out
}
