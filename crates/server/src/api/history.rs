//! `GET /history`: paged, filtered query over durably recorded alert
//! occurrences, per §6's `fingerprint`/`severity`/`since`/`page`/`limit`
//! query parameters.

use axum::Json;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use alertgate_core::{Fingerprint, Severity};
use alertgate_history::{HistoryFilter, HistoryRecord};

use super::AppState;
use crate::error::ApiErrorResponse;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    fingerprint: Option<String>,
    severity: Option<String>,
    since: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default = "default_page")]
    page: usize,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_page() -> usize {
    1
}

fn default_limit() -> usize {
    50
}

#[derive(Debug, Serialize)]
pub struct HistoryPageBody {
    records: Vec<HistoryRecord>,
    total: usize,
    page: usize,
    limit: usize,
}

pub async fn query(State(state): State<AppState>, Query(q): Query<HistoryQuery>) -> Result<Json<HistoryPageBody>, ApiErrorResponse> {
    let severity = match q.severity.as_deref() {
        Some("critical") => Some(Severity::Critical),
        Some("warning") => Some(Severity::Warning),
        Some("info") => Some(Severity::Info),
        Some("noise") => Some(Severity::Noise),
        _ => None,
    };
    let filter = HistoryFilter { fingerprint: q.fingerprint.map(Fingerprint::new), severity, since: q.since };

    let page = state
        .history
        .query(&filter, q.page, q.limit)
        .await
        .map_err(|e| alertgate_core::GatewayError::internal("history query failed").with_details(e.to_string()))?;

    Ok(Json(HistoryPageBody { records: page.records, total: page.total, page: page.page, limit: page.limit }))
}
