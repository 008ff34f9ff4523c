//! `POST /webhook`: alertmanager-shaped ingestion, per §4.6/§6. Status
//! selection mirrors the user-visible behavior table: 200 full success,
//! 207 partial, 400 on batch-level parse/validation failure, 500 only when
//! every alert in a non-empty batch failed.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use super::AppState;
use crate::error::ApiErrorResponse;

#[derive(Debug, Serialize)]
struct AlertOutcomeBody {
    fingerprint: String,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct IngestResponseBody {
    received: usize,
    processed: usize,
    outcomes: Vec<AlertOutcomeBody>,
}

pub async fn accept(State(state): State<AppState>, body: axum::body::Bytes) -> Result<Response, ApiErrorResponse> {
    let result = state.pipeline.accept(&body).await?;

    let status = if result.all_failed() {
        StatusCode::INTERNAL_SERVER_ERROR
    } else if result.is_partial() {
        StatusCode::MULTI_STATUS
    } else {
        StatusCode::OK
    };

    let body = IngestResponseBody {
        received: result.received,
        processed: result.processed(),
        outcomes: result.outcomes.iter().map(|o| AlertOutcomeBody { fingerprint: o.fingerprint.as_str().to_string(), error: o.error.clone() }).collect(),
    };

    Ok((status, Json(body)).into_response())
}
