//! `GET`/`POST /enrichment/mode`: read and flip the process-wide
//! bypass/transparent/enriched switch from §4.7. The GET is public so
//! dashboards can poll it; the POST requires a bearer token since it
//! changes behavior for every in-flight request.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use alertgate_core::GatewayError;
use alertgate_ingestion::EnrichmentMode;

use super::AppState;
use crate::error::ApiErrorResponse;

#[derive(Debug, Serialize)]
pub struct ModeResponse {
    mode: &'static str,
    source: &'static str,
}

pub async fn get_mode(State(state): State<AppState>) -> Json<ModeResponse> {
    let (mode, source) = state.mode.current();
    Json(ModeResponse { mode: mode.as_str(), source: source.as_str() })
}

#[derive(Debug, Deserialize)]
pub struct SetModeRequest {
    mode: String,
}

pub async fn set_mode(State(state): State<AppState>, Json(req): Json<SetModeRequest>) -> Result<Json<ModeResponse>, ApiErrorResponse> {
    let mode = EnrichmentMode::parse(&req.mode)
        .ok_or_else(|| GatewayError::validation(format!("unrecognized enrichment mode: {}", req.mode)))?;
    state.mode.set_mode(mode).await?;
    let (mode, source) = state.mode.current();
    Ok(Json(ModeResponse { mode: mode.as_str(), source: source.as_str() }))
}
