//! `/silences` CRUD from §6: create, get, list, delete time-bounded
//! suppression rules. Mutating operations require a bearer token; reads do
//! not.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use alertgate_core::{GatewayError, SilenceId};
use alertgate_matcher::Matcher;
use alertgate_silence::{Silence, SilenceError};

use super::AppState;
use crate::error::ApiErrorResponse;

fn map_silence_error(err: SilenceError) -> GatewayError {
    match err {
        SilenceError::NotFound(id) => GatewayError::not_found(format!("silence not found: {id}")),
        SilenceError::InvalidBounds => GatewayError::validation("starts_at must precede ends_at"),
        SilenceError::Backend(msg) => GatewayError::internal("silence store backend error").with_details(msg),
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateSilenceRequest {
    matchers: Vec<Matcher>,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    created_by: String,
    #[serde(default)]
    comment: String,
}

pub async fn create(State(state): State<AppState>, Json(req): Json<CreateSilenceRequest>) -> Result<Response, ApiErrorResponse> {
    let silence = state
        .silences
        .create(req.matchers, req.starts_at, req.ends_at, req.created_by, req.comment)
        .await
        .map_err(map_silence_error)?;
    Ok((StatusCode::CREATED, Json(silence)).into_response())
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Silence>, ApiErrorResponse> {
    let id = SilenceId::new(id);
    state.silences.get(&id).await.map(Json).ok_or_else(|| GatewayError::not_found(format!("silence not found: {}", id.as_str())).into())
}

pub async fn list(State(state): State<AppState>) -> Json<Vec<Silence>> {
    Json(state.silences.list().await)
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode, ApiErrorResponse> {
    let id = SilenceId::new(id);
    state.silences.delete(&id).await.map_err(map_silence_error)?;
    Ok(StatusCode::NO_CONTENT)
}
