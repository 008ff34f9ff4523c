//! `/publishing/dlq` from §6: list (filtered, paged), replay, and purge
//! dead-lettered jobs. Listing is public; replay and purge are mutating
//! and require a bearer token.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use alertgate_core::{DlqEntry, GatewayError, JobId, Priority, PublishErrorKind, ReceiverName};
use alertgate_publisher::{DlqError, DlqFilter};

use super::AppState;
use crate::error::ApiErrorResponse;

fn map_dlq_error(err: DlqError) -> GatewayError {
    match err {
        DlqError::NotFound(id) => GatewayError::not_found(format!("dlq entry not found: {id}")),
        DlqError::AlreadyReplayed(id) => GatewayError::new(alertgate_core::ErrorKind::Conflict, format!("dlq entry already replayed: {id}")),
        DlqError::Backend(msg) => GatewayError::internal("dlq backend error").with_details(msg),
    }
}

#[derive(Debug, Deserialize)]
pub struct DlqQuery {
    receiver: Option<String>,
    error_kind: Option<PublishErrorKind>,
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
pub struct DlqPageBody {
    entries: Vec<DlqEntry>,
    total: usize,
    page: usize,
    limit: usize,
}

fn filter_from_query(q: &DlqQuery) -> DlqFilter {
    DlqFilter { receiver: q.receiver.clone().map(ReceiverName::new), error_kind: q.error_kind, failed_before: None }
}

pub async fn list(State(state): State<AppState>, Query(q): Query<DlqQuery>) -> Result<Json<DlqPageBody>, ApiErrorResponse> {
    let filter = filter_from_query(&q);
    let page = state.dlq.list(&filter, q.page, q.limit).await.map_err(map_dlq_error)?;
    Ok(Json(DlqPageBody { entries: page.entries, total: page.total, page: page.page, limit: page.limit }))
}

#[derive(Debug, Deserialize)]
pub struct ReplayRequest {
    #[serde(default = "default_replay_priority")]
    priority: Priority,
}

fn default_replay_priority() -> Priority {
    Priority::Normal
}

pub async fn replay(State(state): State<AppState>, Path(id): Path<String>, Json(req): Json<ReplayRequest>) -> Result<StatusCode, ApiErrorResponse> {
    let job_id = JobId::new(id);
    let job = state.dlq.replay(&job_id, req.priority, Utc::now()).await.map_err(map_dlq_error)?;
    state.publisher.publish(vec![job]).await;
    Ok(StatusCode::ACCEPTED)
}

#[derive(Debug, Deserialize)]
pub struct PurgeQuery {
    receiver: Option<String>,
    error_kind: Option<PublishErrorKind>,
}

#[derive(Debug, Serialize)]
pub struct PurgeResponse {
    purged: usize,
}

pub async fn purge(State(state): State<AppState>, Query(q): Query<PurgeQuery>) -> Result<Json<PurgeResponse>, ApiErrorResponse> {
    let filter = DlqFilter { receiver: q.receiver.map(ReceiverName::new), error_kind: q.error_kind, failed_before: None };
    let purged = state.dlq.purge(&filter).await.map_err(map_dlq_error)?;
    Ok(Json(PurgeResponse { purged }))
}
