//! Converts the internal [`GatewayError`] taxonomy into the wire envelope
//! from §7: `{error: {code, message, request_id, timestamp, details?}}`.
//! Handlers return `Result<T, ApiErrorResponse>` and let this `IntoResponse`
//! impl do the status-code mapping, the same separation `acteon-server`'s
//! `ServerError` keeps between domain errors and their HTTP rendering.

use axum::Json;
use axum::extract::FromRequestParts;
use axum::http::{StatusCode, request::Parts};
use axum::response::{IntoResponse, Response};

use alertgate_core::{ApiError, GatewayError};

/// Per-request correlation id, attached as an extension by the tracing
/// middleware and echoed into every error body.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

impl<S: Send + Sync> FromRequestParts<S> for RequestId {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<RequestId>().cloned().unwrap_or_else(|| RequestId(uuid::Uuid::new_v4().to_string())))
    }
}

/// Wraps a [`GatewayError`] together with the request id it should be
/// rendered with, so `IntoResponse` does not need a thread-local or a
/// second extractor just to fill in `request_id`.
pub struct ApiErrorResponse {
    pub error: GatewayError,
    pub request_id: String,
}

impl ApiErrorResponse {
    #[must_use]
    pub fn new(error: GatewayError, request_id: impl Into<String>) -> Self {
        Self { error, request_id: request_id.into() }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.error.kind.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ApiError::from_gateway_error(&self.error, self.request_id, chrono::Utc::now());
        if !matches!(status, StatusCode::OK) {
            tracing::warn!(kind = ?self.error.kind, message = %self.error.message, details = ?self.error.details, "request failed");
        }
        (status, Json(body)).into_response()
    }
}

impl From<GatewayError> for ApiErrorResponse {
    fn from(error: GatewayError) -> Self {
        Self::new(error, uuid::Uuid::new_v4().to_string())
    }
}
