//! Bearer-token authentication: a single compare against a small configured
//! set, not a full identity system — the out-of-scope auth middleware is
//! represented here only to the extent §6 requires it ("POST
//! `/enrichment/mode` and mutating DLQ ops require an authenticated
//! principal"). Grounded on the shape of `acteon-server`'s `AuthLayer`
//! (middleware that rejects before the handler runs) without its JWT/role
//! machinery, which nothing in this surface needs.

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use alertgate_core::GatewayError;

use crate::api::AppState;
use crate::error::ApiErrorResponse;

fn bearer_token(req: &Request<Body>) -> Option<&str> {
    req.headers().get(axum::http::header::AUTHORIZATION)?.to_str().ok()?.strip_prefix("Bearer ")
}

/// Rejects the request with `AuthError` unless the `Authorization: Bearer
/// <token>` header matches one of the configured tokens. An empty
/// configured set means every call is rejected — there is no "auth
/// disabled" mode for endpoints this guards.
pub async fn require_bearer_token(State(state): State<AppState>, req: Request<Body>, next: Next) -> Result<Response, ApiErrorResponse> {
    let ok = bearer_token(&req).is_some_and(|tok| state.auth.tokens.iter().any(|known| known == tok));
    if !ok {
        return Err(GatewayError::new(alertgate_core::ErrorKind::AuthError, "missing or invalid bearer token").into());
    }
    Ok(next.run(req).await)
}
