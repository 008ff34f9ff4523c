//! The HTTP surface from §6: one router wiring public health/classification
//! endpoints, and auth-gated control-plane endpoints, to the shared
//! [`AppState`] collaborators. Grounded on `acteon-server`'s `api::router`
//! (public/protected route groups composed with layered middleware) with
//! its audit/embedding/UI concerns dropped.

mod classification;
mod dlq;
mod enrichment;
mod health;
mod history;
mod silences;
mod webhook;

use std::sync::Arc;

use alertgate_classifier::Classifier;
use alertgate_ingestion::{EnrichmentModeController, Pipeline};
use alertgate_publisher::{DlqStore, Publisher};
use alertgate_silence::SilenceStore;
use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::require_bearer_token;
use crate::config::AuthConfig;
use crate::ratelimit::{rate_limit, RateLimiter};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub classifier: Arc<Classifier>,
    pub silences: Arc<SilenceStore>,
    pub dlq: Arc<DlqStore>,
    pub history: Arc<dyn alertgate_history::HistoryStore>,
    pub mode: Arc<EnrichmentModeController>,
    pub publisher: Arc<Publisher>,
    pub auth: AuthConfig,
    pub rate_limiter: Arc<RateLimiter>,
}

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/enrichment/mode", post(enrichment::set_mode))
        .route("/silences", post(silences::create))
        .route("/silences/{id}", axum::routing::delete(silences::delete))
        .route("/publishing/dlq/{id}/replay", post(dlq::replay))
        .route("/publishing/dlq", axum::routing::delete(dlq::purge))
        .layer(middleware::from_fn_with_state(state.clone(), require_bearer_token));

    let public = Router::new()
        .route("/webhook", post(webhook::accept))
        .route("/classification/classify", post(classification::classify))
        .route("/enrichment/mode", get(enrichment::get_mode))
        .route("/history", get(history::query))
        .route("/silences", get(silences::list))
        .route("/silences/{id}", get(silences::get))
        .route("/publishing/dlq", get(dlq::list))
        .route("/metrics", get(health::metrics))
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
