//! `POST /classification/classify`: classify one alert outside the
//! ingestion pipeline, for operators probing the classifier directly.
//!
//! [`alertgate_classifier::Classifier::classify`] never errors its caller —
//! it degrades to a deterministic rule-based fallback instead — so this
//! handler always returns 200. The 503/504 paths named for "model
//! unavailable" in the error table are unreachable given that design; they
//! would only fire if a future classifier implementation could fail the
//! fallback too.

use axum::Json;
use axum::extract::State;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use alertgate_core::{ClassificationVerdict, VerdictSource};
use alertgate_ingestion::{build_single_alert, WebhookAlert};

use super::AppState;
use crate::error::ApiErrorResponse;

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    #[serde(flatten)]
    alert: WebhookAlert,
    #[serde(default)]
    force: bool,
}

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    severity: alertgate_core::Severity,
    confidence: f64,
    reasoning: String,
    recommendations: Vec<String>,
    source: VerdictSource,
    model: Option<String>,
    timestamp: chrono::DateTime<Utc>,
}

impl From<ClassificationVerdict> for ClassifyResponse {
    fn from(v: ClassificationVerdict) -> Self {
        Self {
            severity: v.severity,
            confidence: v.confidence,
            reasoning: v.reasoning,
            recommendations: v.recommendations,
            source: v.source,
            model: v.model_id,
            timestamp: Utc::now(),
        }
    }
}

pub async fn classify(State(state): State<AppState>, Json(req): Json<ClassifyRequest>) -> Result<Json<ClassifyResponse>, ApiErrorResponse> {
    let alert = build_single_alert(req.alert)?;
    let verdict = state.classifier.classify(&alert, req.force).await;
    Ok(Json(verdict.into()))
}
