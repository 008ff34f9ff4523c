use alertgate_core::{Alert, ClassificationVerdict, Severity, VerdictSource};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::client::ModelClient;
use crate::config::ClassifierConfig;
use crate::error::ClassifierError;

/// HTTP-based remote model client. Sends the alert's labels/annotations as
/// context and expects a JSON severity verdict back.
pub struct HttpModelClient {
    client: reqwest::Client,
    config: ClassifierConfig,
}

#[derive(Debug, Deserialize)]
struct ModelResponse {
    severity: String,
    confidence: f64,
    reasoning: String,
    #[serde(default)]
    recommendations: Vec<String>,
}

impl HttpModelClient {
    pub fn new(config: ClassifierConfig) -> Result<Self, ClassifierError> {
        let client = reqwest::Client::builder()
            .timeout(config.call_timeout)
            .build()
            .map_err(|e| ClassifierError::Http(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn parse_severity(raw: &str) -> Result<Severity, ClassifierError> {
        match raw {
            "critical" => Ok(Severity::Critical),
            "warning" => Ok(Severity::Warning),
            "info" => Ok(Severity::Info),
            "noise" => Ok(Severity::Noise),
            other => Err(ClassifierError::ParseError(format!("unknown severity: {other}"))),
        }
    }
}

#[async_trait]
impl ModelClient for HttpModelClient {
    async fn classify(&self, alert: &Alert) -> Result<ClassificationVerdict, ClassifierError> {
        let body = json!({
            "model": self.config.model,
            "alertname": alert.alertname,
            "labels": alert.labels,
            "annotations": alert.annotations,
        });

        debug!(endpoint = %self.config.endpoint, alertname = %alert.alertname, "classifying alert via remote model");

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClassifierError::Timeout(self.config.call_timeout)
                } else {
                    ClassifierError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if status.as_u16() == 429 || status.is_server_error() {
            return Err(ClassifierError::ServerError(status.as_u16()));
        }
        if status.is_client_error() {
            return Err(ClassifierError::ClientError(status.as_u16()));
        }

        let parsed: ModelResponse = response.json().await.map_err(|e| ClassifierError::ParseError(e.to_string()))?;
        let severity = Self::parse_severity(&parsed.severity)?;

        if !(0.0..=1.0).contains(&parsed.confidence) {
            warn!(confidence = parsed.confidence, "model returned out-of-range confidence");
        }

        Ok(ClassificationVerdict {
            severity,
            confidence: parsed.confidence.clamp(0.0, 1.0),
            reasoning: parsed.reasoning,
            recommendations: parsed.recommendations,
            source: VerdictSource::Model,
            model_id: Some(self.config.model.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_severities() {
        assert_eq!(HttpModelClient::parse_severity("critical").unwrap(), Severity::Critical);
        assert_eq!(HttpModelClient::parse_severity("noise").unwrap(), Severity::Noise);
    }

    #[test]
    fn rejects_unknown_severity() {
        assert!(HttpModelClient::parse_severity("apocalyptic").is_err());
    }
}
