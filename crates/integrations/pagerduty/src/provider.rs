use alertgate_provider::{Provider, ProviderError};
use reqwest::Client;
use tracing::{debug, instrument, warn};

use crate::config::PagerDutyConfig;
use crate::error::PagerDutyError;
use crate::types::PagerDutyApiResponse;

/// `PagerDuty` provider that sends pre-formatted events via the `PagerDuty`
/// Events API v2.
///
/// The route tree and publisher decide what goes in the body; this adapter
/// only knows how to get bytes to the enqueue endpoint and how to interpret
/// the response.
pub struct PagerDutyProvider {
    name: String,
    config: PagerDutyConfig,
    client: Client,
}

impl PagerDutyProvider {
    pub fn new(name: impl Into<String>, config: PagerDutyConfig) -> Self {
        let client = Client::builder().timeout(std::time::Duration::from_secs(30)).build().expect("failed to build HTTP client");
        Self { name: name.into(), config, client }
    }

    pub fn with_client(name: impl Into<String>, config: PagerDutyConfig, client: Client) -> Self {
        Self { name: name.into(), config, client }
    }

    fn enqueue_url(&self) -> String {
        format!("{}/v2/enqueue", self.config.api_base_url)
    }
}

impl Provider for PagerDutyProvider {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self, payload), fields(provider = %self.name))]
    async fn publish(&self, payload: &[u8]) -> Result<(), ProviderError> {
        let url = self.enqueue_url();
        debug!(%url, "sending event to PagerDuty");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .body(payload.to_vec())
            .send()
            .await
            .map_err(PagerDutyError::Http)?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("PagerDuty API rate limit hit");
            return Err(PagerDutyError::RateLimited.into());
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PagerDutyError::Api(format!("HTTP {status}: {body}")).into());
        }

        let api_response: PagerDutyApiResponse = response.json().await.map_err(PagerDutyError::Http)?;
        debug!(status = %api_response.status, dedup_key = ?api_response.dedup_key, "PagerDuty accepted event");
        Ok(())
    }

    #[instrument(skip(self), fields(provider = %self.name))]
    async fn health_check(&self) -> Result<(), ProviderError> {
        let url = self.enqueue_url();
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(PagerDutyError::Http)?;
        debug!(status = %response.status(), "PagerDuty health check response");
        Ok(())
    }
}
