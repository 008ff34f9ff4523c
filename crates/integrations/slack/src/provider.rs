use alertgate_provider::{Provider, ProviderError};
use reqwest::Client;
use tracing::{debug, instrument, warn};

use crate::config::SlackConfig;
use crate::error::SlackError;
use crate::types::{SlackApiResponse, SlackAuthTestResponse};

/// Slack provider that posts pre-formatted messages via `chat.postMessage`.
///
/// The payload bytes are a complete `chat.postMessage` request body
/// (channel, text and/or blocks already resolved upstream); this adapter
/// only owns authentication and response interpretation.
pub struct SlackProvider {
    name: String,
    config: SlackConfig,
    client: Client,
}

impl SlackProvider {
    pub fn new(name: impl Into<String>, config: SlackConfig) -> Self {
        let client = Client::builder().timeout(std::time::Duration::from_secs(30)).build().expect("failed to build HTTP client");
        Self { name: name.into(), config, client }
    }

    pub fn with_client(name: impl Into<String>, config: SlackConfig, client: Client) -> Self {
        Self { name: name.into(), config, client }
    }

    fn api_url(&self, method: &str) -> String {
        format!("{}/{method}", self.config.api_base_url)
    }
}

impl Provider for SlackProvider {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self, payload), fields(provider = %self.name))]
    async fn publish(&self, payload: &[u8]) -> Result<(), ProviderError> {
        let url = self.api_url("chat.postMessage");
        debug!(%url, "posting message to Slack");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.token)
            .header("Content-Type", "application/json")
            .body(payload.to_vec())
            .send()
            .await
            .map_err(SlackError::Http)?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("Slack API rate limit hit");
            return Err(SlackError::RateLimited.into());
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SlackError::Api(format!("HTTP {status}: {body}")).into());
        }

        let api_response: SlackApiResponse = response.json().await.map_err(SlackError::Http)?;
        if !api_response.ok {
            let error_code = api_response.error.unwrap_or_else(|| "unknown_error".to_owned());
            return Err(SlackError::Api(error_code).into());
        }
        Ok(())
    }

    #[instrument(skip(self), fields(provider = %self.name))]
    async fn health_check(&self) -> Result<(), ProviderError> {
        let url = self.api_url("auth.test");
        let response = self.client.post(&url).bearer_auth(&self.config.token).send().await.map_err(SlackError::Http)?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SlackError::RateLimited.into());
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SlackError::Api(format!("HTTP {status}: {body}")).into());
        }

        let auth_response: SlackAuthTestResponse =
            response.json().await.map_err(|e| SlackError::Api(format!("failed to parse auth.test response: {e}")))?;
        if !auth_response.ok {
            let error_code = auth_response.error.unwrap_or_else(|| "unknown_error".to_owned());
            return Err(SlackError::Api(format!("auth.test failed: {error_code}")).into());
        }
        Ok(())
    }
}
