use alertgate_core::PublishErrorKind;
use alertgate_provider::{Provider, ProviderError};
use hmac::{Hmac, Mac};
use reqwest::Client;
use sha2::Sha256;
use tracing::{debug, instrument, warn};

use crate::config::{AuthMethod, HttpMethod, WebhookConfig};
use crate::error::WebhookError;

type HmacSha256 = Hmac<Sha256>;

/// Generic HTTP webhook receiver adapter: dispatches a pre-formatted
/// payload to any configured HTTP endpoint.
pub struct WebhookProvider {
    name: String,
    config: WebhookConfig,
    client: Client,
}

impl WebhookProvider {
    pub fn new(name: impl Into<String>, config: WebhookConfig) -> Self {
        let client = Client::builder().timeout(config.timeout).build().expect("failed to build HTTP client");
        Self { name: name.into(), config, client }
    }

    pub fn with_client(name: impl Into<String>, config: WebhookConfig, client: Client) -> Self {
        Self { name: name.into(), config, client }
    }

    fn compute_hmac(secret: &str, body: &[u8]) -> Result<String, WebhookError> {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|e| WebhookError::SigningError(e.to_string()))?;
        mac.update(body);
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    fn apply_auth(&self, mut request: reqwest::RequestBuilder, body: &[u8]) -> Result<reqwest::RequestBuilder, WebhookError> {
        match &self.config.auth {
            Some(AuthMethod::Bearer(token)) => request = request.bearer_auth(token),
            Some(AuthMethod::Basic { username, password }) => request = request.basic_auth(username, Some(password)),
            Some(AuthMethod::ApiKey { header, value }) => request = request.header(header, value),
            Some(AuthMethod::HmacSha256 { secret, header }) => {
                let signature = Self::compute_hmac(secret, body)?;
                request = request.header(header, format!("sha256={signature}"));
            }
            None => {}
        }
        Ok(request)
    }

    fn is_success_status(&self, status: u16) -> bool {
        if self.config.success_status_codes.is_empty() {
            (200..300).contains(&status)
        } else {
            self.config.success_status_codes.contains(&status)
        }
    }

    fn build_request(&self) -> reqwest::RequestBuilder {
        match self.config.method {
            HttpMethod::Get => self.client.get(&self.config.url),
            HttpMethod::Post => self.client.post(&self.config.url),
            HttpMethod::Put => self.client.put(&self.config.url),
            HttpMethod::Patch => self.client.patch(&self.config.url),
            HttpMethod::Delete => self.client.delete(&self.config.url),
        }
    }
}

impl Provider for WebhookProvider {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self, payload), fields(provider = %self.name))]
    async fn publish(&self, payload: &[u8]) -> Result<(), ProviderError> {
        debug!(method = self.config.method.as_str(), url = %self.config.url, "dispatching webhook");

        let mut request = self.build_request().header("Content-Type", "application/json").body(payload.to_vec());
        for (key, value) in &self.config.headers {
            request = request.header(key, value);
        }
        request = self.apply_auth(request, payload)?;

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                warn!("webhook request timed out");
            }
            WebhookError::Http(e)
        })?;

        let status = response.status().as_u16();
        if self.is_success_status(status) {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(WebhookError::UnexpectedStatus { status, body }.into())
    }

    #[instrument(skip(self), fields(provider = %self.name))]
    async fn health_check(&self) -> Result<(), ProviderError> {
        let response = self
            .client
            .head(&self.config.url)
            .send()
            .await
            .map_err(|e| ProviderError::new(PublishErrorKind::Network, e.to_string()))?;
        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::new(PublishErrorKind::RateLimit429, "rate limited"));
        }
        if status.is_server_error() {
            return Err(ProviderError::new(PublishErrorKind::Server5xx, format!("health check failed: HTTP {status}")));
        }
        Ok(())
    }
}
