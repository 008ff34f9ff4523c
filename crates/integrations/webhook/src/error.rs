use alertgate_core::PublishErrorKind;
use alertgate_provider::ProviderError;
use thiserror::Error;

/// Internal webhook errors, converted into [`ProviderError`] at the trait
/// boundary.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("HMAC signing error: {0}")]
    SigningError(String),
}

impl From<WebhookError> for ProviderError {
    fn from(err: WebhookError) -> Self {
        match err {
            WebhookError::Http(e) if e.is_timeout() => ProviderError::new(PublishErrorKind::Timeout, e.to_string()),
            WebhookError::Http(e) => ProviderError::new(PublishErrorKind::Network, e.to_string()),
            WebhookError::UnexpectedStatus { status, body } => {
                let kind = if status == 429 {
                    PublishErrorKind::RateLimit429
                } else if (500..600).contains(&status) {
                    PublishErrorKind::Server5xx
                } else {
                    PublishErrorKind::Client4xx
                };
                ProviderError::new(kind, format!("HTTP {status}: {body}"))
            }
            WebhookError::SigningError(msg) => ProviderError::new(PublishErrorKind::Client4xx, msg),
        }
    }
}
