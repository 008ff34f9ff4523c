use alertgate_core::PublishErrorKind;
use alertgate_provider::ProviderError;
use thiserror::Error;

/// Internal Slack errors, converted into [`ProviderError`] at the trait
/// boundary.
#[derive(Debug, Error)]
pub enum SlackError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Slack API error: {0}")]
    Api(String),

    #[error("rate limited by Slack")]
    RateLimited,
}

impl From<SlackError> for ProviderError {
    fn from(err: SlackError) -> Self {
        match err {
            SlackError::Http(e) if e.is_timeout() => ProviderError::new(PublishErrorKind::Timeout, e.to_string()),
            SlackError::Http(e) => ProviderError::new(PublishErrorKind::Network, e.to_string()),
            SlackError::Api(msg) => ProviderError::new(PublishErrorKind::Client4xx, msg),
            SlackError::RateLimited => ProviderError::new(PublishErrorKind::RateLimit429, "rate limited by Slack"),
        }
    }
}
