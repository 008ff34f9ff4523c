use alertgate_core::PublishErrorKind;
use alertgate_provider::ProviderError;
use thiserror::Error;

/// Internal `PagerDuty` errors, converted into [`ProviderError`] at the
/// trait boundary.
#[derive(Debug, Error)]
pub enum PagerDutyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("PagerDuty API error: {0}")]
    Api(String),

    #[error("rate limited by PagerDuty")]
    RateLimited,
}

impl From<PagerDutyError> for ProviderError {
    fn from(err: PagerDutyError) -> Self {
        match err {
            PagerDutyError::Http(e) if e.is_timeout() => ProviderError::new(PublishErrorKind::Timeout, e.to_string()),
            PagerDutyError::Http(e) => ProviderError::new(PublishErrorKind::Network, e.to_string()),
            PagerDutyError::Api(msg) => ProviderError::new(PublishErrorKind::Client4xx, msg),
            PagerDutyError::RateLimited => ProviderError::new(PublishErrorKind::RateLimit429, "rate limited by PagerDuty"),
        }
    }
}
