use thiserror::Error;

/// Errors from the remote classification client. The classifier composes
/// this behind a breaker + fallback, so these never propagate past
/// `Classifier::classify` — see its module docs.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("non-retryable client error: HTTP {0}")]
    ClientError(u16),

    #[error("retryable server error: HTTP {0}")]
    ServerError(u16),

    #[error("failed to parse model response: {0}")]
    ParseError(String),

    #[error("classifier circuit breaker is open")]
    CircuitOpen,
}

impl ClassifierError {
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Timeout(_) | Self::ServerError(_))
    }
}
