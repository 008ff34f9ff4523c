use alertgate_core::PublishErrorKind;
use thiserror::Error;

/// A provider-level publish failure, pre-classified into the same
/// [`PublishErrorKind`] taxonomy the publisher uses for retry and DLQ
/// decisions — the adapter is the only layer with enough context (HTTP
/// status, transport error) to make that call correctly.
#[derive(Debug, Error)]
#[error("{kind:?}: {message}")]
pub struct ProviderError {
    pub kind: PublishErrorKind,
    pub message: String,
}

impl ProviderError {
    #[must_use]
    pub fn new(kind: PublishErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryability_delegates_to_kind() {
        assert!(ProviderError::new(PublishErrorKind::Timeout, "slow").is_retryable());
        assert!(!ProviderError::new(PublishErrorKind::Client4xx, "bad request").is_retryable());
    }
}
