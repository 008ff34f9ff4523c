use std::time::Duration;

use alertgate_core::{CircuitBreakerConfig, RetryStrategy};

/// Configuration for the HTTP-based remote model client and the classifier
/// pipeline wrapped around it.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    /// Per-call timeout (spec default 5s).
    pub call_timeout: Duration,
    /// A call slower than this counts as a breaker failure (spec default 3s).
    pub slow_call_threshold: Duration,
    /// Max retry attempts for transient failures (spec's `R`).
    pub max_retries: u32,
    pub retry_strategy: RetryStrategy,
    pub breaker: CircuitBreakerConfig,
    /// L1/L2 cache TTL.
    pub cache_ttl: Duration,
    /// L1 (process-local) cache capacity.
    pub l1_capacity: u64,
    /// Confidence ceiling for fallback verdicts.
    pub fallback_confidence_ceiling: f64,
}

impl ClassifierConfig {
    #[must_use]
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
            call_timeout: Duration::from_secs(5),
            slow_call_threshold: Duration::from_secs(3),
            max_retries: 3,
            retry_strategy: RetryStrategy::default(),
            breaker: CircuitBreakerConfig::default(),
            cache_ttl: Duration::from_secs(300),
            l1_capacity: 10_000,
            fallback_confidence_ceiling: 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_timeouts() {
        let cfg = ClassifierConfig::new("http://model", "key", "m1");
        assert_eq!(cfg.call_timeout, Duration::from_secs(5));
        assert_eq!(cfg.slow_call_threshold, Duration::from_secs(3));
        assert_eq!(cfg.max_retries, 3);
    }
}
