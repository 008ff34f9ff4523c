//! Per-receiver circuit breakers, created lazily on first use.

use alertgate_core::{CircuitBreaker, CircuitBreakerConfig, ReceiverName};
use dashmap::DashMap;

/// Holds one [`CircuitBreaker`] per receiver, matching the spec's "each
/// receiver adapter is wrapped in its own breaker" requirement.
pub struct BreakerRegistry {
    breakers: DashMap<ReceiverName, std::sync::Arc<CircuitBreaker>>,
    config: CircuitBreakerConfig,
}

impl BreakerRegistry {
    #[must_use]
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self { breakers: DashMap::new(), config }
    }

    #[must_use]
    pub fn get(&self, receiver: &ReceiverName) -> std::sync::Arc<CircuitBreaker> {
        self.breakers
            .entry(receiver.clone())
            .or_insert_with(|| std::sync::Arc::new(CircuitBreaker::new(receiver.as_str(), self.config.clone())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_receiver_reuses_the_same_breaker_instance() {
        let registry = BreakerRegistry::new(CircuitBreakerConfig::default());
        let a = registry.get(&ReceiverName::new("slack"));
        a.record_failure().await;
        let b = registry.get(&ReceiverName::new("slack"));
        assert_eq!(a.state().await, b.state().await);
        assert!(std::sync::Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn distinct_receivers_get_independent_breakers() {
        let registry = BreakerRegistry::new(CircuitBreakerConfig { failure_threshold: 1, window_min_samples: 1000, ..Default::default() });
        let slack = registry.get(&ReceiverName::new("slack"));
        slack.record_failure().await;
        let pagerduty = registry.get(&ReceiverName::new("pagerduty"));
        assert_eq!(pagerduty.state().await, alertgate_core::CircuitState::Closed);
    }
}
