//! The classifier: `Classify(alert, force) -> verdict`, composing a remote
//! model client, a circuit breaker, retry with backoff, a two-tier cache,
//! and a deterministic fallback. Never fails the caller — see
//! [`Classifier::classify`].

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod fallback;
pub mod http;

pub use cache::{CacheTier, ClassificationCache};
pub use client::ModelClient;
pub use config::ClassifierConfig;
pub use error::ClassifierError;
pub use http::HttpModelClient;

use std::sync::Arc;
use std::time::Instant;

use alertgate_core::{Alert, CircuitBreaker, ClassificationVerdict, Fingerprint, VerdictSource};
use alertgate_state::StateStore;
use tracing::{instrument, warn};

pub struct Classifier {
    client: Arc<dyn ModelClient>,
    breaker: CircuitBreaker,
    cache: ClassificationCache,
    config: ClassifierConfig,
}

impl Classifier {
    #[must_use]
    pub fn new(client: Arc<dyn ModelClient>, l2_store: Arc<dyn StateStore>, config: ClassifierConfig) -> Self {
        let breaker = CircuitBreaker::new("classifier", config.breaker.clone());
        let cache = ClassificationCache::new(config.l1_capacity, config.cache_ttl, l2_store);
        Self { client, breaker, cache, config }
    }

    /// Classify an alert. `force=true` bypasses both cache tiers but still
    /// respects the breaker. This call never returns an error: a remote
    /// failure degrades to the rule-based fallback.
    #[instrument(skip(self, alert), fields(fingerprint = %alert.fingerprint))]
    pub async fn classify(&self, alert: &Alert, force: bool) -> ClassificationVerdict {
        if !force {
            if let Some((verdict, tier)) = self.cache.get(&alert.fingerprint).await {
                let mut v = verdict;
                v.source = match tier {
                    CacheTier::L1 => VerdictSource::CacheL1,
                    CacheTier::L2 => VerdictSource::CacheL2,
                };
                return v;
            }
        }

        match self.call_with_retry(alert).await {
            Ok(verdict) => {
                self.cache.put(&alert.fingerprint, &verdict).await;
                verdict
            }
            Err(_) => fallback::classify_fallback(alert, self.config.fallback_confidence_ceiling),
        }
    }

    async fn call_with_retry(&self, alert: &Alert) -> Result<ClassificationVerdict, ClassifierError> {
        let permit = self.breaker.try_acquire_permit().await;
        if !permit.allowed {
            return Err(ClassifierError::CircuitOpen);
        }

        let mut last_err = ClassifierError::CircuitOpen;
        for attempt in 0..=self.config.max_retries {
            let started = Instant::now();
            match self.client.classify(alert).await {
                Ok(verdict) => {
                    self.breaker.record_timed(true, started.elapsed()).await;
                    return Ok(verdict);
                }
                Err(e) => {
                    let slow = started.elapsed() > self.config.slow_call_threshold;
                    self.breaker.record_timed(false || slow, started.elapsed()).await;
                    if !e.is_retryable() || attempt == self.config.max_retries {
                        last_err = e;
                        break;
                    }
                    warn!(attempt, error = %e, "transient classifier failure, retrying");
                    tokio::time::sleep(self.config.retry_strategy.delay_for(attempt)).await;
                    last_err = e;
                }
            }
        }
        Err(last_err)
    }

    pub async fn breaker_is_open(&self) -> bool {
        self.breaker.state().await == alertgate_core::CircuitState::Open
    }

    /// Fingerprint lookup from an alert's own fields, exposed for callers
    /// that need to check the cache without triggering a classification.
    #[must_use]
    pub fn fingerprint_of(alert: &Alert) -> Fingerprint {
        alert.fingerprint.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alertgate_core::{AlertStatus, CircuitBreakerConfig, Severity};
    use alertgate_state_memory::MemoryStateStore;
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct ScriptedClient {
        calls: AtomicU32,
        fail_times: u32,
        error: ClassifierError,
    }

    #[async_trait]
    impl ModelClient for ScriptedClient {
        async fn classify(&self, _alert: &Alert) -> Result<ClassificationVerdict, ClassifierError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_times {
                return Err(match &self.error {
                    ClassifierError::ServerError(c) => ClassifierError::ServerError(*c),
                    _ => ClassifierError::ServerError(503),
                });
            }
            Ok(ClassificationVerdict {
                severity: Severity::Warning,
                confidence: 0.9,
                reasoning: "model says so".into(),
                recommendations: vec![],
                source: VerdictSource::Model,
                model_id: Some("m1".into()),
            })
        }
    }

    fn alert() -> Alert {
        let mut labels = BTreeMap::new();
        labels.insert("severity".to_string(), "warning".to_string());
        Alert::new("HighCPU", AlertStatus::Firing, chrono::Utc::now(), None, labels, BTreeMap::new(), None)
    }

    fn config() -> ClassifierConfig {
        let mut cfg = ClassifierConfig::new("http://model", "key", "m1");
        cfg.breaker = CircuitBreakerConfig { failure_threshold: 5, window_min_samples: 1000, ..CircuitBreakerConfig::default() };
        cfg.retry_strategy.base = std::time::Duration::from_millis(1);
        cfg
    }

    #[tokio::test]
    async fn success_returns_model_source_and_populates_cache() {
        let client = Arc::new(ScriptedClient { calls: AtomicU32::new(0), fail_times: 0, error: ClassifierError::ServerError(503) });
        let classifier = Classifier::new(client, Arc::new(MemoryStateStore::new()), config());
        let a = alert();
        let v = classifier.classify(&a, false).await;
        assert_eq!(v.source, VerdictSource::Model);

        let cached = classifier.classify(&a, false).await;
        assert_eq!(cached.source, VerdictSource::CacheL1);
    }

    #[tokio::test]
    async fn retries_transient_failures_then_succeeds() {
        let client = Arc::new(ScriptedClient { calls: AtomicU32::new(0), fail_times: 2, error: ClassifierError::ServerError(503) });
        let classifier = Classifier::new(client, Arc::new(MemoryStateStore::new()), config());
        let v = classifier.classify(&alert(), false).await;
        assert_eq!(v.source, VerdictSource::Model);
    }

    #[tokio::test]
    async fn exhausted_retries_degrade_to_fallback() {
        let client = Arc::new(ScriptedClient { calls: AtomicU32::new(0), fail_times: 1000, error: ClassifierError::ServerError(503) });
        let classifier = Classifier::new(client, Arc::new(MemoryStateStore::new()), config());
        let v = classifier.classify(&alert(), false).await;
        assert_eq!(v.source, VerdictSource::Fallback);
        assert!(v.confidence <= ClassificationVerdict::FALLBACK_CONFIDENCE_CEILING);
    }

    #[tokio::test]
    async fn breaker_open_skips_remote_call_entirely() {
        let client = Arc::new(ScriptedClient { calls: AtomicU32::new(0), fail_times: 1000, error: ClassifierError::ServerError(503) });
        let mut cfg = config();
        cfg.breaker.failure_threshold = 2;
        cfg.breaker.window_min_samples = 1000;
        let classifier = Classifier::new(client.clone(), Arc::new(MemoryStateStore::new()), cfg);

        // two classify calls each retry max_retries+1 times against a failing client;
        // after enough failures the breaker should trip open.
        for _ in 0..3 {
            classifier.classify(&alert(), false).await;
        }
        assert!(classifier.breaker_is_open().await);
    }

    #[tokio::test]
    async fn force_bypasses_cache_but_not_breaker() {
        let client = Arc::new(ScriptedClient { calls: AtomicU32::new(0), fail_times: 0, error: ClassifierError::ServerError(503) });
        let classifier = Classifier::new(client.clone(), Arc::new(MemoryStateStore::new()), config());
        let a = alert();
        classifier.classify(&a, false).await;
        let before = client.calls.load(Ordering::SeqCst);
        classifier.classify(&a, true).await;
        let after = client.calls.load(Ordering::SeqCst);
        assert!(after > before, "force=true must re-invoke the remote client");
    }
}
