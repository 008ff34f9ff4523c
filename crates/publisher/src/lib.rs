//! Priority queue, multi-receiver fan-out, per-target circuit breaking,
//! retry-with-backoff, and the dead-letter queue — the publishing
//! subsystem described in §4.5.
//!
//! [`Publisher`] is the facade `alertgate-ingestion` drives: given the
//! [`PublishJob`]s produced from one alert's route bindings, it fans them
//! out concurrently (§4.5.2), and for the ones that fail retryably, hands
//! them to the background [`RetryWorker`] instead of blocking the
//! ingestion caller on further attempts.

pub mod breaker_registry;
pub mod dlq;
pub mod fanout;
pub mod queue;
pub mod retry;

pub use breaker_registry::BreakerRegistry;
pub use dlq::{DlqError, DlqFilter, DlqPage, DlqStore};
pub use fanout::{FanOutResult, PublishOutcome};
pub use queue::{PriorityQueue, QueueFullError};
pub use retry::{RetryConfig, RetryWorker};

use std::sync::Arc;
use std::time::Duration;

use alertgate_core::{CircuitBreakerConfig, PublishJob};
use alertgate_provider::ProviderRegistry;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct PublisherConfig {
    pub per_receiver_timeout: Duration,
    pub fan_out_concurrency: usize,
    pub queue_capacity_per_tier: usize,
    pub breaker: CircuitBreakerConfig,
    pub retry: RetryConfig,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            per_receiver_timeout: Duration::from_secs(10),
            fan_out_concurrency: 10,
            queue_capacity_per_tier: 1_000,
            breaker: CircuitBreakerConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

/// Top-level publishing facade composing the queue, fan-out executor,
/// per-receiver breakers, and DLQ.
pub struct Publisher {
    registry: Arc<ProviderRegistry>,
    breakers: Arc<BreakerRegistry>,
    retry_worker: Arc<RetryWorker>,
    config: PublisherConfig,
}

impl Publisher {
    #[must_use]
    pub fn new(registry: Arc<ProviderRegistry>, dlq: Arc<DlqStore>, config: PublisherConfig) -> Self {
        let breakers = Arc::new(BreakerRegistry::new(config.breaker.clone()));
        let queue = Arc::new(PriorityQueue::new(config.queue_capacity_per_tier));
        let retry_worker = Arc::new(RetryWorker::new(queue, registry.clone(), breakers.clone(), dlq, config.retry.clone()));
        Self { registry, breakers, retry_worker, config }
    }

    /// Spawn the background retry worker. Call once at startup; the
    /// returned handle can be aborted on shutdown.
    #[must_use]
    pub fn spawn_retry_worker(&self) -> tokio::task::JoinHandle<()> {
        let worker = self.retry_worker.clone();
        tokio::spawn(worker.run())
    }

    /// Publish a batch of jobs (one alert bound to N receivers) concurrently.
    /// Per §4.5.2, partial success is success; failed jobs that are
    /// retryable are scheduled onto the retry worker's queue, non-retryable
    /// ones are dead-lettered immediately. Returns the first-attempt result
    /// for observability; the ingestion caller does not wait on retries.
    pub async fn publish(&self, jobs: Vec<PublishJob>) -> FanOutResult {
        let result =
            fanout::fan_out(jobs, self.registry.clone(), self.breakers.clone(), self.config.per_receiver_timeout, self.config.fan_out_concurrency)
                .await;

        for outcome in result.outcomes.iter().filter(|o| !o.success) {
            let Some(err) = &outcome.error else { continue };
            let job = outcome.job.clone();
            if err.is_retryable() {
                if let Err(e) = self.retry_worker.retry_or_dlq(job, &err.to_string(), err.kind).await {
                    warn!(error = %e, "failed to schedule retry after first-attempt failure");
                }
            } else if let Err(e) = self.retry_worker.dlq_record(&job, &err.to_string(), err.kind).await {
                warn!(error = %e, "failed to record dlq entry for non-retryable first-attempt failure");
            }
        }

        result
    }

    #[must_use]
    pub fn breakers(&self) -> Arc<BreakerRegistry> {
        self.breakers.clone()
    }
}
