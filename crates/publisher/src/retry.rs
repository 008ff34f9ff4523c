//! Background retry worker: drains the [`PriorityQueue`], re-attempts each
//! job against its provider, and either requeues with backoff, drops it to
//! the [`DlqStore`], or lets it succeed quietly.
//!
//! The synchronous fan-out path ([`crate::fanout::fan_out`]) handles the
//! *first* attempt for a freshly routed alert; jobs only reach this worker
//! once that first attempt (or a later retry) has already failed and been
//! requeued with an incremented `attempt`.

use std::sync::Arc;
use std::time::Duration;

use alertgate_core::{PublishErrorKind, PublishJob, RetryStrategy};
use alertgate_provider::ProviderRegistry;
use chrono::Utc;
use tracing::{info, warn};

use crate::breaker_registry::BreakerRegistry;
use crate::dlq::DlqStore;
use crate::fanout::attempt_one;
use crate::queue::{PriorityQueue, QueueFullError};

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub per_receiver_timeout: Duration,
    pub strategy: RetryStrategy,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_attempts: 5, per_receiver_timeout: Duration::from_secs(10), strategy: RetryStrategy::default() }
    }
}

/// Owns the queue, breakers, provider registry and DLQ for the retry path.
/// Cheap to clone (every field is an `Arc`); typically wrapped once in an
/// `Arc<RetryWorker>` and shared between the ingestion path (which calls
/// [`RetryWorker::enqueue_or_dlq`] on a failed first attempt) and the
/// background task spawned by [`RetryWorker::spawn`].
pub struct RetryWorker {
    queue: Arc<PriorityQueue>,
    registry: Arc<ProviderRegistry>,
    breakers: Arc<BreakerRegistry>,
    dlq: Arc<DlqStore>,
    config: RetryConfig,
}

impl RetryWorker {
    #[must_use]
    pub fn new(
        queue: Arc<PriorityQueue>,
        registry: Arc<ProviderRegistry>,
        breakers: Arc<BreakerRegistry>,
        dlq: Arc<DlqStore>,
        config: RetryConfig,
    ) -> Self {
        Self { queue, registry, breakers, dlq, config }
    }

    /// Dead-letter a job directly, bypassing the retry schedule entirely.
    /// Used for non-retryable failures (client 4xx, panic) that should
    /// never be reattempted.
    pub async fn dlq_record(&self, job: &PublishJob, message: &str, kind: PublishErrorKind) -> Result<(), crate::dlq::DlqError> {
        self.dlq.record(job, message, kind, Utc::now()).await.map(|_| ())
    }

    /// Schedule a failed job for retry: bumps `attempt` and `next_attempt_at`
    /// per the backoff strategy, then enqueues into the job's fixed priority
    /// tier. On retry exhaustion or a full queue, the job is dead-lettered
    /// instead and this returns `Ok(None)`.
    pub async fn retry_or_dlq(&self, mut job: PublishJob, error: &str, kind: PublishErrorKind) -> Result<Option<PublishJob>, crate::dlq::DlqError> {
        let now = Utc::now();
        if job.attempt >= self.config.max_attempts {
            warn!(job_id = %job.job_id, receiver = %job.receiver, attempts = job.attempt, "retry budget exhausted, dead-lettering");
            self.dlq.record(&job, error, kind, now).await?;
            return Ok(None);
        }

        job.attempt += 1;
        let delay = self.config.strategy.delay_for(job.attempt - 1);
        job.next_attempt_at = now + chrono::Duration::from_std(delay).unwrap_or(chrono::Duration::zero());

        match self.queue.enqueue(job.clone()) {
            Ok(()) => Ok(Some(job)),
            Err(QueueFullError { .. }) => {
                warn!(job_id = %job.job_id, receiver = %job.receiver, "priority queue full on retry, dead-lettering");
                self.dlq.record(&job, "priority queue tier is full on retry", PublishErrorKind::QueueFull, now).await?;
                Ok(None)
            }
        }
    }

    /// Run forever, dequeuing and re-attempting jobs one at a time. Retries
    /// are not fanned out concurrently against each other since they
    /// already failed once; the per-receiver breaker and per-job deadline
    /// bound each attempt's cost.
    pub async fn run(self: Arc<Self>) {
        loop {
            let job = self.queue.dequeue_wait().await;
            self.clone().process_due(job).await;
        }
    }

    async fn process_due(self: Arc<Self>, job: PublishJob) {
        let now = Utc::now();
        if job.next_attempt_at > now {
            let wait = (job.next_attempt_at - now).to_std().unwrap_or(Duration::ZERO);
            tokio::time::sleep(wait).await;
        }

        let outcome = attempt_one(job, self.registry.clone(), self.breakers.clone(), self.config.per_receiver_timeout).await;
        if outcome.success {
            info!(receiver = %outcome.receiver, attempt = outcome.job.attempt, "retry succeeded");
            return;
        }

        let (kind, message) = outcome
            .error
            .map(|e| (e.kind, e.to_string()))
            .unwrap_or((PublishErrorKind::Network, "unknown publish failure".to_string()));

        if !kind.is_retryable() {
            warn!(job_id = %outcome.job.job_id, receiver = %outcome.receiver, ?kind, "non-retryable failure, dead-lettering");
            if let Err(e) = self.dlq.record(&outcome.job, &message, kind, Utc::now()).await {
                warn!(error = %e, "failed to record dlq entry for non-retryable failure");
            }
            return;
        }

        if let Err(e) = self.retry_or_dlq(outcome.job, &message, kind).await {
            warn!(error = %e, "failed to schedule retry or dlq entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alertgate_core::{CircuitBreakerConfig, Fingerprint, Priority, ReceiverName};
    use alertgate_provider::{Provider, ProviderError};
    use alertgate_state_memory::MemoryStateStore;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakyProvider {
        calls: AtomicU32,
        fail_times: u32,
    }

    impl Provider for FlakyProvider {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn publish(&self, _payload: &[u8]) -> Result<(), ProviderError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_times {
                return Err(ProviderError::new(PublishErrorKind::Server5xx, "boom"));
            }
            Ok(())
        }

        async fn health_check(&self) -> Result<(), ProviderError> {
            Ok(())
        }
    }

    fn job() -> PublishJob {
        PublishJob::new(Fingerprint::new("fp"), ReceiverName::new("flaky"), b"{}".to_vec(), Priority::High, Utc::now())
    }

    fn worker(fail_times: u32) -> (Arc<RetryWorker>, Arc<DlqStore>) {
        let mut registry = ProviderRegistry::new();
        registry.register(ReceiverName::new("flaky"), Arc::new(FlakyProvider { calls: AtomicU32::new(0), fail_times }));
        let dlq = Arc::new(DlqStore::new(Arc::new(MemoryStateStore::new()), "alertgate"));
        let mut cfg = RetryConfig::default();
        cfg.strategy.base = Duration::from_millis(1);
        cfg.max_attempts = 3;
        let w = Arc::new(RetryWorker::new(
            Arc::new(PriorityQueue::new(10)),
            Arc::new(registry),
            Arc::new(BreakerRegistry::new(CircuitBreakerConfig::default())),
            dlq.clone(),
            cfg,
        ));
        (w, dlq)
    }

    #[tokio::test]
    async fn exhausting_retries_creates_a_dlq_entry() {
        let (worker, dlq) = worker(1000);
        let mut j = job();
        j.attempt = 3; // already at the budget
        worker.clone().process_due(j).await;
        let page = dlq.list(&crate::dlq::DlqFilter::default(), 1, 10).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.entries[0].last_error_kind, PublishErrorKind::Server5xx);
    }

    #[tokio::test]
    async fn eventual_success_leaves_no_dlq_entry() {
        let (worker, dlq) = worker(0);
        worker.clone().process_due(job()).await;
        let page = dlq.list(&crate::dlq::DlqFilter::default(), 1, 10).await.unwrap();
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn non_retryable_failure_dead_letters_immediately() {
        struct AlwaysClientError;
        impl Provider for AlwaysClientError {
            fn name(&self) -> &str {
                "bad"
            }
            async fn publish(&self, _payload: &[u8]) -> Result<(), ProviderError> {
                Err(ProviderError::new(PublishErrorKind::Client4xx, "nope"))
            }
            async fn health_check(&self) -> Result<(), ProviderError> {
                Ok(())
            }
        }
        let mut registry = ProviderRegistry::new();
        registry.register(ReceiverName::new("bad"), Arc::new(AlwaysClientError));
        let dlq = Arc::new(DlqStore::new(Arc::new(MemoryStateStore::new()), "alertgate"));
        let worker = Arc::new(RetryWorker::new(
            Arc::new(PriorityQueue::new(10)),
            Arc::new(registry),
            Arc::new(BreakerRegistry::new(CircuitBreakerConfig::default())),
            dlq.clone(),
            RetryConfig::default(),
        ));
        let j = PublishJob::new(Fingerprint::new("fp"), ReceiverName::new("bad"), b"{}".to_vec(), Priority::Normal, Utc::now());
        worker.process_due(j).await;
        let page = dlq.list(&crate::dlq::DlqFilter::default(), 1, 10).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.entries[0].attempts, 0);
    }
}
