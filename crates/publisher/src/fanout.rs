//! Multi-receiver fan-out: one task per [`PublishJob`], joined under a
//! concurrency ceiling, panic-isolated, each bounded by its own deadline.

use std::sync::Arc;
use std::time::{Duration, Instant};

use alertgate_core::{PublishErrorKind, PublishJob, ReceiverName};
use alertgate_provider::{ProviderError, ProviderRegistry};
use tokio::sync::Semaphore;
use tracing::{instrument, warn};

use crate::breaker_registry::BreakerRegistry;

/// Result of a single receiver publish attempt.
#[derive(Debug)]
pub struct PublishOutcome {
    pub job: PublishJob,
    pub receiver: ReceiverName,
    pub success: bool,
    pub duration: Duration,
    pub error: Option<ProviderError>,
}

/// Aggregate result of fanning a batch of jobs out to their receivers.
#[derive(Debug)]
pub struct FanOutResult {
    pub outcomes: Vec<PublishOutcome>,
}

impl FanOutResult {
    #[must_use]
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.success).count()
    }

    /// Per the spec, partial success is success: the aggregate call only
    /// fails when every receiver failed.
    #[must_use]
    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty() && self.success_count() == 0
    }
}

/// Attempt one job against its registered provider, respecting the
/// receiver's circuit breaker and a per-receiver deadline. Never panics the
/// caller: a provider panic surfaces as `PublishErrorKind::Panic`.
#[instrument(skip(job, registry, breakers), fields(receiver = %job.receiver, attempt = job.attempt))]
pub(crate) async fn attempt_one(
    job: PublishJob,
    registry: Arc<ProviderRegistry>,
    breakers: Arc<BreakerRegistry>,
    timeout: Duration,
) -> PublishOutcome {
    let receiver = job.receiver.clone();
    let breaker = breakers.get(&receiver);

    let permit = breaker.try_acquire_permit().await;
    if !permit.allowed {
        return PublishOutcome {
            job,
            receiver,
            success: false,
            duration: Duration::ZERO,
            error: Some(ProviderError::new(PublishErrorKind::Network, "circuit breaker open")),
        };
    }

    let Some(provider) = registry.get(&receiver) else {
        return PublishOutcome {
            job,
            receiver,
            success: false,
            duration: Duration::ZERO,
            error: Some(ProviderError::new(PublishErrorKind::Client4xx, "no provider registered for receiver")),
        };
    };

    let started = Instant::now();
    let payload = job.formatted_payload.clone();
    let call = tokio::spawn(async move { provider.publish(&payload).await });
    let outcome = match tokio::time::timeout(timeout, call).await {
        Ok(Ok(Ok(()))) => {
            let duration = started.elapsed();
            breaker.record_timed(true, duration).await;
            PublishOutcome { job, receiver, success: true, duration, error: None }
        }
        Ok(Ok(Err(e))) => {
            let duration = started.elapsed();
            breaker.record_timed(false, duration).await;
            PublishOutcome { job, receiver, success: false, duration, error: Some(e) }
        }
        Ok(Err(join_err)) => {
            let duration = started.elapsed();
            breaker.record_timed(false, duration).await;
            warn!(error = %join_err, "provider task panicked");
            PublishOutcome {
                job,
                receiver,
                success: false,
                duration,
                error: Some(ProviderError::new(PublishErrorKind::Panic, join_err.to_string())),
            }
        }
        Err(_elapsed) => {
            let duration = started.elapsed();
            breaker.record_timed(false, duration).await;
            PublishOutcome {
                job,
                receiver,
                success: false,
                duration,
                error: Some(ProviderError::new(PublishErrorKind::Timeout, format!("publish exceeded {timeout:?}"))),
            }
        }
    };
    outcome
}

/// Fan a batch of jobs (one alert bound to N receivers) out concurrently,
/// bounded by `concurrency`. Wall-clock is ~max(per-receiver durations), not
/// their sum.
pub async fn fan_out(
    jobs: Vec<PublishJob>,
    registry: Arc<ProviderRegistry>,
    breakers: Arc<BreakerRegistry>,
    per_receiver_timeout: Duration,
    concurrency: usize,
) -> FanOutResult {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut handles = Vec::with_capacity(jobs.len());
    for job in jobs {
        let semaphore = semaphore.clone();
        let registry = registry.clone();
        let breakers = breakers.clone();
        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire().await.expect("semaphore never closed");
            attempt_one(job, registry, breakers, per_receiver_timeout).await
        }));
    }

    let mut outcomes = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.await {
            Ok(outcome) => outcomes.push(outcome),
            Err(_join_err) => {
                // The spawned task itself was aborted/panicked before producing an
                // outcome; this is distinct from the in-task panic handled above
                // and should not normally happen since attempt_one never panics.
            }
        }
    }
    FanOutResult { outcomes }
}
