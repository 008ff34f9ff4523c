//! Three-state circuit breaker shared by the classifier call site and every
//! per-receiver publish path.
//!
//! Trips closed -> open on either of two independent rules: `K` consecutive
//! failures, or a failure rate >= `failure_rate_threshold` over a sliding
//! time window once at least `window_min_samples` outcomes have landed in
//! that window. The teacher's breaker (`acteon-gateway::circuit_breaker`)
//! only implements the consecutive-failure rule against state persisted in a
//! `StateStore`; this breaker is in-process (per-instance, guarded by a
//! `tokio::sync::RwLock`, matching the concurrency model's "per-breaker
//! readers-writer lock" requirement) and adds the windowed rule plus
//! slow-call accounting.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Open => write!(f, "open"),
            Self::HalfOpen => write!(f, "half_open"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Success,
    Failure,
    /// A call that succeeded but exceeded `slow_call_threshold`; counts as a
    /// breaker failure even though the caller saw a successful result.
    Slow,
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before the breaker trips open.
    pub failure_threshold: u32,
    /// Consecutive successes in `HalfOpen` required to close.
    pub success_threshold: u32,
    /// Time spent `Open` before a half-open probe is allowed.
    pub reset_after: Duration,
    /// Width of the sliding window used by the failure-rate rule.
    pub window_duration: Duration,
    /// Minimum number of outcomes inside the window before the failure-rate
    /// rule is allowed to trip the breaker; below this, only the
    /// consecutive-failure rule applies.
    pub window_min_samples: usize,
    /// Failure rate (0.0..=1.0) over the window that trips the breaker.
    pub failure_rate_threshold: f64,
    /// A call slower than this counts as a failure even on success.
    pub slow_call_threshold: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 2,
            reset_after: Duration::from_secs(30),
            window_duration: Duration::from_secs(60),
            window_min_samples: 10,
            failure_rate_threshold: 0.5,
            slow_call_threshold: Duration::from_secs(3),
        }
    }
}

#[derive(Debug)]
struct CircuitData {
    state: CircuitState,
    consecutive_failures: u32,
    consecutive_successes: u32,
    opened_at: Option<Instant>,
    /// Sliding window of timestamped outcomes, oldest first.
    windowed_outcomes: VecDeque<(Instant, Outcome)>,
    /// Whether a half-open probe is currently in flight (at most one).
    probe_in_flight: bool,
}

impl Default for CircuitData {
    fn default() -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            consecutive_successes: 0,
            opened_at: None,
            windowed_outcomes: VecDeque::new(),
            probe_in_flight: false,
        }
    }
}

impl CircuitData {
    fn prune_window(&mut self, now: Instant, window: Duration) {
        while let Some((ts, _)) = self.windowed_outcomes.front() {
            if now.duration_since(*ts) > window {
                self.windowed_outcomes.pop_front();
            } else {
                break;
            }
        }
    }

    fn failure_rate_trips(&self, cfg: &CircuitBreakerConfig) -> bool {
        if self.windowed_outcomes.len() < cfg.window_min_samples {
            return false;
        }
        let failures = self
            .windowed_outcomes
            .iter()
            .filter(|(_, o)| matches!(o, Outcome::Failure | Outcome::Slow))
            .count();
        #[allow(clippy::cast_precision_loss)]
        let rate = failures as f64 / self.windowed_outcomes.len() as f64;
        rate >= cfg.failure_rate_threshold
    }
}

/// A circuit breaker instance, named for logging (classifier, or a receiver
/// name for per-target breakers).
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    data: RwLock<CircuitData>,
}

/// Outcome of a permit check: whether the caller may proceed, plus an
/// optional state transition that just happened (for metrics/logging).
pub struct PermitDecision {
    pub allowed: bool,
    pub state: CircuitState,
    pub transition: Option<(CircuitState, CircuitState)>,
}

impl CircuitBreaker {
    #[must_use]
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            data: RwLock::new(CircuitData::default()),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    pub async fn state(&self) -> CircuitState {
        self.data.read().await.state
    }

    /// Check whether a call may proceed, transitioning `Open` -> `HalfOpen`
    /// when `reset_after` has elapsed. At most one probe may be in flight
    /// while half-open; subsequent callers are rejected until the probe
    /// resolves.
    pub async fn try_acquire_permit(&self) -> PermitDecision {
        let now = Instant::now();
        let mut data = self.data.write().await;
        match data.state {
            CircuitState::Closed => PermitDecision { allowed: true, state: CircuitState::Closed, transition: None },
            CircuitState::Open => {
                let elapsed = data.opened_at.map_or(Duration::MAX, |t| now.duration_since(t));
                if elapsed >= self.config.reset_after {
                    data.state = CircuitState::HalfOpen;
                    data.probe_in_flight = true;
                    info!(breaker = %self.name, "circuit half-open, probing");
                    PermitDecision {
                        allowed: true,
                        state: CircuitState::HalfOpen,
                        transition: Some((CircuitState::Open, CircuitState::HalfOpen)),
                    }
                } else {
                    PermitDecision { allowed: false, state: CircuitState::Open, transition: None }
                }
            }
            CircuitState::HalfOpen => {
                if data.probe_in_flight {
                    PermitDecision { allowed: false, state: CircuitState::HalfOpen, transition: None }
                } else {
                    data.probe_in_flight = true;
                    PermitDecision { allowed: true, state: CircuitState::HalfOpen, transition: None }
                }
            }
        }
    }

    pub async fn record_success(&self) -> Option<(CircuitState, CircuitState)> {
        self.record_outcome(Outcome::Success).await
    }

    pub async fn record_failure(&self) -> Option<(CircuitState, CircuitState)> {
        self.record_outcome(Outcome::Failure).await
    }

    /// Record a call's result along with its duration; a successful call
    /// slower than `slow_call_threshold` is accounted as a failure.
    pub async fn record_timed(&self, succeeded: bool, duration: Duration) -> Option<(CircuitState, CircuitState)> {
        let outcome = if !succeeded {
            Outcome::Failure
        } else if duration > self.config.slow_call_threshold {
            Outcome::Slow
        } else {
            Outcome::Success
        };
        self.record_outcome(outcome).await
    }

    async fn record_outcome(&self, outcome: Outcome) -> Option<(CircuitState, CircuitState)> {
        let now = Instant::now();
        let mut data = self.data.write().await;
        data.windowed_outcomes.push_back((now, outcome));
        data.prune_window(now, self.config.window_duration);

        let from = data.state;
        let transition = match (data.state, outcome) {
            (CircuitState::Closed, Outcome::Success) => {
                data.consecutive_failures = 0;
                None
            }
            (CircuitState::Closed, Outcome::Failure | Outcome::Slow) => {
                data.consecutive_failures += 1;
                let trips = data.consecutive_failures >= self.config.failure_threshold || data.failure_rate_trips(&self.config);
                if trips {
                    data.state = CircuitState::Open;
                    data.opened_at = Some(now);
                    data.consecutive_failures = 0;
                    Some((CircuitState::Closed, CircuitState::Open))
                } else {
                    None
                }
            }
            (CircuitState::HalfOpen, Outcome::Success) => {
                data.probe_in_flight = false;
                data.consecutive_successes += 1;
                if data.consecutive_successes >= self.config.success_threshold {
                    data.state = CircuitState::Closed;
                    data.consecutive_successes = 0;
                    data.consecutive_failures = 0;
                    data.windowed_outcomes.clear();
                    Some((CircuitState::HalfOpen, CircuitState::Closed))
                } else {
                    None
                }
            }
            (CircuitState::HalfOpen, Outcome::Failure | Outcome::Slow) => {
                data.probe_in_flight = false;
                data.consecutive_successes = 0;
                data.state = CircuitState::Open;
                data.opened_at = Some(now);
                Some((CircuitState::HalfOpen, CircuitState::Open))
            }
            (CircuitState::Open, _) => None,
        };

        if let Some((from, to)) = transition {
            debug!(breaker = %self.name, %from, %to, "circuit transition");
        }
        let _ = from;
        transition
    }

    pub async fn reset(&self) {
        let mut data = self.data.write().await;
        *data = CircuitData::default();
    }
}
