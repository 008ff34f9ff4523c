use std::time::Duration;

/// Exponential backoff with deterministic jitter, shared by the classifier's
/// remote-call retry and the publisher's per-target retry.
///
/// `base * 2^(attempt-1) + jitter`, capped at `max`. Jitter varies by
/// `attempt % 5` rather than drawing from an RNG, so retries spread out
/// across a window without adding a random-number dependency to the
/// call path.
#[derive(Debug, Clone)]
pub struct RetryStrategy {
    pub base: Duration,
    pub max: Duration,
    pub multiplier: f64,
    pub jitter: bool,
}

impl RetryStrategy {
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base_secs = self.base.as_secs_f64();
        #[allow(clippy::cast_possible_wrap)]
        let raw = base_secs * self.multiplier.powi(attempt as i32);
        let adjusted = if self.jitter {
            let jitter_factor = 1.0 + 0.1 * f64::from(attempt % 5);
            raw * jitter_factor
        } else {
            raw
        };
        Duration::from_secs_f64(adjusted.min(self.max.as_secs_f64()))
    }
}

impl Default for RetryStrategy {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(200),
            max: Duration::from_secs(30),
            multiplier: 2.0,
            jitter: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_jitter_doubles_each_attempt() {
        let s = RetryStrategy { base: Duration::from_millis(100), max: Duration::from_secs(60), multiplier: 2.0, jitter: false };
        assert_eq!(s.delay_for(0), Duration::from_millis(100));
        assert_eq!(s.delay_for(1), Duration::from_millis(200));
        assert_eq!(s.delay_for(2), Duration::from_millis(400));
    }

    #[test]
    fn clamps_at_max() {
        let s = RetryStrategy { base: Duration::from_secs(1), max: Duration::from_secs(5), multiplier: 3.0, jitter: false };
        assert_eq!(s.delay_for(10), Duration::from_secs(5));
    }

    #[test]
    fn jitter_increases_delay_without_exceeding_max() {
        let s = RetryStrategy { base: Duration::from_millis(100), max: Duration::from_secs(60), multiplier: 2.0, jitter: true };
        assert_eq!(s.delay_for(1), Duration::from_millis(220));
    }

    #[test]
    fn default_matches_spec_backoff_shape() {
        let s = RetryStrategy::default();
        assert_eq!(s.multiplier, 2.0);
        assert!(s.jitter);
    }
}
