use alertgate_core::SilenceId;
use alertgate_matcher::Matcher;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A time-bounded suppression rule. All of `matchers` must match an alert
/// (AND) for the silence to apply to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Silence {
    pub id: SilenceId,
    pub matchers: Vec<Matcher>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub created_by: String,
    pub comment: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SilenceState {
    Pending,
    Active,
    Expired,
}

impl Silence {
    /// Derive the lifecycle state from `now`. Pure function of the silence's
    /// own fields and `now` — evaluating twice at the same instant always
    /// agrees, per the idempotence requirement.
    #[must_use]
    pub fn state_at(&self, now: DateTime<Utc>) -> SilenceState {
        if now >= self.ends_at {
            SilenceState::Expired
        } else if now >= self.starts_at {
            SilenceState::Active
        } else {
            SilenceState::Pending
        }
    }

    #[must_use]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.state_at(now) == SilenceState::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alertgate_matcher::Operator;
    use chrono::Duration;

    fn silence(starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> Silence {
        Silence {
            id: SilenceId::new("s1"),
            matchers: vec![Matcher::new("alertname", "HighCPU", Operator::Eq).unwrap()],
            starts_at,
            ends_at,
            created_by: "oncall".into(),
            comment: "known flapping node".into(),
        }
    }

    #[test]
    fn pending_before_start() {
        let now = Utc::now();
        let s = silence(now + Duration::minutes(5), now + Duration::hours(1));
        assert_eq!(s.state_at(now), SilenceState::Pending);
    }

    #[test]
    fn active_between_bounds() {
        let now = Utc::now();
        let s = silence(now - Duration::minutes(1), now + Duration::hours(1));
        assert_eq!(s.state_at(now), SilenceState::Active);
    }

    #[test]
    fn expired_past_end() {
        let now = Utc::now();
        let s = silence(now - Duration::hours(2), now - Duration::hours(1));
        assert_eq!(s.state_at(now), SilenceState::Expired);
    }

    #[test]
    fn created_in_past_is_immediately_active() {
        let now = Utc::now();
        let s = silence(now - Duration::days(1), now + Duration::days(1));
        assert!(s.is_active_at(now));
    }

    #[test]
    fn state_evaluation_is_idempotent() {
        let now = Utc::now();
        let s = silence(now - Duration::minutes(1), now + Duration::hours(1));
        assert_eq!(s.state_at(now), s.state_at(now));
    }
}
