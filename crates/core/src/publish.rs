use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Fingerprint, JobId, ReceiverName};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Normal,
    High,
    Critical,
}

/// Classification of a publish failure, used to decide retryability without
/// ever matching on an error's message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishErrorKind {
    Network,
    Timeout,
    Server5xx,
    RateLimit429,
    Client4xx,
    Panic,
    QueueFull,
}

impl PublishErrorKind {
    #[must_use]
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Network | Self::Timeout | Self::Server5xx | Self::RateLimit429)
    }
}

/// A unit of work handed to the fan-out publisher: one alert, one receiver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishJob {
    pub job_id: JobId,
    pub alert_fingerprint: Fingerprint,
    pub receiver: ReceiverName,
    pub formatted_payload: Vec<u8>,
    pub priority: Priority,
    pub attempt: u32,
    pub created_at: DateTime<Utc>,
    pub next_attempt_at: DateTime<Utc>,
}

impl PublishJob {
    #[must_use]
    pub fn new(
        alert_fingerprint: Fingerprint,
        receiver: ReceiverName,
        formatted_payload: Vec<u8>,
        priority: Priority,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            job_id: JobId::new(uuid::Uuid::new_v4().to_string()),
            alert_fingerprint,
            receiver,
            formatted_payload,
            priority,
            attempt: 0,
            created_at: now,
            next_attempt_at: now,
        }
    }
}

/// A durable record of a publish job that exhausted its retry budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DlqEntry {
    pub job_id: JobId,
    pub receiver: ReceiverName,
    pub alert_fingerprint: Fingerprint,
    pub payload: Vec<u8>,
    pub attempts: u32,
    pub last_error: String,
    pub last_error_kind: PublishErrorKind,
    pub first_failed_at: DateTime<Utc>,
    pub last_failed_at: DateTime<Utc>,
    pub replayed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_ordering_is_strict() {
        assert!(Priority::Critical > Priority::High);
        assert!(Priority::High > Priority::Normal);
    }

    #[test]
    fn error_kind_retryability() {
        assert!(PublishErrorKind::Network.is_retryable());
        assert!(PublishErrorKind::RateLimit429.is_retryable());
        assert!(!PublishErrorKind::Client4xx.is_retryable());
        assert!(!PublishErrorKind::Panic.is_retryable());
        assert!(!PublishErrorKind::QueueFull.is_retryable());
    }

    #[test]
    fn new_job_starts_at_attempt_zero() {
        let now = Utc::now();
        let job = PublishJob::new(Fingerprint::new("fp"), ReceiverName::new("slack"), vec![1, 2, 3], Priority::High, now);
        assert_eq!(job.attempt, 0);
        assert_eq!(job.next_attempt_at, now);
    }
}
