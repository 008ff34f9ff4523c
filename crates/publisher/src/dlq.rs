//! Durable dead-letter queue: retry-exhausted [`PublishJob`]s land here as
//! [`DlqEntry`] rows, addressable for listing, replay, and purge per §4.5.4.

use std::sync::Arc;

use alertgate_core::{DlqEntry, Fingerprint, JobId, Priority, PublishErrorKind, PublishJob, ReceiverName};
use alertgate_state::{KeyKind, StateKey, StateStore};
use chrono::{DateTime, Utc};
use tracing::warn;

#[derive(Debug, thiserror::Error)]
pub enum DlqError {
    #[error("dlq backend error: {0}")]
    Backend(String),
    #[error("dlq entry not found: {0}")]
    NotFound(String),
    #[error("dlq entry already replayed: {0}")]
    AlreadyReplayed(String),
}

/// Filter applied when listing DLQ entries; all fields are optional ANDs.
#[derive(Debug, Clone, Default)]
pub struct DlqFilter {
    pub receiver: Option<ReceiverName>,
    pub error_kind: Option<PublishErrorKind>,
    /// Only entries whose `last_failed_at` is at or before this instant.
    pub failed_before: Option<DateTime<Utc>>,
}

impl DlqFilter {
    fn accepts(&self, entry: &DlqEntry) -> bool {
        if let Some(r) = &self.receiver {
            if &entry.receiver != r {
                return false;
            }
        }
        if let Some(k) = self.error_kind {
            if entry.last_error_kind != k {
                return false;
            }
        }
        if let Some(before) = self.failed_before {
            if entry.last_failed_at > before {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone)]
pub struct DlqPage {
    pub entries: Vec<DlqEntry>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
}

/// Store of [`DlqEntry`] rows, backed by a [`StateStore`].
pub struct DlqStore {
    backend: Arc<dyn StateStore>,
    namespace: String,
}

impl DlqStore {
    #[must_use]
    pub fn new(backend: Arc<dyn StateStore>, namespace: impl Into<String>) -> Self {
        Self { backend, namespace: namespace.into() }
    }

    fn key(&self, job_id: &JobId) -> StateKey {
        StateKey::new(&self.namespace, "default", KeyKind::Dlq, job_id.as_str())
    }

    /// Record a publish job that exhausted its retry budget (or hit a
    /// non-retryable / queue-full failure) as a durable entry.
    pub async fn record(
        &self,
        job: &PublishJob,
        last_error: impl Into<String>,
        last_error_kind: PublishErrorKind,
        now: DateTime<Utc>,
    ) -> Result<DlqEntry, DlqError> {
        let entry = DlqEntry {
            job_id: job.job_id.clone(),
            receiver: job.receiver.clone(),
            alert_fingerprint: job.alert_fingerprint.clone(),
            payload: job.formatted_payload.clone(),
            attempts: job.attempt,
            last_error: last_error.into(),
            last_error_kind,
            first_failed_at: now,
            last_failed_at: now,
            replayed: false,
        };
        self.persist(&entry).await?;
        Ok(entry)
    }

    async fn persist(&self, entry: &DlqEntry) -> Result<(), DlqError> {
        let raw = serde_json::to_string(entry).map_err(|e| DlqError::Backend(e.to_string()))?;
        self.backend.set(&self.key(&entry.job_id), &raw, None).await.map_err(|e| DlqError::Backend(e.to_string()))
    }

    async fn load_all(&self) -> Result<Vec<DlqEntry>, DlqError> {
        let rows = self.backend.scan_keys_by_kind(KeyKind::Dlq).await.map_err(|e| DlqError::Backend(e.to_string()))?;
        let mut entries = Vec::with_capacity(rows.len());
        for (key, raw) in rows {
            match serde_json::from_str::<DlqEntry>(&raw) {
                Ok(e) => entries.push(e),
                Err(e) => warn!(key = %key, error = %e, "dropping unparseable dlq entry"),
            }
        }
        entries.sort_by(|a, b| b.last_failed_at.cmp(&a.last_failed_at));
        Ok(entries)
    }

    pub async fn get(&self, job_id: &JobId) -> Result<DlqEntry, DlqError> {
        let raw = self
            .backend
            .get(&self.key(job_id))
            .await
            .map_err(|e| DlqError::Backend(e.to_string()))?
            .ok_or_else(|| DlqError::NotFound(job_id.as_str().to_string()))?;
        serde_json::from_str(&raw).map_err(|e| DlqError::Backend(e.to_string()))
    }

    /// Paged, filtered listing. `page` is 1-indexed.
    pub async fn list(&self, filter: &DlqFilter, page: usize, limit: usize) -> Result<DlqPage, DlqError> {
        let all: Vec<DlqEntry> = self.load_all().await?.into_iter().filter(|e| filter.accepts(e)).collect();
        let total = all.len();
        let page = page.max(1);
        let limit = limit.max(1);
        let start = (page - 1) * limit;
        let entries = all.into_iter().skip(start).take(limit).collect();
        Ok(DlqPage { entries, total, page, limit })
    }

    /// Replay a single entry: marks it replayed in the backend and returns a
    /// fresh [`PublishJob`] with `attempt=0`, the same payload bytes, and
    /// the tier implied by `priority` (the caller re-enqueues it).
    ///
    /// Idempotent at the DLQ level (a second replay of the same entry
    /// errors rather than silently re-enqueuing); downstream receivers may
    /// still observe duplicates across the two deliveries, as the spec's
    /// contract allows.
    pub async fn replay(&self, job_id: &JobId, priority: Priority, now: DateTime<Utc>) -> Result<PublishJob, DlqError> {
        let mut entry = self.get(job_id).await?;
        if entry.replayed {
            return Err(DlqError::AlreadyReplayed(job_id.as_str().to_string()));
        }
        entry.replayed = true;
        self.persist(&entry).await?;

        Ok(PublishJob::new(
            entry.alert_fingerprint.clone(),
            entry.receiver.clone(),
            entry.payload.clone(),
            priority,
            now,
        ))
    }

    /// Purge entries matching `filter`. Returns the number removed.
    pub async fn purge(&self, filter: &DlqFilter) -> Result<usize, DlqError> {
        let all = self.load_all().await?;
        let mut purged = 0;
        for entry in all.into_iter().filter(|e| filter.accepts(e)) {
            if self.backend.delete(&self.key(&entry.job_id)).await.map_err(|e| DlqError::Backend(e.to_string()))? {
                purged += 1;
            }
        }
        Ok(purged)
    }
}

/// Construct a synthetic [`Fingerprint`]-keyed DLQ entry for queue-full
/// rejections, which never became a [`PublishJob`] attempt. Kept separate
/// from `record` since there is no job to read attempt/payload metadata
/// from beyond what the caller already has in hand.
impl DlqStore {
    pub async fn record_queue_full(
        &self,
        job: &PublishJob,
        fingerprint: &Fingerprint,
        now: DateTime<Utc>,
    ) -> Result<DlqEntry, DlqError> {
        debug_assert_eq!(&job.alert_fingerprint, fingerprint);
        self.record(job, "priority queue tier is full", PublishErrorKind::QueueFull, now).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alertgate_state_memory::MemoryStateStore;

    fn job(receiver: &str) -> PublishJob {
        PublishJob::new(Fingerprint::new("fp1"), ReceiverName::new(receiver), b"{}".to_vec(), Priority::High, Utc::now())
    }

    #[tokio::test]
    async fn record_then_get_roundtrips() {
        let store = DlqStore::new(Arc::new(MemoryStateStore::new()), "alertgate");
        let j = job("pagerduty");
        let entry = store.record(&j, "boom", PublishErrorKind::Server5xx, Utc::now()).await.unwrap();
        let fetched = store.get(&entry.job_id).await.unwrap();
        assert_eq!(fetched.receiver.as_str(), "pagerduty");
        assert_eq!(fetched.last_error_kind, PublishErrorKind::Server5xx);
        assert!(!fetched.replayed);
    }

    #[tokio::test]
    async fn list_filters_by_receiver() {
        let store = DlqStore::new(Arc::new(MemoryStateStore::new()), "alertgate");
        store.record(&job("pagerduty"), "x", PublishErrorKind::Server5xx, Utc::now()).await.unwrap();
        store.record(&job("slack"), "x", PublishErrorKind::Network, Utc::now()).await.unwrap();

        let filter = DlqFilter { receiver: Some(ReceiverName::new("slack")), ..Default::default() };
        let page = store.list(&filter, 1, 10).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.entries[0].receiver.as_str(), "slack");
    }

    #[tokio::test]
    async fn replay_marks_replayed_and_resets_attempts() {
        let store = DlqStore::new(Arc::new(MemoryStateStore::new()), "alertgate");
        let mut j = job("pagerduty");
        j.attempt = 5;
        let entry = store.record(&j, "boom", PublishErrorKind::Server5xx, Utc::now()).await.unwrap();

        let replayed_job = store.replay(&entry.job_id, Priority::High, Utc::now()).await.unwrap();
        assert_eq!(replayed_job.attempt, 0);
        assert_eq!(replayed_job.formatted_payload, j.formatted_payload);

        let fetched = store.get(&entry.job_id).await.unwrap();
        assert!(fetched.replayed);
    }

    #[tokio::test]
    async fn replaying_twice_errors() {
        let store = DlqStore::new(Arc::new(MemoryStateStore::new()), "alertgate");
        let entry = store.record(&job("pagerduty"), "boom", PublishErrorKind::Server5xx, Utc::now()).await.unwrap();
        store.replay(&entry.job_id, Priority::High, Utc::now()).await.unwrap();
        let err = store.replay(&entry.job_id, Priority::High, Utc::now()).await.unwrap_err();
        assert!(matches!(err, DlqError::AlreadyReplayed(_)));
    }

    #[tokio::test]
    async fn purge_removes_matching_entries_only() {
        let store = DlqStore::new(Arc::new(MemoryStateStore::new()), "alertgate");
        store.record(&job("pagerduty"), "x", PublishErrorKind::Server5xx, Utc::now()).await.unwrap();
        store.record(&job("slack"), "x", PublishErrorKind::Network, Utc::now()).await.unwrap();

        let purged = store.purge(&DlqFilter { receiver: Some(ReceiverName::new("pagerduty")), ..Default::default() }).await.unwrap();
        assert_eq!(purged, 1);
        let remaining = store.list(&DlqFilter::default(), 1, 10).await.unwrap();
        assert_eq!(remaining.total, 1);
        assert_eq!(remaining.entries[0].receiver.as_str(), "slack");
    }

    #[tokio::test]
    async fn not_found_for_unknown_job() {
        let store = DlqStore::new(Arc::new(MemoryStateStore::new()), "alertgate");
        let err = store.get(&JobId::new("ghost")).await.unwrap_err();
        assert!(matches!(err, DlqError::NotFound(_)));
    }
}
