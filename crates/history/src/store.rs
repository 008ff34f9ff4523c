use alertgate_core::{Fingerprint, Severity};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::record::HistoryRecord;

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("history backend error: {0}")]
    Backend(String),
}

/// Filter applied when querying history; all fields are optional ANDs,
/// matching the `/history` query parameters in §6.
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    pub fingerprint: Option<Fingerprint>,
    pub severity: Option<Severity>,
    pub since: Option<DateTime<Utc>>,
}

impl HistoryFilter {
    fn accepts(&self, record: &HistoryRecord) -> bool {
        if let Some(fp) = &self.fingerprint {
            if &record.fingerprint != fp {
                return false;
            }
        }
        if let Some(sev) = self.severity {
            if record.severity() != Some(sev) {
                return false;
            }
        }
        if let Some(since) = self.since {
            if record.received_at < since {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone)]
pub struct HistoryPage {
    pub records: Vec<HistoryRecord>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
}

/// The relational alert history store named in §1/§6 as an external
/// collaborator. This crate defines the operations the core pipeline
/// invokes on it; `alertgate-server` (or any deployment) wires in whatever
/// concrete relational backend it likes behind this trait. [`MemoryHistoryStore`]
/// is the reference implementation used by tests and as a zero-dependency
/// default.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Append a record. Per §4.6 step 5, a failure here must never fail the
    /// ingestion path — callers log a warning and continue; it is not this
    /// trait's job to swallow the error, only to report it accurately.
    async fn insert(&self, record: HistoryRecord) -> Result<(), HistoryError>;

    /// Paged, filtered query. `page` is 1-indexed, newest-first.
    async fn query(&self, filter: &HistoryFilter, page: usize, limit: usize) -> Result<HistoryPage, HistoryError>;
}

pub(crate) fn paginate(mut all: Vec<HistoryRecord>, filter: &HistoryFilter, page: usize, limit: usize) -> HistoryPage {
    all.retain(|r| filter.accepts(r));
    all.sort_by(|a, b| b.received_at.cmp(&a.received_at));
    let total = all.len();
    let page = page.max(1);
    let limit = limit.max(1);
    let start = (page - 1) * limit;
    let records = all.into_iter().skip(start).take(limit).collect();
    HistoryPage { records, total, page, limit }
}
