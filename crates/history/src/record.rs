use std::collections::BTreeMap;

use alertgate_core::{AlertStatus, ClassificationVerdict, Fingerprint, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A durable row capturing an accepted alert plus whatever classification
/// verdict (if any) it received, for query and audit per §4.6 step 5.
///
/// Written once, never mutated; a later alert with the same fingerprint
/// produces a new row rather than updating this one, so history reflects
/// every occurrence, not just the latest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub fingerprint: Fingerprint,
    pub alertname: String,
    pub status: AlertStatus,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
    pub verdict: Option<ClassificationVerdict>,
    /// Set when silence/inhibition suppressed notification; per §4.3/§4.6 a
    /// suppressed alert is still recorded, just not published.
    pub silenced: bool,
    pub inhibited: bool,
    pub received_at: DateTime<Utc>,
}

impl HistoryRecord {
    #[must_use]
    pub fn severity(&self) -> Option<Severity> {
        self.verdict.as_ref().map(|v| v.severity)
    }
}
