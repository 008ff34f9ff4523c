use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fingerprint::fingerprint_labels;
use crate::types::Fingerprint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Firing,
    Resolved,
}

/// An immutable alert, as produced by ingestion from a parsed webhook payload.
///
/// `fingerprint` is a deterministic hash over `labels`; two alerts have the
/// same fingerprint iff they have the same name→value label pairs (see
/// [`fingerprint_labels`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub fingerprint: Fingerprint,
    pub alertname: String,
    pub status: AlertStatus,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
    pub generator_url: Option<String>,
}

impl Alert {
    /// Build an alert and compute its fingerprint from `labels`.
    ///
    /// `alertname` must also be present as a `labels["alertname"]` entry per
    /// the alert-manager webhook convention; callers that already inserted it
    /// do not need to duplicate it.
    #[must_use]
    pub fn new(
        alertname: impl Into<String>,
        status: AlertStatus,
        starts_at: DateTime<Utc>,
        ends_at: Option<DateTime<Utc>>,
        mut labels: BTreeMap<String, String>,
        annotations: BTreeMap<String, String>,
        generator_url: Option<String>,
    ) -> Self {
        let alertname = alertname.into();
        labels.entry("alertname".to_string()).or_insert_with(|| alertname.clone());
        let fingerprint = Fingerprint::new(fingerprint_labels(&labels));
        Self {
            fingerprint,
            alertname,
            status,
            starts_at,
            ends_at,
            labels,
            annotations,
            generator_url,
        }
    }

    /// Construct an alert with an explicit fingerprint, as when the ingress
    /// payload already carried one. The caller is responsible for ensuring
    /// it matches `labels`; validation of that is the ingestion handler's job.
    #[must_use]
    pub fn with_fingerprint(
        fingerprint: Fingerprint,
        alertname: impl Into<String>,
        status: AlertStatus,
        starts_at: DateTime<Utc>,
        ends_at: Option<DateTime<Utc>>,
        labels: BTreeMap<String, String>,
        annotations: BTreeMap<String, String>,
        generator_url: Option<String>,
    ) -> Self {
        Self {
            fingerprint,
            alertname: alertname.into(),
            status,
            starts_at,
            ends_at,
            labels,
            annotations,
            generator_url,
        }
    }

    #[must_use]
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn is_firing(&self) -> bool {
        self.status == AlertStatus::Firing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
    }

    #[test]
    fn fingerprint_is_deterministic_over_label_order() {
        let now = Utc::now();
        let a = Alert::new(
            "HighCPU",
            AlertStatus::Firing,
            now,
            None,
            labels(&[("severity", "warning"), ("instance", "api-1")]),
            BTreeMap::new(),
            None,
        );
        let b = Alert::new(
            "HighCPU",
            AlertStatus::Firing,
            now,
            None,
            labels(&[("instance", "api-1"), ("severity", "warning")]),
            BTreeMap::new(),
            None,
        );
        assert_eq!(a.fingerprint, b.fingerprint);
    }

    #[test]
    fn different_label_values_yield_different_fingerprints() {
        let now = Utc::now();
        let a = Alert::new("X", AlertStatus::Firing, now, None, labels(&[("env", "prod")]), BTreeMap::new(), None);
        let b = Alert::new("X", AlertStatus::Firing, now, None, labels(&[("env", "staging")]), BTreeMap::new(), None);
        assert_ne!(a.fingerprint, b.fingerprint);
    }

    #[test]
    fn alertname_is_injected_into_labels() {
        let a = Alert::new("HighCPU", AlertStatus::Firing, Utc::now(), None, BTreeMap::new(), BTreeMap::new(), None);
        assert_eq!(a.label("alertname"), Some("HighCPU"));
    }
}
