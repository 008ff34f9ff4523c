use std::time::{Duration, Instant};

use alertgate_core::{Alert, AlertStatus, Fingerprint};
use dashmap::{DashMap, DashSet};

struct Entry {
    alert: Alert,
    last_seen: Instant,
}

/// Set of currently-firing alerts, indexed by fingerprint and secondarily by
/// `alertname` so inhibition rule evaluation can pre-filter candidate
/// sources without scanning the whole cache.
///
/// Silenced alerts still populate this cache: silencing only suppresses
/// notification, it does not remove an alert's ability to act as an
/// inhibition source.
pub struct ActiveAlertCache {
    by_fingerprint: DashMap<Fingerprint, Entry>,
    by_alertname: DashMap<String, DashSet<Fingerprint>>,
    ttl: Duration,
}

impl ActiveAlertCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self { by_fingerprint: DashMap::new(), by_alertname: DashMap::new(), ttl }
    }

    /// Record the alert's latest known state. A resolved alert is evicted
    /// immediately; a firing alert is inserted or refreshed.
    pub fn observe(&self, alert: &Alert) {
        match alert.status {
            AlertStatus::Resolved => self.remove(&alert.fingerprint),
            AlertStatus::Firing => {
                self.by_alertname.entry(alert.alertname.clone()).or_default().insert(alert.fingerprint.clone());
                self.by_fingerprint.insert(alert.fingerprint.clone(), Entry { alert: alert.clone(), last_seen: Instant::now() });
            }
        }
    }

    pub fn remove(&self, fingerprint: &Fingerprint) {
        if let Some((_, entry)) = self.by_fingerprint.remove(fingerprint) {
            if let Some(set) = self.by_alertname.get(&entry.alert.alertname) {
                set.remove(fingerprint);
            }
        }
    }

    /// Candidate source alerts sharing `alertname`, used as the inhibition
    /// rule's pre-filter before matcher evaluation.
    #[must_use]
    pub fn firing_with_alertname(&self, alertname: &str) -> Vec<Alert> {
        let Some(set) = self.by_alertname.get(alertname) else { return Vec::new() };
        set.iter().filter_map(|fp| self.by_fingerprint.get(fp.key()).map(|e| e.alert.clone())).collect()
    }

    #[must_use]
    pub fn all_firing(&self) -> Vec<Alert> {
        self.by_fingerprint.iter().map(|e| e.alert.clone()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_fingerprint.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_fingerprint.is_empty()
    }

    /// Evict entries whose `last_seen` exceeds the configured TTL. Intended
    /// to run on a periodic background tick alongside the silence sweep.
    pub fn sweep_expired(&self) {
        let stale: Vec<Fingerprint> = self
            .by_fingerprint
            .iter()
            .filter(|e| e.last_seen.elapsed() > self.ttl)
            .map(|e| e.key().clone())
            .collect();
        for fp in stale {
            self.remove(&fp);
        }
    }
}
