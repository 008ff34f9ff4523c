//! In-process counters for the pipeline events the spec names but leaves
//! Prometheus exposition itself out of scope for: `silence_matched_total`
//! and friends. A collaborator renders these as Prometheus text without
//! this crate depending on an HTTP framework.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

#[derive(Default)]
pub struct PipelineMetrics {
    alerts_received: AtomicU64,
    alerts_processed: AtomicU64,
    silence_matched: DashMap<String, AtomicU64>,
    inhibited_total: AtomicU64,
    published_total: AtomicU64,
    history_write_failures: AtomicU64,
}

impl PipelineMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_received(&self, n: u64) {
        self.alerts_received.fetch_add(n, Ordering::Relaxed);
    }

    pub fn record_processed(&self, n: u64) {
        self.alerts_processed.fetch_add(n, Ordering::Relaxed);
    }

    pub fn record_silence_matched(&self, silence_id: &str) {
        self.silence_matched.entry(silence_id.to_string()).or_insert_with(|| AtomicU64::new(0)).fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_inhibited(&self) {
        self.inhibited_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_published(&self, n: u64) {
        self.published_total.fetch_add(n, Ordering::Relaxed);
    }

    pub fn record_history_write_failure(&self) {
        self.history_write_failures.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn snapshot(&self) -> PipelineMetricsSnapshot {
        PipelineMetricsSnapshot {
            alerts_received: self.alerts_received.load(Ordering::Relaxed),
            alerts_processed: self.alerts_processed.load(Ordering::Relaxed),
            silence_matched: self.silence_matched.iter().map(|e| (e.key().clone(), e.value().load(Ordering::Relaxed))).collect(),
            inhibited_total: self.inhibited_total.load(Ordering::Relaxed),
            published_total: self.published_total.load(Ordering::Relaxed),
            history_write_failures: self.history_write_failures.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineMetricsSnapshot {
    pub alerts_received: u64,
    pub alerts_processed: u64,
    pub silence_matched: Vec<(String, u64)>,
    pub inhibited_total: u64,
    pub published_total: u64,
    pub history_write_failures: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_independently() {
        let m = PipelineMetrics::new();
        m.record_received(2);
        m.record_processed(1);
        m.record_silence_matched("sil-1");
        m.record_silence_matched("sil-1");
        m.record_inhibited();

        let snap = m.snapshot();
        assert_eq!(snap.alerts_received, 2);
        assert_eq!(snap.alerts_processed, 1);
        assert_eq!(snap.inhibited_total, 1);
        assert_eq!(snap.silence_matched.iter().find(|(id, _)| id == "sil-1").unwrap().1, 2);
    }
}
