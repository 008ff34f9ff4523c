use std::time::Duration;

use alertgate_core::{ClassificationVerdict, Fingerprint};
use alertgate_state::{KeyKind, StateKey, StateStore};
use moka::future::Cache;
use tracing::warn;

/// Two-tier classification cache: an in-process `moka` LRU (L1) in front of
/// the distributed `StateStore` (L2). Both tiers fail open: a store error
/// is logged and treated as a miss, never propagated, per the spec's
/// "cache failure -> skip cache, continue" policy.
pub struct ClassificationCache {
    l1: Cache<String, ClassificationVerdict>,
    l2: std::sync::Arc<dyn StateStore>,
    ttl: Duration,
    namespace: String,
}

impl ClassificationCache {
    #[must_use]
    pub fn new(l1_capacity: u64, ttl: Duration, l2: std::sync::Arc<dyn StateStore>) -> Self {
        Self {
            l1: Cache::builder().max_capacity(l1_capacity).time_to_live(ttl).build(),
            l2,
            ttl,
            namespace: "alertgate".to_string(),
        }
    }

    fn key(&self, fingerprint: &Fingerprint) -> StateKey {
        StateKey::new(&self.namespace, "default", KeyKind::Classification, fingerprint.as_str())
    }

    /// Returns the verdict and which tier served it, or `None` on a clean
    /// miss in both tiers.
    pub async fn get(&self, fingerprint: &Fingerprint) -> Option<(ClassificationVerdict, CacheTier)> {
        if let Some(v) = self.l1.get(fingerprint.as_str()).await {
            return Some((v, CacheTier::L1));
        }
        match self.l2.get(&self.key(fingerprint)).await {
            Ok(Some(raw)) => match serde_json::from_str::<ClassificationVerdict>(&raw) {
                Ok(v) => {
                    self.l1.insert(fingerprint.as_str().to_string(), v.clone()).await;
                    Some((v, CacheTier::L2))
                }
                Err(e) => {
                    warn!(error = %e, "failed to deserialize cached classification, treating as miss");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "L2 classification cache read failed, failing open");
                None
            }
        }
    }

    pub async fn put(&self, fingerprint: &Fingerprint, verdict: &ClassificationVerdict) {
        self.l1.insert(fingerprint.as_str().to_string(), verdict.clone()).await;
        match serde_json::to_string(verdict) {
            Ok(raw) => {
                if let Err(e) = self.l2.set(&self.key(fingerprint), &raw, Some(self.ttl)).await {
                    warn!(error = %e, "L2 classification cache write failed");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize classification verdict"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheTier {
    L1,
    L2,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alertgate_state_memory::MemoryStateStore;

    #[tokio::test]
    async fn miss_then_put_then_l1_hit() {
        let cache = ClassificationCache::new(100, Duration::from_secs(60), std::sync::Arc::new(MemoryStateStore::new()));
        let fp = Fingerprint::new("fp1");
        assert!(cache.get(&fp).await.is_none());
        let verdict = ClassificationVerdict::fallback(alertgate_core::Severity::Warning, "x");
        cache.put(&fp, &verdict).await;
        let (_, tier) = cache.get(&fp).await.unwrap();
        assert_eq!(tier, CacheTier::L1);
    }

    #[tokio::test]
    async fn l2_hit_populates_l1() {
        let store = std::sync::Arc::new(MemoryStateStore::new());
        let cache_writer = ClassificationCache::new(100, Duration::from_secs(60), store.clone());
        let fp = Fingerprint::new("fp2");
        let verdict = ClassificationVerdict::fallback(alertgate_core::Severity::Critical, "x");
        // bypass L1 by writing only L2 directly via a fresh cache instance
        cache_writer.put(&fp, &verdict).await;

        let cache_reader = ClassificationCache::new(100, Duration::from_secs(60), store);
        let (_, tier) = cache_reader.get(&fp).await.unwrap();
        assert_eq!(tier, CacheTier::L2);
    }
}
