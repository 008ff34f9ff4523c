use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use alertgate_state::{KeyKind, StateError, StateKey, StateStore};

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|t| now < t)
    }
}

/// A `DashMap`-backed store. Suitable for tests, single-process deployments,
/// and as the default backend when no durable collaborator is configured.
#[derive(Default)]
pub struct MemoryStateStore {
    data: DashMap<String, Entry>,
}

impl MemoryStateStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn get(&self, key: &StateKey) -> Result<Option<String>, StateError> {
        let now = Instant::now();
        let canonical = key.canonical();
        let hit = self.data.get(&canonical).filter(|e| e.is_live(now)).map(|e| e.value.clone());
        if hit.is_none() {
            self.data.remove(&canonical);
        }
        Ok(hit)
    }

    async fn set(&self, key: &StateKey, value: &str, ttl: Option<Duration>) -> Result<(), StateError> {
        self.data.insert(
            key.canonical(),
            Entry { value: value.to_string(), expires_at: ttl.map(|d| Instant::now() + d) },
        );
        Ok(())
    }

    async fn check_and_set(&self, key: &StateKey, value: &str, ttl: Option<Duration>) -> Result<bool, StateError> {
        let now = Instant::now();
        let canonical = key.canonical();
        let mut created = false;
        self.data
            .entry(canonical)
            .and_modify(|_| {})
            .or_insert_with(|| {
                created = true;
                Entry { value: value.to_string(), expires_at: ttl.map(|d| now + d) }
            });
        if !created {
            // existing entry may have expired; treat as fresh insert in that case
            let expired = self.data.get(&key.canonical()).is_some_and(|e| !e.is_live(now));
            if expired {
                self.data.insert(
                    key.canonical(),
                    Entry { value: value.to_string(), expires_at: ttl.map(|d| now + d) },
                );
                created = true;
            }
        }
        Ok(created)
    }

    async fn delete(&self, key: &StateKey) -> Result<bool, StateError> {
        Ok(self.data.remove(&key.canonical()).is_some())
    }

    async fn scan_keys_by_kind(&self, kind: KeyKind) -> Result<Vec<(String, String)>, StateError> {
        let now = Instant::now();
        let marker = format!(":{kind}:");
        Ok(self
            .data
            .iter()
            .filter(|e| e.is_live(now) && e.key().contains(&marker))
            .map(|e| (e.key().clone(), e.value.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_get_roundtrips() {
        let store = MemoryStateStore::new();
        let key = StateKey::new("ns", "t", KeyKind::Silence, "a");
        store.set(&key, "v", None).await.unwrap();
        assert_eq!(store.get(&key).await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn scan_keys_by_kind_filters_correctly() {
        let store = MemoryStateStore::new();
        store.set(&StateKey::new("ns", "t", KeyKind::Silence, "a"), "1", None).await.unwrap();
        store.set(&StateKey::new("ns", "t", KeyKind::Classification, "b"), "2", None).await.unwrap();
        let silences = store.scan_keys_by_kind(KeyKind::Silence).await.unwrap();
        assert_eq!(silences.len(), 1);
        assert_eq!(silences[0].1, "1");
    }

    #[tokio::test]
    async fn ttl_expiry_hides_value() {
        let store = MemoryStateStore::new();
        let key = StateKey::new("ns", "t", KeyKind::Classification, "x");
        store.set(&key, "v", Some(Duration::from_millis(10))).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(store.get(&key).await.unwrap().is_none());
    }
}
