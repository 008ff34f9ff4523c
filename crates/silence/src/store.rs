use std::sync::Arc;

use alertgate_core::{Alert, SilenceId};
use alertgate_matcher::{matches_all, RegexCache};
use alertgate_state::{KeyKind, StateKey, StateStore};
use arc_swap::ArcSwap;
use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

use crate::model::Silence;

#[derive(Debug, thiserror::Error)]
pub enum SilenceError {
    #[error("silence store backend error: {0}")]
    Backend(String),
    #[error("silence not found: {0}")]
    NotFound(String),
    #[error("invalid silence: starts_at must precede ends_at")]
    InvalidBounds,
}

/// CRUD store for silences, backed by a `StateStore`, with an in-process
/// active-set snapshot for lock-free reads during ingestion.
///
/// The snapshot is an immutable `Vec<Silence>` swapped atomically on every
/// mutation; a reader captures the current `Arc` at entry and is unaffected
/// by concurrent writers, per the copy-on-write requirement.
pub struct SilenceStore {
    backend: Arc<dyn StateStore>,
    namespace: String,
    snapshot: ArcSwap<Vec<Silence>>,
    regex_cache: RegexCache,
}

impl SilenceStore {
    pub async fn load(backend: Arc<dyn StateStore>, namespace: impl Into<String>) -> Result<Self, SilenceError> {
        let namespace = namespace.into();
        let store = Self {
            backend,
            namespace,
            snapshot: ArcSwap::from_pointee(Vec::new()),
            regex_cache: RegexCache::default(),
        };
        store.refresh().await?;
        Ok(store)
    }

    fn key(&self, id: &SilenceId) -> StateKey {
        StateKey::new(&self.namespace, "default", KeyKind::Silence, id.as_str())
    }

    /// Re-read every silence document from the backend and swap in a fresh
    /// snapshot. Called on mutation and periodically by a background sweep.
    pub async fn refresh(&self) -> Result<(), SilenceError> {
        let rows = self
            .backend
            .scan_keys_by_kind(KeyKind::Silence)
            .await
            .map_err(|e| SilenceError::Backend(e.to_string()))?;
        let mut silences = Vec::with_capacity(rows.len());
        for (key, raw) in rows {
            match serde_json::from_str::<Silence>(&raw) {
                Ok(s) => silences.push(s),
                Err(e) => warn!(key = %key, error = %e, "dropping unparseable silence document"),
            }
        }
        self.snapshot.store(Arc::new(silences));
        Ok(())
    }

    pub async fn create(
        &self,
        matchers: Vec<alertgate_matcher::Matcher>,
        starts_at: chrono::DateTime<Utc>,
        ends_at: chrono::DateTime<Utc>,
        created_by: impl Into<String>,
        comment: impl Into<String>,
    ) -> Result<Silence, SilenceError> {
        if starts_at >= ends_at {
            return Err(SilenceError::InvalidBounds);
        }
        let silence = Silence {
            id: SilenceId::new(Uuid::new_v4().to_string()),
            matchers,
            starts_at,
            ends_at,
            created_by: created_by.into(),
            comment: comment.into(),
        };
        self.persist(&silence).await?;
        self.refresh().await?;
        Ok(silence)
    }

    async fn persist(&self, silence: &Silence) -> Result<(), SilenceError> {
        let raw = serde_json::to_string(silence).map_err(|e| SilenceError::Backend(e.to_string()))?;
        self.backend
            .set(&self.key(&silence.id), &raw, None)
            .await
            .map_err(|e| SilenceError::Backend(e.to_string()))
    }

    pub async fn get(&self, id: &SilenceId) -> Option<Silence> {
        self.snapshot.load().iter().find(|s| &s.id == id).cloned()
    }

    pub async fn list(&self) -> Vec<Silence> {
        self.snapshot.load().as_ref().clone()
    }

    /// Delete a silence. Treated as an explicit transition to expired: the
    /// document is removed from the backend and the snapshot is refreshed.
    pub async fn delete(&self, id: &SilenceId) -> Result<(), SilenceError> {
        let existed = self.backend.delete(&self.key(id)).await.map_err(|e| SilenceError::Backend(e.to_string()))?;
        if !existed {
            return Err(SilenceError::NotFound(id.as_str().to_string()));
        }
        self.refresh().await
    }

    /// `MatchesAny(alert, activeSilences) -> []silenceID`. Evaluates only
    /// silences active at `now`, pre-filtering isn't required here since the
    /// snapshot is already small (≤100 per the performance budget).
    #[must_use]
    pub fn matches_any(&self, alert: &Alert, now: chrono::DateTime<Utc>) -> Vec<SilenceId> {
        self.snapshot
            .load()
            .iter()
            .filter(|s| s.is_active_at(now))
            .filter(|s| matches_all(alert, &s.matchers, &self.regex_cache))
            .map(|s| s.id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alertgate_core::AlertStatus;
    use alertgate_matcher::Operator;
    use alertgate_state_memory::MemoryStateStore;
    use chrono::Duration;
    use std::collections::BTreeMap;

    fn alert(alertname: &str) -> Alert {
        Alert::new(alertname, AlertStatus::Firing, Utc::now(), None, BTreeMap::new(), BTreeMap::new(), None)
    }

    #[tokio::test]
    async fn create_then_matches_any_finds_it() {
        let store = SilenceStore::load(Arc::new(MemoryStateStore::new()), "alertgate").await.unwrap();
        let now = Utc::now();
        store
            .create(
                vec![alertgate_matcher::Matcher::new("alertname", "HighCPU", Operator::Eq).unwrap()],
                now - Duration::minutes(1),
                now + Duration::hours(1),
                "oncall",
                "flapping",
            )
            .await
            .unwrap();

        let hits = store.matches_any(&alert("HighCPU"), now);
        assert_eq!(hits.len(), 1);
        assert!(store.matches_any(&alert("LowDisk"), now).is_empty());
    }

    #[tokio::test]
    async fn pending_silence_does_not_match() {
        let store = SilenceStore::load(Arc::new(MemoryStateStore::new()), "alertgate").await.unwrap();
        let now = Utc::now();
        store
            .create(
                vec![alertgate_matcher::Matcher::new("alertname", "HighCPU", Operator::Eq).unwrap()],
                now + Duration::minutes(5),
                now + Duration::hours(1),
                "oncall",
                "scheduled",
            )
            .await
            .unwrap();
        assert!(store.matches_any(&alert("HighCPU"), now).is_empty());
    }

    #[tokio::test]
    async fn rejects_inverted_bounds() {
        let store = SilenceStore::load(Arc::new(MemoryStateStore::new()), "alertgate").await.unwrap();
        let now = Utc::now();
        let result = store.create(vec![], now, now - Duration::minutes(1), "oncall", "bad").await;
        assert!(matches!(result, Err(SilenceError::InvalidBounds)));
    }

    #[tokio::test]
    async fn delete_removes_from_snapshot() {
        let store = SilenceStore::load(Arc::new(MemoryStateStore::new()), "alertgate").await.unwrap();
        let now = Utc::now();
        let s = store
            .create(
                vec![alertgate_matcher::Matcher::new("alertname", "HighCPU", Operator::Eq).unwrap()],
                now - Duration::minutes(1),
                now + Duration::hours(1),
                "oncall",
                "flapping",
            )
            .await
            .unwrap();
        store.delete(&s.id).await.unwrap();
        assert!(store.get(&s.id).await.is_none());
        assert!(store.matches_any(&alert("HighCPU"), now).is_empty());
    }
}
