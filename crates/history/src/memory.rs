use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::record::HistoryRecord;
use crate::store::{paginate, HistoryError, HistoryFilter, HistoryPage, HistoryStore};

/// In-memory reference implementation, used by default and by pipeline
/// tests; mirrors `alertgate-state-memory`'s role for the `StateStore`
/// trait.
#[derive(Default)]
pub struct MemoryHistoryStore {
    records: RwLock<Vec<HistoryRecord>>,
}

impl MemoryHistoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn insert(&self, record: HistoryRecord) -> Result<(), HistoryError> {
        self.records.write().await.push(record);
        Ok(())
    }

    async fn query(&self, filter: &HistoryFilter, page: usize, limit: usize) -> Result<HistoryPage, HistoryError> {
        let all = self.records.read().await.clone();
        Ok(paginate(all, filter, page, limit))
    }
}
