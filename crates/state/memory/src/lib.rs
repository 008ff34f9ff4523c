//! In-memory reference implementation of `alertgate_state`'s traits, used by
//! default and by every pipeline-level test.

mod lock;
mod store;

pub use lock::MemoryDistributedLock;
pub use store::MemoryStateStore;

#[cfg(test)]
mod conformance {
    use super::*;
    use alertgate_state::testing::run_store_conformance_tests;

    #[tokio::test]
    async fn memory_store_passes_conformance_suite() {
        let store = MemoryStateStore::new();
        run_store_conformance_tests(&store).await.unwrap();
    }
}
