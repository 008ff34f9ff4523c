use std::time::Duration;

use async_trait::async_trait;

use crate::error::StateError;
use crate::key::{KeyKind, StateKey};

/// Trait for the distributed store collaborator: classification L2 cache,
/// silence documents, the active-alert cache's distributed tier, the
/// enrichment mode setting, and DLQ persistence all address this trait
/// through a `StateKey`.
///
/// Implementations must be `Send + Sync` and safe for concurrent access.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Get the value for a key. Returns `None` if not found or expired.
    async fn get(&self, key: &StateKey) -> Result<Option<String>, StateError>;

    /// Set a value with an optional TTL, overwriting any previous value.
    async fn set(&self, key: &StateKey, value: &str, ttl: Option<Duration>) -> Result<(), StateError>;

    /// Check if a key exists; if not, set it atomically. Returns `true` if
    /// newly set.
    async fn check_and_set(&self, key: &StateKey, value: &str, ttl: Option<Duration>) -> Result<bool, StateError>;

    /// Delete a key. Returns `true` if the key existed.
    async fn delete(&self, key: &StateKey) -> Result<bool, StateError>;

    /// Scan all keys of a given kind. Returns `(key, value)` pairs with the
    /// key in canonical string form. Expensive on some backends; used for
    /// DLQ listing and silence sweeps.
    async fn scan_keys_by_kind(&self, kind: KeyKind) -> Result<Vec<(String, String)>, StateError>;
}
