use std::time::Duration;

use crate::error::StateError;
use crate::key::{KeyKind, StateKey};
use crate::store::StateStore;

fn test_key(kind: KeyKind, id: &str) -> StateKey {
    StateKey::new("test-ns", "test-tenant", kind, id)
}

/// Run the state store conformance suite against a fresh backend instance.
///
/// # Errors
///
/// Returns an error if any conformance assertion fails.
pub async fn run_store_conformance_tests(store: &dyn StateStore) -> Result<(), StateError> {
    test_get_missing(store).await?;
    test_set_and_get(store).await?;
    test_check_and_set_new(store).await?;
    test_check_and_set_existing(store).await?;
    test_delete(store).await?;
    test_ttl_set(store).await?;
    Ok(())
}

async fn test_get_missing(store: &dyn StateStore) -> Result<(), StateError> {
    let key = test_key(KeyKind::Silence, "missing");
    assert!(store.get(&key).await?.is_none());
    Ok(())
}

async fn test_set_and_get(store: &dyn StateStore) -> Result<(), StateError> {
    let key = test_key(KeyKind::Silence, "set-get");
    store.set(&key, "hello", None).await?;
    assert_eq!(store.get(&key).await?.as_deref(), Some("hello"));
    Ok(())
}

async fn test_check_and_set_new(store: &dyn StateStore) -> Result<(), StateError> {
    let key = test_key(KeyKind::Classification, "cas-new");
    assert!(store.check_and_set(&key, "v1", None).await?);
    assert_eq!(store.get(&key).await?.as_deref(), Some("v1"));
    Ok(())
}

async fn test_check_and_set_existing(store: &dyn StateStore) -> Result<(), StateError> {
    let key = test_key(KeyKind::Classification, "cas-existing");
    store.set(&key, "v1", None).await?;
    assert!(!store.check_and_set(&key, "v2", None).await?);
    assert_eq!(store.get(&key).await?.as_deref(), Some("v1"));
    Ok(())
}

async fn test_delete(store: &dyn StateStore) -> Result<(), StateError> {
    let key = test_key(KeyKind::Silence, "delete-me");
    store.set(&key, "v", None).await?;
    assert!(store.delete(&key).await?);
    assert!(store.get(&key).await?.is_none());
    assert!(!store.delete(&key).await?);
    Ok(())
}

async fn test_ttl_set(store: &dyn StateStore) -> Result<(), StateError> {
    let key = test_key(KeyKind::Classification, "ttl");
    store.set(&key, "v", Some(Duration::from_millis(20))).await?;
    assert_eq!(store.get(&key).await?.as_deref(), Some("v"));
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(store.get(&key).await?.is_none());
    Ok(())
}
