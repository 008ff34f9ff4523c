use std::time::Duration;

use async_trait::async_trait;

use crate::error::StateError;

/// A held distributed lock. Dropping without explicit release is allowed
/// (the lock expires after its TTL); explicit release is preferred.
#[async_trait]
pub trait LockGuard: Send + Sync {
    async fn extend(&self, duration: Duration) -> Result<(), StateError>;
    async fn release(self: Box<Self>) -> Result<(), StateError>;
    async fn is_held(&self) -> Result<bool, StateError>;
}

/// Trait for acquiring distributed locks, used to serialize mutations to a
/// single breaker instance or a single fingerprint's `ActiveAlertCache`
/// entry across multiple gateway processes.
#[async_trait]
pub trait DistributedLock: Send + Sync {
    async fn try_acquire(&self, name: &str, ttl: Duration) -> Result<Option<Box<dyn LockGuard>>, StateError>;

    async fn acquire(&self, name: &str, ttl: Duration, timeout: Duration) -> Result<Box<dyn LockGuard>, StateError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn _assert_dyn_lock_guard(_: &dyn LockGuard) {}
    fn _assert_dyn_distributed_lock(_: &dyn DistributedLock) {}
}
