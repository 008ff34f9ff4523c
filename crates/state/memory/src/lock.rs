use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use alertgate_state::{DistributedLock, LockGuard, StateError};

struct Held {
    expires_at: Instant,
}

#[derive(Default)]
pub struct MemoryDistributedLock {
    locks: Arc<DashMap<String, Held>>,
}

impl MemoryDistributedLock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn try_insert(&self, name: &str, ttl: Duration) -> bool {
        let now = Instant::now();
        let mut acquired = false;
        self.locks
            .entry(name.to_string())
            .and_modify(|h| {
                if now >= h.expires_at {
                    h.expires_at = now + ttl;
                    acquired = true;
                }
            })
            .or_insert_with(|| {
                acquired = true;
                Held { expires_at: now + ttl }
            });
        acquired
    }
}

#[async_trait]
impl DistributedLock for MemoryDistributedLock {
    async fn try_acquire(&self, name: &str, ttl: Duration) -> Result<Option<Box<dyn LockGuard>>, StateError> {
        if self.try_insert(name, ttl) {
            Ok(Some(Box::new(MemoryLockGuard { name: name.to_string(), locks: self.locks.clone() })))
        } else {
            Ok(None)
        }
    }

    async fn acquire(&self, name: &str, ttl: Duration, timeout: Duration) -> Result<Box<dyn LockGuard>, StateError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(guard) = self.try_acquire(name, ttl).await? {
                return Ok(guard);
            }
            if Instant::now() >= deadline {
                return Err(StateError::LockTimeout);
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

struct MemoryLockGuard {
    name: String,
    locks: Arc<DashMap<String, Held>>,
}

#[async_trait]
impl LockGuard for MemoryLockGuard {
    async fn extend(&self, duration: Duration) -> Result<(), StateError> {
        match self.locks.get_mut(&self.name) {
            Some(mut h) => {
                h.expires_at = Instant::now() + duration;
                Ok(())
            }
            None => Err(StateError::LockNotHeld),
        }
    }

    async fn release(self: Box<Self>) -> Result<(), StateError> {
        self.locks.remove(&self.name);
        Ok(())
    }

    async fn is_held(&self) -> Result<bool, StateError> {
        Ok(self.locks.get(&self.name).is_some_and(|h| Instant::now() < h.expires_at))
    }
}
