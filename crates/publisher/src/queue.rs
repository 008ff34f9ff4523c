//! Three-tier strict-priority bounded queue for [`PublishJob`]s.
//!
//! Dequeue always drains `critical` before `high` before `normal`; within a
//! tier, FIFO. Each tier has its own bounded capacity fixed at construction;
//! a job's tier is fixed by its `priority` field and never changes across
//! retries.

use std::collections::VecDeque;
use std::sync::Mutex;

use alertgate_core::{Priority, PublishJob};
use tokio::sync::Notify;

#[derive(Debug, thiserror::Error)]
#[error("priority queue tier {priority:?} is full (capacity {capacity})")]
pub struct QueueFullError {
    pub priority: Priority,
    pub capacity: usize,
}

struct Tier {
    jobs: Mutex<VecDeque<PublishJob>>,
    capacity: usize,
}

impl Tier {
    fn new(capacity: usize) -> Self {
        Self { jobs: Mutex::new(VecDeque::new()), capacity }
    }

    fn push(&self, job: PublishJob) -> Result<(), PublishJob> {
        let mut guard = self.jobs.lock().expect("queue mutex poisoned");
        if guard.len() >= self.capacity {
            return Err(job);
        }
        guard.push_back(job);
        Ok(())
    }

    fn pop(&self) -> Option<PublishJob> {
        self.jobs.lock().expect("queue mutex poisoned").pop_front()
    }

    fn len(&self) -> usize {
        self.jobs.lock().expect("queue mutex poisoned").len()
    }
}

/// Bounded, three-tier strict-priority work queue.
pub struct PriorityQueue {
    critical: Tier,
    high: Tier,
    normal: Tier,
    notify: Notify,
}

impl PriorityQueue {
    #[must_use]
    pub fn new(capacity_per_tier: usize) -> Self {
        Self {
            critical: Tier::new(capacity_per_tier),
            high: Tier::new(capacity_per_tier),
            normal: Tier::new(capacity_per_tier),
            notify: Notify::new(),
        }
    }

    fn tier(&self, priority: Priority) -> &Tier {
        match priority {
            Priority::Critical => &self.critical,
            Priority::High => &self.high,
            Priority::Normal => &self.normal,
        }
    }

    /// Enqueue a job into the tier fixed by its priority. Fails with
    /// [`QueueFullError`] if that tier is at capacity; the caller is
    /// expected to route the job straight to the dead-letter queue.
    pub fn enqueue(&self, job: PublishJob) -> Result<(), QueueFullError> {
        let priority = job.priority;
        let capacity = self.tier(priority).capacity;
        self.tier(priority).push(job).map_err(|_| QueueFullError { priority, capacity })?;
        self.notify.notify_one();
        Ok(())
    }

    /// Dequeue the next job, honoring strict tier priority. `O(1)`.
    #[must_use]
    pub fn dequeue(&self) -> Option<PublishJob> {
        self.critical.pop().or_else(|| self.high.pop()).or_else(|| self.normal.pop())
    }

    /// Wait until a job is available, then dequeue it. Used by the
    /// background retry worker; never used on the synchronous ingestion
    /// path.
    pub async fn dequeue_wait(&self) -> PublishJob {
        loop {
            if let Some(job) = self.dequeue() {
                return job;
            }
            self.notify.notified().await;
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.critical.len() + self.high.len() + self.normal.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
