//! In-memory queue for testing and development.
//!
//! Five per-priority FIFO sub-queues plus a dead-letter list, polled
//! low-to-high the way the Redis backend's `BRPOP` key order does it.
//! Not durable; data is lost on restart.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::error::QueueError;
use crate::traits::JobQueue;
use crate::types::Priority;

/// In-memory priority channels with a blocking dequeue.
pub struct MemoryQueue {
    levels: [Mutex<VecDeque<String>>; 5],
    failed: Mutex<Vec<String>>,
    notify: Notify,
}

impl Default for MemoryQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self {
            levels: std::array::from_fn(|_| Mutex::new(VecDeque::new())),
            failed: Mutex::new(Vec::new()),
            notify: Notify::new(),
        }
    }

    /// Enqueue a raw payload on one priority channel.
    pub fn push(&self, priority: Priority, raw: impl Into<String>) {
        self.levels[priority.index()]
            .lock()
            .unwrap()
            .push_back(raw.into());
        self.notify.notify_one();
    }

    /// Snapshot of the dead-letter channel.
    pub fn failed(&self) -> Vec<String> {
        self.failed.lock().unwrap().clone()
    }

    /// Jobs currently queued across all channels.
    pub fn len(&self) -> usize {
        self.levels.iter().map(|l| l.lock().unwrap().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn try_pop(&self) -> Option<String> {
        for level in &self.levels {
            if let Some(raw) = level.lock().unwrap().pop_front() {
                return Some(raw);
            }
        }
        None
    }
}

#[async_trait]
impl JobQueue for MemoryQueue {
    async fn dequeue(&self) -> Result<String, QueueError> {
        loop {
            // Register interest before checking so a push between the
            // check and the await still wakes us.
            let notified = self.notify.notified();
            if let Some(raw) = self.try_pop() {
                return Ok(raw);
            }
            notified.await;
        }
    }

    async fn dead_letter(&self, raw: &str) -> Result<(), QueueError> {
        self.failed.lock().unwrap().push(raw.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn p(n: i64) -> Priority {
        Priority::try_from(n).unwrap()
    }

    #[tokio::test]
    async fn fifo_within_one_level() {
        let q = MemoryQueue::new();
        q.push(p(3), "a");
        q.push(p(3), "b");
        q.push(p(3), "c");

        assert_eq!(q.dequeue().await.unwrap(), "a");
        assert_eq!(q.dequeue().await.unwrap(), "b");
        assert_eq!(q.dequeue().await.unwrap(), "c");
    }

    #[tokio::test]
    async fn lower_number_drains_first() {
        let q = MemoryQueue::new();
        q.push(p(5), "low");
        q.push(p(1), "high");
        q.push(p(3), "mid");

        assert_eq!(q.dequeue().await.unwrap(), "high");
        assert_eq!(q.dequeue().await.unwrap(), "mid");
        assert_eq!(q.dequeue().await.unwrap(), "low");
    }

    #[tokio::test]
    async fn dequeue_blocks_until_push() {
        let q = Arc::new(MemoryQueue::new());

        let waiter = {
            let q = Arc::clone(&q);
            tokio::spawn(async move { q.dequeue().await.unwrap() })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished(), "dequeue returned with nothing queued");

        q.push(p(2), "late");
        assert_eq!(waiter.await.unwrap(), "late");
    }

    #[tokio::test]
    async fn dead_letter_is_appended_verbatim() {
        let q = MemoryQueue::new();
        q.dead_letter("{bad json").await.unwrap();
        q.dead_letter("second").await.unwrap();
        assert_eq!(q.failed(), vec!["{bad json".to_string(), "second".to_string()]);
    }
}
