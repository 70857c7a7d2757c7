use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::Notify;

use super::{ActionQueue, QueueEntry, QueueError};

/// In-process FIFO. Pending entries do not survive a restart.
pub struct MemoryQueue {
    inner: Mutex<MemoryInner>,
    notify: Notify,
}

#[derive(Default)]
struct MemoryInner {
    next_id: i64,
    entries: VecDeque<QueueEntry>,
}

impl Default for MemoryQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MemoryInner::default()),
            notify: Notify::new(),
        }
    }

    pub fn pending(&self) -> usize {
        self.inner.lock().map(|inner| inner.entries.len()).unwrap_or(0)
    }

    fn front(&self) -> Result<Option<QueueEntry>, QueueError> {
        let inner = self.inner.lock().map_err(|_| QueueError::Closed)?;
        Ok(inner.entries.front().cloned())
    }
}

#[async_trait]
impl ActionQueue for MemoryQueue {
    async fn publish(&self, body: String) -> Result<(), QueueError> {
        {
            let mut inner = self.inner.lock().map_err(|_| QueueError::Closed)?;
            inner.next_id += 1;
            let id = inner.next_id;
            inner.entries.push_back(QueueEntry { id, body });
        }
        self.notify.notify_one();
        Ok(())
    }

    async fn receive(&self) -> Result<QueueEntry, QueueError> {
        loop {
            if let Some(entry) = self.front()? {
                return Ok(entry);
            }
            self.notify.notified().await;
        }
    }

    async fn ack(&self, entry_id: i64) -> Result<(), QueueError> {
        let mut inner = self.inner.lock().map_err(|_| QueueError::Closed)?;
        inner.entries.retain(|entry| entry.id != entry_id);
        Ok(())
    }
}
