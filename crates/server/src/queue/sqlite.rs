use async_trait::async_trait;
use sqlx::SqlitePool;
use std::time::Duration;
use tokio::sync::Notify;

use super::{ActionQueue, QueueEntry, QueueError};

/// Durable queue stored in the `action_queue` table.
///
/// Rows are removed only on ack, so anything pending at shutdown is
/// delivered again on the next start.
pub struct SqliteQueue {
    pool: SqlitePool,
    name: String,
    notify: Notify,
    poll_interval: Duration,
}

impl SqliteQueue {
    pub fn new(pool: SqlitePool, name: impl Into<String>, poll_interval: Duration) -> Self {
        Self {
            pool,
            name: name.into(),
            notify: Notify::new(),
            poll_interval,
        }
    }

    pub async fn pending(&self) -> Result<i64, QueueError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM action_queue WHERE queue = ?")
            .bind(&self.name)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn oldest(&self) -> Result<Option<QueueEntry>, QueueError> {
        let row = sqlx::query_as::<_, (i64, String)>(
            "SELECT id, payload FROM action_queue WHERE queue = ? ORDER BY id LIMIT 1",
        )
        .bind(&self.name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(id, body)| QueueEntry { id, body }))
    }
}

#[async_trait]
impl ActionQueue for SqliteQueue {
    async fn publish(&self, body: String) -> Result<(), QueueError> {
        sqlx::query("INSERT INTO action_queue (queue, payload) VALUES (?, ?)")
            .bind(&self.name)
            .bind(&body)
            .execute(&self.pool)
            .await?;
        self.notify.notify_one();
        Ok(())
    }

    async fn receive(&self) -> Result<QueueEntry, QueueError> {
        loop {
            if let Some(entry) = self.oldest().await? {
                return Ok(entry);
            }
            // Rows written by another process never notify, so poll as well.
            let _ = tokio::time::timeout(self.poll_interval, self.notify.notified()).await;
        }
    }

    async fn ack(&self, entry_id: i64) -> Result<(), QueueError> {
        sqlx::query("DELETE FROM action_queue WHERE id = ?")
            .bind(entry_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
