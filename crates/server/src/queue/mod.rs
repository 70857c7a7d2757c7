//! Hand-off between connection read loops and the single hub consumer.
//!
//! Entries are delivered oldest first and stay pending until acknowledged,
//! so an entry that was received but not acked is delivered again.

mod memory;
mod sqlite;

pub use memory::MemoryQueue;
pub use sqlite::SqliteQueue;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ws::actions::Action;
use crate::ws::gateway::ClientId;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("failed to encode queued action: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("queue backend failure: {0}")]
    Backend(#[from] sqlx::Error),
    #[error("queue is closed")]
    Closed,
}

/// Who submitted an action. `client_id` is absent for HTTP submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Origin {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<ClientId>,
    pub user_id: i64,
}

/// What actually travels through the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedAction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Origin>,
    pub action: Action,
}

impl QueuedAction {
    pub fn encode(&self) -> Result<String, QueueError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    pub id: i64,
    pub body: String,
}

#[async_trait]
pub trait ActionQueue: Send + Sync {
    async fn publish(&self, body: String) -> Result<(), QueueError>;

    /// Waits for the oldest pending entry. Dropping the future before it
    /// resolves loses nothing.
    async fn receive(&self) -> Result<QueueEntry, QueueError>;

    async fn ack(&self, entry_id: i64) -> Result<(), QueueError>;
}
