//! Persistence gateway over the chat tables.
//!
//! Every multi-statement write runs in a single transaction; dropping the
//! transaction on an early `?` return rolls it back.

mod chatrooms;
mod messages;
mod sessions;

use parley_shared::validation::{normalize_page, normalize_page_size};
use sqlx::SqlitePool;
use thiserror::Error;

pub(crate) const MESSAGE_COLUMNS: &str =
    "id, chatroom_id, sender_user_id, text, attachment_url, timestamp, viewed, edited, deleted";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
    #[error("persistence failure: {0}")]
    Persistence(#[from] sqlx::Error),
}

/// Window into a chatroom's message history, counted from the newest message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub page_size: i64,
}

impl Page {
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        Self {
            page: normalize_page(page),
            page_size: normalize_page_size(page_size),
        }
    }

    pub fn first() -> Self {
        Self::new(None, None)
    }

    /// Saturates instead of overflowing; a window past the end is just empty.
    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::first()
    }
}

#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Drops repeated ids, keeping first-seen order.
pub(crate) fn unique_ids(ids: &[i64]) -> Vec<i64> {
    let mut seen = std::collections::HashSet::new();
    ids.iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect()
}
