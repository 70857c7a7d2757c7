pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod queue;
pub mod routes;
pub mod store;
pub mod ws;

use config::{Config, QueueBackend};
use parley_shared::constants::ACTION_QUEUE_NAME;
use queue::{ActionQueue, MemoryQueue, SqliteQueue};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use store::Store;
use ws::gateway::{Hub, HubHandle};

pub struct AppState {
    pub store: Store,
    pub config: Config,
    pub hub: HubHandle,
}

impl AppState {
    /// Builds the configured queue and starts the hub consumer task.
    /// Must be called inside a tokio runtime.
    pub fn start(pool: SqlitePool, config: Config) -> Arc<Self> {
        let store = Store::new(pool.clone());
        let queue: Arc<dyn ActionQueue> = match config.queue_backend {
            QueueBackend::Sqlite => Arc::new(SqliteQueue::new(
                pool,
                ACTION_QUEUE_NAME,
                Duration::from_millis(config.queue_poll_interval_ms),
            )),
            QueueBackend::Memory => Arc::new(MemoryQueue::new()),
        };

        let (hub, handle) = Hub::new(store.clone(), queue);
        hub.spawn();

        Arc::new(Self {
            store,
            config,
            hub: handle,
        })
    }
}
