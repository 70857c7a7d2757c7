use std::env;

use parley_shared::constants::QUEUE_POLL_INTERVAL_MS;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueueBackend {
    /// `action_queue` table in the main database; survives restarts.
    Sqlite,
    /// In-process channel; pending actions are lost on shutdown.
    Memory,
}

impl QueueBackend {
    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => QueueBackend::Memory,
            _ => QueueBackend::Sqlite,
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    pub queue_backend: QueueBackend,
    pub queue_poll_interval_ms: u64,
    pub session_cookie: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "./parley.db".into()),
            queue_backend: env::var("QUEUE_BACKEND")
                .map(|v| QueueBackend::parse(&v))
                .unwrap_or(QueueBackend::Sqlite),
            queue_poll_interval_ms: env::var("QUEUE_POLL_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(QUEUE_POLL_INTERVAL_MS),
            session_cookie: env::var("SESSION_COOKIE")
                .unwrap_or_else(|_| "parley_session".into()),
        }
    }
}
