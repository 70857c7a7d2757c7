#![allow(dead_code)]

pub mod ws_helpers;

use axum::Router;
use parley_server::{
    config::{Config, QueueBackend},
    db,
    models::ChatMessage,
    routes,
    store::Store,
    AppState,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;

/// Create an in-memory SQLite pool with schema applied.
pub async fn setup_test_db() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("Failed to create in-memory SQLite pool");

    db::apply_schema(&pool).await.unwrap();
    pool
}

pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".into(),
        port: 0,
        database_path: ":memory:".into(),
        queue_backend: QueueBackend::Sqlite,
        queue_poll_interval_ms: 50,
        session_cookie: "parley_session".into(),
    }
}

/// Shared state with the hub already running.
pub fn create_test_state(pool: SqlitePool) -> Arc<AppState> {
    AppState::start(pool, test_config())
}

/// Build a test Axum app with the given pool.
pub fn create_test_app(pool: SqlitePool) -> Router {
    routes::build_router(create_test_state(pool))
}

/// Create a test user directly in the database. Returns (user_id, session_token).
pub async fn create_test_user(pool: &SqlitePool, email: &str, nickname: &str) -> (i64, String) {
    let user_id = sqlx::query("INSERT INTO users (nickname, email, avatar_url) VALUES (?, ?, ?)")
        .bind(nickname)
        .bind(email)
        .bind(format!("https://avatars.test/{}.png", nickname))
        .execute(pool)
        .await
        .unwrap()
        .last_insert_rowid();

    let session_token = uuid::Uuid::new_v4().to_string();
    let expires_at = (chrono::Utc::now() + chrono::Duration::days(30)).to_rfc3339();

    sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES (?, ?, ?)")
        .bind(&session_token)
        .bind(user_id)
        .bind(&expires_at)
        .execute(pool)
        .await
        .unwrap();

    (user_id, session_token)
}

pub fn message(sender_id: i64, text: &str) -> ChatMessage {
    ChatMessage {
        sender_id,
        text: text.into(),
        ..Default::default()
    }
}

/// Private room between two users, opened by `a` with `first_text`.
pub async fn create_private_room(pool: &SqlitePool, a: i64, b: i64, first_text: &str) -> i64 {
    let store = Store::new(pool.clone());
    let (chatroom, _) = store
        .create_private_chatroom(a, b, &message(a, first_text))
        .await
        .unwrap();
    chatroom.id
}

pub async fn count_rows(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap()
}
