use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use parley_shared::validation::parse_page_param;
use serde::Deserialize;
use std::sync::Arc;

use crate::models::AuthUser;
use crate::store::{Page, StoreError};
use crate::AppState;

#[derive(Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<String>,
}

impl PageQuery {
    fn page(&self) -> Page {
        Page::new(
            parse_page_param(self.page.as_deref()),
            parse_page_param(self.page_size.as_deref()),
        )
    }
}

fn not_found() -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({"error": "Chatroom not found"})),
    )
        .into_response()
}

fn store_failure(e: StoreError) -> axum::response::Response {
    tracing::error!("Chatroom query failed: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({"error": "Database error"})),
    )
        .into_response()
}

/// GET /api/chatrooms
pub async fn list_chatrooms(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(query): Query<PageQuery>,
) -> impl IntoResponse {
    match state.store.chatrooms_by_user(user.id, query.page()).await {
        Ok(chatrooms) => Json(chatrooms).into_response(),
        Err(e) => store_failure(e),
    }
}

/// GET /api/chatrooms/:chatroomId
pub async fn get_chatroom(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(chatroom_id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> impl IntoResponse {
    match state
        .store
        .chatroom_for_user(chatroom_id, user.id, query.page())
        .await
    {
        Ok(Some(view)) => Json(view).into_response(),
        Ok(None) => not_found(),
        Err(e) => store_failure(e),
    }
}

/// GET /api/chatrooms/:chatroomId/messages
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(chatroom_id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> impl IntoResponse {
    match state.store.is_participant(chatroom_id, user.id).await {
        Ok(true) => {}
        Ok(false) => return not_found(),
        Err(e) => return store_failure(e),
    }

    match state
        .store
        .messages_by_chatroom(chatroom_id, query.page())
        .await
    {
        Ok(messages) => Json(messages).into_response(),
        Err(e) => store_failure(e),
    }
}
