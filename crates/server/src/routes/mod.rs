pub mod actions;
pub mod chatrooms;

use crate::ws;
use crate::AppState;
use axum::{routing::{get, post}, Router};
use std::sync::Arc;

pub fn build_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Chatrooms
        .route("/chatrooms", get(chatrooms::list_chatrooms))
        .route("/chatrooms/{chatroomId}", get(chatrooms::get_chatroom))
        .route("/chatrooms/{chatroomId}/messages", get(chatrooms::list_messages))
        // Actions
        .route("/actions", post(actions::submit_action));

    Router::new()
        .nest("/api", api_routes)
        .route("/gateway", get(ws::handler::ws_handler))
        .with_state(state)
}
