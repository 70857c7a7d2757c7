mod lifecycle;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures::{SinkExt, StreamExt};
use parley_shared::constants::WS_PING_FRAME;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::middleware::auth::session_token;
use crate::models::AuthUser;
use crate::queue::Origin;
use crate::store::StoreError;
use crate::ws::actions::{Action, ActionKind};
use crate::ws::events::ServerFrame;
use crate::ws::gateway::{ClientId, HubHandle};
use crate::AppState;

/// WebSocket upgrade handler. Unauthenticated requests never upgrade.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let user = match extract_session(&state, &headers, &query).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({"error": "Not authenticated"})),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Session lookup failed during upgrade: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Database error"})),
            )
                .into_response();
        }
    };

    ws.on_upgrade(move |socket| handle_socket(socket, state, user))
}

/// `?token=` first, then bearer header, then the session cookie.
async fn extract_session(
    state: &AppState,
    headers: &HeaderMap,
    query: &HashMap<String, String>,
) -> Result<Option<AuthUser>, StoreError> {
    let token = query
        .get("token")
        .filter(|t| !t.is_empty())
        .cloned()
        .or_else(|| session_token(headers, &state.config.session_cookie));

    match token {
        Some(token) => state.store.resolve_session(&token).await,
        None => Ok(None),
    }
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, user: AuthUser) {
    let client_id = state.hub.next_client_id();
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    if let Err(e) = lifecycle::connect(&state, client_id, &user, tx.clone()).await {
        tracing::warn!("Client {} for user {} could not join: {}", client_id, user.id, e);
        let _ = ws_tx.send(Message::Close(None)).await;
        return;
    }

    // Task to forward messages from mpsc to WebSocket
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if ws_tx.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    let hub = state.hub.clone();
    let user_id = user.id;
    let mut recv_task = tokio::spawn(async move {
        while let Some(frame) = ws_rx.next().await {
            let msg = match frame {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::debug!("Read error on client {}: {}", client_id, e);
                    break;
                }
            };
            match msg {
                Message::Text(text) => {
                    let text: &str = &text;
                    handle_frame(&hub, &tx, client_id, user_id, text).await;
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    lifecycle::disconnect(&state, client_id, &user);
}

async fn handle_frame(
    hub: &HubHandle,
    reply: &mpsc::UnboundedSender<String>,
    client_id: ClientId,
    user_id: i64,
    text: &str,
) {
    if text.trim() == WS_PING_FRAME {
        return;
    }

    let action = match Action::decode(text) {
        Ok(action) => action,
        Err(e) => {
            tracing::debug!("Malformed frame from client {}: {}", client_id, e);
            send_error(reply, format!("malformed action: {}", e), None);
            return;
        }
    };

    let kind = action.kind();
    let origin = Origin {
        client_id: Some(client_id),
        user_id,
    };
    if let Err(e) = hub.publish(Some(origin), action).await {
        tracing::error!("Failed to enqueue {} from client {}: {}", kind, client_id, e);
        send_error(reply, format!("could not enqueue action: {}", e), Some(kind));
    }
}

fn send_error(
    reply: &mpsc::UnboundedSender<String>,
    error: String,
    kind: Option<ActionKind>,
) {
    if let Some(frame) = ServerFrame::error(error, kind).encode() {
        let _ = reply.send(frame);
    }
}
