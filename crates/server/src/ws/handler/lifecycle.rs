use thiserror::Error;
use tokio::sync::mpsc;

use crate::error::RegistryError;
use crate::models::AuthUser;
use crate::store::{Page, StoreError};
use crate::ws::events::ServerFrame;
use crate::ws::gateway::{Client, ClientId};
use crate::AppState;

#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("hydration failed: {0}")]
    Hydrate(#[from] StoreError),
    #[error(transparent)]
    Register(#[from] RegistryError),
}

/// Load the user's chatrooms, queue the initial-state frame and register
/// the client subscribed to every one of them.
pub async fn connect(
    state: &AppState,
    client_id: ClientId,
    user: &AuthUser,
    tx: mpsc::UnboundedSender<String>,
) -> Result<(), ConnectError> {
    let chatrooms = state.store.chatrooms_by_user(user.id, Page::first()).await?;
    let subscriptions: Vec<i64> = chatrooms.iter().map(|view| view.chatroom.id).collect();

    // Queued ahead of registration so it is always the first frame out.
    if let Some(frame) = (ServerFrame::InitialState { chatrooms }).encode() {
        let _ = tx.send(frame);
    }

    let client = Client::new(client_id, user.id, tx, subscriptions);
    state.hub.register(client).await?;

    tracing::info!("User {} connected as client {}", user.id, client_id);
    Ok(())
}

pub fn disconnect(state: &AppState, client_id: ClientId, user: &AuthUser) {
    state.hub.unregister(client_id);
    tracing::info!("User {} disconnected (client {})", user.id, client_id);
}
