//! Connection registry. Owned by the hub consumer loop, so nothing here
//! locks; every mutation goes through the hub.

mod broadcast;
mod hub;

pub use broadcast::{encode_frame, DeliveryReport};
pub use hub::{ClientSnapshot, Hub, HubHandle};

use std::collections::{HashMap, HashSet};
use tokio::sync::mpsc;

use crate::error::{DeliveryError, RegistryError};

pub type ClientId = u64;

pub struct Client {
    pub id: ClientId,
    pub user_id: i64,
    tx: mpsc::UnboundedSender<String>,
    subscriptions: HashSet<i64>,
}

impl Client {
    pub fn new(
        id: ClientId,
        user_id: i64,
        tx: mpsc::UnboundedSender<String>,
        subscriptions: impl IntoIterator<Item = i64>,
    ) -> Self {
        Self {
            id,
            user_id,
            tx,
            subscriptions: subscriptions.into_iter().collect(),
        }
    }

    pub fn subscriptions(&self) -> &HashSet<i64> {
        &self.subscriptions
    }

    pub fn is_subscribed(&self, chatroom_id: i64) -> bool {
        self.subscriptions.contains(&chatroom_id)
    }

    /// Returns false if the client was already subscribed.
    pub fn subscribe(&mut self, chatroom_id: i64) -> bool {
        self.subscriptions.insert(chatroom_id)
    }

    /// Queue one outbound frame on this client's socket writer.
    pub fn deliver(&self, frame: String) -> Result<(), DeliveryError> {
        self.tx.send(frame).map_err(|_| DeliveryError::Closed(self.id))
    }
}

#[derive(Default)]
pub struct Registry {
    clients: HashMap<ClientId, Client>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, client: Client) -> Result<(), RegistryError> {
        if self.clients.contains_key(&client.id) {
            return Err(RegistryError::AlreadyRegistered(client.id));
        }
        tracing::debug!(
            "Registered client {} for user {} ({} chatrooms)",
            client.id,
            client.user_id,
            client.subscriptions.len()
        );
        self.clients.insert(client.id, client);
        Ok(())
    }

    /// Removing an unknown client is a no-op.
    pub fn unregister(&mut self, client_id: ClientId) -> Option<Client> {
        let client = self.clients.remove(&client_id)?;
        tracing::debug!("Unregistered client {} for user {}", client_id, client.user_id);
        Some(client)
    }

    pub fn get(&self, client_id: ClientId) -> Option<&Client> {
        self.clients.get(&client_id)
    }

    pub fn contains(&self, client_id: ClientId) -> bool {
        self.clients.contains_key(&client_id)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn subscribers_of(&self, chatroom_id: i64) -> impl Iterator<Item = &Client> {
        self.clients
            .values()
            .filter(move |client| client.is_subscribed(chatroom_id))
    }

    pub fn clients_of_user(&self, user_id: i64) -> impl Iterator<Item = &Client> {
        self.clients
            .values()
            .filter(move |client| client.user_id == user_id)
    }

    /// Subscribe every live connection of `user_id`. Returns how many
    /// connections gained the subscription.
    pub fn subscribe_user(&mut self, user_id: i64, chatroom_id: i64) -> usize {
        self.clients
            .values_mut()
            .filter(|client| client.user_id == user_id)
            .map(|client| client.subscribe(chatroom_id))
            .filter(|added| *added)
            .count()
    }
}
