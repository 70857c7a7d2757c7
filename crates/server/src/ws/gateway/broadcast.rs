use serde::Serialize;

use super::{Client, ClientId, Registry};
use crate::error::DeliveryError;

/// Result of one fan-out. Failed clients stay registered; their own
/// connection task removes them once the socket closes.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failed: Vec<ClientId>,
}

/// Serialize an outbound frame once for the whole fan-out.
pub fn encode_frame<T: Serialize>(frame: &T) -> Option<String> {
    match serde_json::to_string(frame) {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::error!("Failed to encode outbound frame: {}", e);
            None
        }
    }
}

impl Registry {
    /// Every client subscribed to the chatroom gets the frame.
    pub fn broadcast_room(&self, chatroom_id: i64, frame: &str) -> DeliveryReport {
        fan_out(self.subscribers_of(chatroom_id), frame)
    }

    /// Every live connection of one user gets the frame.
    pub fn send_to_user(&self, user_id: i64, frame: &str) -> DeliveryReport {
        fan_out(self.clients_of_user(user_id), frame)
    }

    pub fn send_to(&self, client_id: ClientId, frame: &str) -> Result<(), DeliveryError> {
        let client = self
            .get(client_id)
            .ok_or(DeliveryError::UnknownClient(client_id))?;
        client.deliver(frame.to_string())
    }
}

fn fan_out<'a>(clients: impl Iterator<Item = &'a Client>, frame: &str) -> DeliveryReport {
    let mut report = DeliveryReport::default();
    for client in clients {
        match client.deliver(frame.to_string()) {
            Ok(()) => report.delivered += 1,
            Err(e) => {
                tracing::warn!("Delivery to user {} failed: {}", client.user_id, e);
                report.failed.push(client.id);
            }
        }
    }
    report
}
