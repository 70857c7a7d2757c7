use thiserror::Error;

use crate::store::StoreError;
use crate::ws::actions::ActionKind;
use crate::ws::gateway::ClientId;

/// Why an action did not make it to broadcast.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("invalid action: {0}")]
    Validation(String),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
    #[error("persistence failure: {0}")]
    Persistence(sqlx::Error),
    #[error("{0} is not implemented")]
    NotImplemented(ActionKind),
}

impl From<StoreError> for ActionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => ActionError::NotFound { entity, id },
            StoreError::Persistence(e) => ActionError::Persistence(e),
        }
    }
}

/// A single client's write failed. Isolated to that client.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("client {0} is no longer reachable")]
    Closed(ClientId),
    #[error("client {0} is not registered")]
    UnknownClient(ClientId),
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("client {0} is already registered")]
    AlreadyRegistered(ClientId),
    #[error("hub is not running")]
    HubStopped,
}
