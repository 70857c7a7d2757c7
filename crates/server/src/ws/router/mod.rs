//! Dispatch table from action kind to handler.
//!
//! Handlers validate and persist, then describe what the hub should do next:
//! which users gain a chatroom subscription and who receives the result.
//! The hub applies subscriptions before broadcasting, so new participants
//! see the action that added them.

mod chat;
mod chatrooms;
mod reserved;

pub use chat::{SendMessageHandler, ViewMessageHandler};
pub use chatrooms::{CreateGroupChatroomHandler, CreatePrivateChatroomHandler, UpdateGroupChatroomHandler};
pub use reserved::NotImplementedHandler;

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::ActionError;
use crate::queue::Origin;
use crate::store::Store;
use crate::ws::actions::{Action, ActionKind};

pub struct HandlerContext<'a> {
    pub store: &'a Store,
    pub origin: Option<Origin>,
}

impl HandlerContext<'_> {
    pub fn origin_user(&self) -> Option<i64> {
        self.origin.map(|o| o.user_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    pub user_id: i64,
    pub chatroom_id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Fanout {
    /// Same frame to every subscriber of the room.
    Room { chatroom_id: i64, action: Action },
    /// A separately built frame for each user.
    PerUser(Vec<(i64, Action)>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub subscriptions: Vec<Subscription>,
    pub fanout: Fanout,
}

impl Outcome {
    pub fn room(chatroom_id: i64, action: Action) -> Self {
        Self {
            subscriptions: Vec::new(),
            fanout: Fanout::Room {
                chatroom_id,
                action,
            },
        }
    }

    pub fn subscribing(mut self, chatroom_id: i64, user_ids: impl IntoIterator<Item = i64>) -> Self {
        self.subscriptions.extend(user_ids.into_iter().map(|user_id| Subscription {
            user_id,
            chatroom_id,
        }));
        self
    }
}

#[async_trait]
pub trait ActionHandler: Send + Sync {
    async fn handle(&self, ctx: &HandlerContext<'_>, action: Action) -> Result<Outcome, ActionError>;
}

pub struct Router {
    handlers: HashMap<ActionKind, Box<dyn ActionHandler>>,
}

impl Default for Router {
    fn default() -> Self {
        let mut router = Self::empty();
        router.register(ActionKind::SendMessage, SendMessageHandler);
        router.register(ActionKind::ViewMessage, ViewMessageHandler);
        router.register(ActionKind::CreatePrivateChatroom, CreatePrivateChatroomHandler);
        router.register(ActionKind::CreateGroupChatroom, CreateGroupChatroomHandler);
        router.register(ActionKind::UpdateGroupChatroom, UpdateGroupChatroomHandler);
        for kind in [
            ActionKind::EditMessage,
            ActionKind::DeleteMessage,
            ActionKind::ReactToMessage,
            ActionKind::DeleteGroupChatroom,
        ] {
            router.register(kind, NotImplementedHandler);
        }
        router
    }
}

impl Router {
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Replaces any handler already registered for `kind`.
    pub fn register(&mut self, kind: ActionKind, handler: impl ActionHandler + 'static) {
        self.handlers.insert(kind, Box::new(handler));
    }

    pub fn handles(&self, kind: ActionKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    pub async fn route(&self, ctx: &HandlerContext<'_>, action: Action) -> Result<Outcome, ActionError> {
        let kind = action.kind();
        match self.handlers.get(&kind) {
            Some(handler) => handler.handle(ctx, action).await,
            None => Err(ActionError::NotImplemented(kind)),
        }
    }
}

fn validation(reason: String) -> ActionError {
    ActionError::Validation(reason)
}

/// Handlers are registered per kind, so this only fires on a
/// misconfigured router.
fn wrong_kind(expected: ActionKind) -> ActionError {
    ActionError::Validation(format!("handler for {} received another action", expected))
}

/// Acting users must belong to the room they act on. Actions without an
/// origin are trusted.
async fn require_member(
    ctx: &HandlerContext<'_>,
    chatroom_id: i64,
    user_id: i64,
) -> Result<(), ActionError> {
    if ctx.origin.is_none() || ctx.store.is_participant(chatroom_id, user_id).await? {
        return Ok(());
    }
    Err(validation(format!(
        "user {} is not a participant of chatroom {}",
        user_id, chatroom_id
    )))
}

/// An omitted sender is the submitting user; a different one is rejected.
fn resolve_sender(sender_id: &mut i64, ctx: &HandlerContext<'_>) -> Result<(), ActionError> {
    if let Some(user_id) = ctx.origin_user() {
        if *sender_id == 0 {
            *sender_id = user_id;
        } else if *sender_id != user_id {
            return Err(validation(format!(
                "senderID {} does not match the connected user",
                sender_id
            )));
        }
    }
    parley_shared::validation::require_id("senderID", *sender_id).map_err(validation)
}
