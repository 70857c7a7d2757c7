use async_trait::async_trait;
use parley_shared::validation::{require_id, validate_message_body};

use super::{
    require_member, resolve_sender, validation, wrong_kind, ActionHandler, HandlerContext, Outcome,
};
use crate::error::ActionError;
use crate::ws::actions::{Action, ActionKind, SendMessage, ViewMessage};

pub struct SendMessageHandler;

#[async_trait]
impl ActionHandler for SendMessageHandler {
    async fn handle(&self, ctx: &HandlerContext<'_>, action: Action) -> Result<Outcome, ActionError> {
        let Action::SendMessage(SendMessage { mut message }) = action else {
            return Err(wrong_kind(ActionKind::SendMessage));
        };

        require_id("chatroomID", message.chatroom_id).map_err(validation)?;
        resolve_sender(&mut message.sender_id, ctx)?;
        validate_message_body(&message.text, message.attachment()).map_err(validation)?;
        require_member(ctx, message.chatroom_id, message.sender_id).await?;

        let saved = ctx.store.add_message(message.chatroom_id, &message).await?;
        tracing::debug!(
            "Stored message {} in chatroom {} from user {}",
            saved.id,
            saved.chatroom_id,
            saved.sender_id
        );

        Ok(Outcome::room(
            saved.chatroom_id,
            Action::SendMessage(SendMessage { message: saved }),
        ))
    }
}

pub struct ViewMessageHandler;

#[async_trait]
impl ActionHandler for ViewMessageHandler {
    async fn handle(&self, ctx: &HandlerContext<'_>, action: Action) -> Result<Outcome, ActionError> {
        let Action::ViewMessage(view) = action else {
            return Err(wrong_kind(ActionKind::ViewMessage));
        };

        require_id("viewerID", view.viewer_id).map_err(validation)?;
        require_id("messageID", view.message_id).map_err(validation)?;
        require_id("chatroomID", view.chatroom_id).map_err(validation)?;
        if let Some(user_id) = ctx.origin_user() {
            if user_id != view.viewer_id {
                return Err(validation(format!(
                    "viewerID {} does not match the connected user",
                    view.viewer_id
                )));
            }
        }

        if ctx.origin.is_some() {
            let target = ctx.store.message(view.message_id).await?;
            require_member(ctx, target.chatroom_id, view.viewer_id).await?;
        }

        let message = ctx.store.mark_viewed(view.message_id).await?;
        if message.chatroom_id != view.chatroom_id {
            tracing::debug!(
                "Message {} lives in chatroom {}, not {}",
                message.id,
                message.chatroom_id,
                view.chatroom_id
            );
        }

        // The room the message actually lives in wins.
        let chatroom_id = message.chatroom_id;
        Ok(Outcome::room(
            chatroom_id,
            Action::ViewMessage(ViewMessage {
                viewer_id: view.viewer_id,
                message_id: message.id,
                chatroom_id,
                chat_message: Some(message),
            }),
        ))
    }
}
