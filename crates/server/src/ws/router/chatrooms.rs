use async_trait::async_trait;
use parley_shared::constants::PRIVATE_CHATROOM_PARTICIPANTS;
use parley_shared::validation::{require_id, validate_group_name, validate_message_body};

use super::{
    resolve_sender, validation, wrong_kind, ActionHandler, Fanout, HandlerContext, Outcome,
    Subscription,
};
use crate::error::ActionError;
use crate::models::{Chatroom, ChatroomView};
use crate::ws::actions::{Action, ActionKind, CreatePrivateChatroom, GroupChatroom};

fn require_participants(ids: &[i64]) -> Result<(), ActionError> {
    ids.iter()
        .try_for_each(|id| require_id("participant id", *id))
        .map_err(validation)
}

fn member_ids(chatroom: &Chatroom) -> Vec<i64> {
    chatroom.participants.iter().map(|p| p.id).collect()
}

pub struct CreatePrivateChatroomHandler;

#[async_trait]
impl ActionHandler for CreatePrivateChatroomHandler {
    async fn handle(&self, ctx: &HandlerContext<'_>, action: Action) -> Result<Outcome, ActionError> {
        let Action::CreatePrivateChatroom(payload) = action else {
            return Err(wrong_kind(ActionKind::CreatePrivateChatroom));
        };

        let ids = payload.participant_ids();
        if ids.len() != PRIVATE_CHATROOM_PARTICIPANTS {
            return Err(validation(format!(
                "a private chatroom needs exactly {} participants",
                PRIVATE_CHATROOM_PARTICIPANTS
            )));
        }
        require_participants(&ids)?;
        if ids[0] == ids[1] {
            return Err(validation("participants must be two different users".into()));
        }

        let mut message = payload.chat_message;
        resolve_sender(&mut message.sender_id, ctx)?;
        if !ids.contains(&message.sender_id) {
            return Err(validation(format!(
                "sender {} is not a participant",
                message.sender_id
            )));
        }
        validate_message_body(&message.text, message.attachment()).map_err(validation)?;

        let (chatroom, first) = ctx
            .store
            .create_private_chatroom(ids[0], ids[1], &message)
            .await?;
        tracing::info!(
            "Private chatroom {} opened between users {} and {}",
            chatroom.id,
            ids[0],
            ids[1]
        );

        let members = member_ids(&chatroom);
        let mut deliveries = Vec::with_capacity(members.len());
        for &user_id in &members {
            let unread = ctx.store.unread_count(chatroom.id, user_id).await?;
            let view = ChatroomView::new(chatroom.clone(), user_id, unread);
            deliveries.push((
                user_id,
                Action::CreatePrivateChatroom(CreatePrivateChatroom::personalized(&view, &first)),
            ));
        }

        Ok(Outcome {
            subscriptions: members
                .iter()
                .map(|&user_id| Subscription {
                    user_id,
                    chatroom_id: chatroom.id,
                })
                .collect(),
            fanout: Fanout::PerUser(deliveries),
        })
    }
}

pub struct CreateGroupChatroomHandler;

#[async_trait]
impl ActionHandler for CreateGroupChatroomHandler {
    async fn handle(&self, ctx: &HandlerContext<'_>, action: Action) -> Result<Outcome, ActionError> {
        let Action::CreateGroupChatroom(payload) = action else {
            return Err(wrong_kind(ActionKind::CreateGroupChatroom));
        };

        validate_group_name(&payload.group_name).map_err(validation)?;
        let ids = payload.participant_ids();
        if ids.is_empty() {
            return Err(validation("a group chatroom needs at least one participant".into()));
        }
        require_participants(&ids)?;

        let chatroom = ctx.store.create_group_chatroom(&payload.group_name, &ids).await?;
        tracing::info!(
            "Group chatroom {} created with {} participants",
            chatroom.id,
            chatroom.participants.len()
        );

        Ok(Outcome::room(
            chatroom.id,
            Action::CreateGroupChatroom(GroupChatroom::from_chatroom(&chatroom)),
        )
        .subscribing(chatroom.id, member_ids(&chatroom)))
    }
}

/// Renames a group and adds participants. Nobody is removed.
pub struct UpdateGroupChatroomHandler;

#[async_trait]
impl ActionHandler for UpdateGroupChatroomHandler {
    async fn handle(&self, ctx: &HandlerContext<'_>, action: Action) -> Result<Outcome, ActionError> {
        let Action::UpdateGroupChatroom(payload) = action else {
            return Err(wrong_kind(ActionKind::UpdateGroupChatroom));
        };

        require_id("chatroomID", payload.chatroom_id).map_err(validation)?;
        let ids = payload.participant_ids();
        let renaming = !payload.group_name.trim().is_empty();
        if !renaming && ids.is_empty() {
            return Err(validation("nothing to update: give a groupName or participants".into()));
        }
        if renaming {
            validate_group_name(&payload.group_name).map_err(validation)?;
        }
        require_participants(&ids)?;

        let chatroom = ctx
            .store
            .update_group_chatroom(payload.chatroom_id, &payload.group_name, &ids)
            .await?;

        Ok(Outcome::room(
            chatroom.id,
            Action::UpdateGroupChatroom(GroupChatroom::from_chatroom(&chatroom)),
        )
        .subscribing(chatroom.id, member_ids(&chatroom)))
    }
}
