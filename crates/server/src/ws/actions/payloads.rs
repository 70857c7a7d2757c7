use serde::{Deserialize, Serialize};

use crate::models::{ChatMessage, Chatroom, ChatroomView, UserSummary};

/// On the wire the payload is the chat message itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SendMessage {
    pub message: ChatMessage,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewMessage {
    #[serde(rename = "viewerID")]
    pub viewer_id: i64,
    #[serde(rename = "messageID")]
    pub message_id: i64,
    #[serde(rename = "chatroomID")]
    pub chatroom_id: i64,
    /// Filled in with the updated row before broadcasting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_message: Option<ChatMessage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditMessage {
    #[serde(rename = "messageID")]
    pub message_id: i64,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteMessage {
    #[serde(rename = "messageID")]
    pub message_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactToMessage {
    #[serde(rename = "messageID")]
    pub message_id: i64,
    pub reaction: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteGroupChatroom {
    #[serde(rename = "chatroomID")]
    pub chatroom_id: i64,
}

/// Payload shared by group creation and group update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GroupChatroom {
    #[serde(rename = "chatroomID")]
    pub chatroom_id: i64,
    pub group_name: String,
    pub participants: Vec<UserSummary>,
    pub is_group: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl GroupChatroom {
    pub fn participant_ids(&self) -> Vec<i64> {
        self.participants.iter().map(|p| p.id).collect()
    }

    /// Outbound form carrying the persisted room.
    pub fn from_chatroom(chatroom: &Chatroom) -> Self {
        Self {
            chatroom_id: chatroom.id,
            group_name: chatroom.group_name.clone().unwrap_or_default(),
            participants: chatroom.participants.clone(),
            is_group: chatroom.is_group,
            created_at: Some(chatroom.created_at.clone()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreatePrivateChatroom {
    pub participants: Vec<UserSummary>,
    pub chat_message: ChatMessage,

    // Filled in per recipient on the way out.
    #[serde(rename = "chatroomID", skip_serializing_if = "Option::is_none")]
    pub chatroom_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chatroom_name: Option<String>,
    #[serde(rename = "chatroomPictureURL", skip_serializing_if = "Option::is_none")]
    pub chatroom_picture_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unread_count: Option<i64>,
    #[serde(rename = "userID", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

impl CreatePrivateChatroom {
    pub fn participant_ids(&self) -> Vec<i64> {
        self.participants.iter().map(|p| p.id).collect()
    }

    /// The payload one participant receives after the room was persisted.
    pub fn personalized(view: &ChatroomView, first_message: &ChatMessage) -> Self {
        Self {
            participants: view.chatroom.participants.clone(),
            chat_message: first_message.clone(),
            chatroom_id: Some(view.chatroom.id),
            chatroom_name: Some(view.chatroom_name.clone()),
            chatroom_picture_url: view.chatroom_picture_url.clone(),
            unread_count: Some(view.unread_count),
            user_id: Some(view.user_id),
        }
    }
}
