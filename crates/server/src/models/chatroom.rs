use serde::{Deserialize, Serialize};

use super::{ChatMessage, UserSummary};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ChatroomRow {
    pub id: i64,
    pub is_group: bool,
    pub group_name: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chatroom {
    pub id: i64,
    pub is_group: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    pub created_at: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub participants: Vec<UserSummary>,
}

impl From<ChatroomRow> for Chatroom {
    fn from(row: ChatroomRow) -> Self {
        Self {
            id: row.id,
            is_group: row.is_group,
            group_name: row.group_name.filter(|name| !name.is_empty()),
            created_at: row.created_at,
            messages: Vec::new(),
            participants: Vec::new(),
        }
    }
}

/// A chatroom as one participant sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatroomView {
    #[serde(flatten)]
    pub chatroom: Chatroom,
    #[serde(rename = "userID")]
    pub user_id: i64,
    pub unread_count: i64,
    pub chatroom_name: String,
    #[serde(
        rename = "chatroomPictureURL",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub chatroom_picture_url: Option<String>,
}

impl ChatroomView {
    pub fn new(chatroom: Chatroom, user_id: i64, unread_count: i64) -> Self {
        let (chatroom_name, chatroom_picture_url) = display_identity(&chatroom, user_id);
        Self {
            chatroom,
            user_id,
            unread_count,
            chatroom_name,
            chatroom_picture_url,
        }
    }
}

/// Groups show their name; a private room shows the other participant.
fn display_identity(chatroom: &Chatroom, viewer_id: i64) -> (String, Option<String>) {
    if chatroom.is_group {
        return (chatroom.group_name.clone().unwrap_or_default(), None);
    }
    chatroom
        .participants
        .iter()
        .find(|p| p.id != viewer_id)
        .or_else(|| chatroom.participants.first())
        .map(|p| (p.nickname.clone(), p.avatar_url.clone()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64, nickname: &str) -> UserSummary {
        UserSummary {
            id,
            nickname: nickname.into(),
            avatar_url: Some(format!("https://avatars/{}.png", id)),
        }
    }

    fn private_room() -> Chatroom {
        Chatroom {
            id: 7,
            is_group: false,
            group_name: None,
            created_at: "2024-01-01T00:00:00.000Z".into(),
            messages: Vec::new(),
            participants: vec![user(1, "alice"), user(2, "bob")],
        }
    }

    #[test]
    fn private_room_is_named_after_the_other_participant() {
        let for_alice = ChatroomView::new(private_room(), 1, 0);
        let for_bob = ChatroomView::new(private_room(), 2, 0);
        assert_eq!(for_alice.chatroom_name, "bob");
        assert_eq!(for_bob.chatroom_name, "alice");
        assert_eq!(
            for_alice.chatroom_picture_url.as_deref(),
            Some("https://avatars/2.png")
        );
    }

    #[test]
    fn group_room_uses_group_name() {
        let mut room = private_room();
        room.is_group = true;
        room.group_name = Some("friends".into());
        let view = ChatroomView::new(room, 1, 3);
        assert_eq!(view.chatroom_name, "friends");
        assert!(view.chatroom_picture_url.is_none());
        assert_eq!(view.unread_count, 3);
    }

    #[test]
    fn view_serializes_flat() {
        let view = ChatroomView::new(private_room(), 1, 2);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["isGroup"], false);
        assert_eq!(json["userID"], 1);
        assert_eq!(json["unreadCount"], 2);
        assert_eq!(json["chatroomName"], "bob");
    }
}
