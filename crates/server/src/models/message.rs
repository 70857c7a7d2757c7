use serde::{Deserialize, Serialize};

/// A chat message as stored and as it travels on the wire.
///
/// Inbound payloads only fill `chatroomID`, `senderID`, `text` and
/// `attachmentURL`; the rest is assigned by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(default)]
pub struct ChatMessage {
    pub id: i64,
    #[serde(rename = "chatroomID")]
    pub chatroom_id: i64,
    #[serde(rename = "senderID")]
    #[sqlx(rename = "sender_user_id")]
    pub sender_id: i64,
    pub text: String,
    #[serde(rename = "attachmentURL", skip_serializing_if = "Option::is_none")]
    pub attachment_url: Option<String>,
    #[serde(rename = "timeStamp")]
    pub timestamp: String,
    pub viewed: bool,
    pub edited: bool,
    pub deleted: bool,
}

impl ChatMessage {
    /// Attachment URL with blank strings treated as absent.
    pub fn attachment(&self) -> Option<&str> {
        self.attachment_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}
