use serde::{Deserialize, Serialize};

/// Caller identity resolved from a session token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub nickname: String,
}

/// Public profile of a chatroom participant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(default)]
pub struct UserSummary {
    pub id: i64,
    pub nickname: String,
    #[serde(rename = "avatarURL", skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}
