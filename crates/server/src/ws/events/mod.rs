//! Frames the server sends that are not chat actions.

use serde::Serialize;

use crate::models::ChatroomView;
use crate::ws::actions::ActionKind;

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ServerFrame {
    /// First frame on every connection.
    InitialState { chatrooms: Vec<ChatroomView> },
    Error {
        error: String,
        #[serde(rename = "messageOption", skip_serializing_if = "Option::is_none")]
        message_option: Option<ActionKind>,
    },
}

impl ServerFrame {
    pub fn error(error: impl Into<String>, message_option: Option<ActionKind>) -> Self {
        ServerFrame::Error {
            error: error.into(),
            message_option,
        }
    }

    pub fn encode(&self) -> Option<String> {
        crate::ws::gateway::encode_frame(self)
    }
}
