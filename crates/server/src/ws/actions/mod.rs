//! The closed set of chat actions and their single wire envelope:
//! `{ "messageOption": "<KIND>", "<payloadKey>": { ... } }`.

mod payloads;

pub use payloads::*;

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    SendMessage,
    ViewMessage,
    EditMessage,
    DeleteMessage,
    ReactToMessage,
    CreatePrivateChatroom,
    CreateGroupChatroom,
    UpdateGroupChatroom,
    DeleteGroupChatroom,
}

impl ActionKind {
    pub const ALL: [ActionKind; 9] = [
        ActionKind::SendMessage,
        ActionKind::ViewMessage,
        ActionKind::EditMessage,
        ActionKind::DeleteMessage,
        ActionKind::ReactToMessage,
        ActionKind::CreatePrivateChatroom,
        ActionKind::CreateGroupChatroom,
        ActionKind::UpdateGroupChatroom,
        ActionKind::DeleteGroupChatroom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::SendMessage => "SEND_MESSAGE",
            ActionKind::ViewMessage => "VIEW_MESSAGE",
            ActionKind::EditMessage => "EDIT_MESSAGE",
            ActionKind::DeleteMessage => "DELETE_MESSAGE",
            ActionKind::ReactToMessage => "REACT_TO_MESSAGE",
            ActionKind::CreatePrivateChatroom => "CREATE_PRIVATE_CHATROOM",
            ActionKind::CreateGroupChatroom => "CREATE_GROUP_CHATROOM",
            ActionKind::UpdateGroupChatroom => "UPDATE_GROUP_CHATROOM",
            ActionKind::DeleteGroupChatroom => "DELETE_GROUP_CHATROOM",
        }
    }

    /// Envelope key that holds this kind's payload.
    pub fn payload_key(&self) -> &'static str {
        match self {
            ActionKind::SendMessage => "sendMessage",
            ActionKind::ViewMessage => "viewMessage",
            ActionKind::EditMessage => "editMessage",
            ActionKind::DeleteMessage => "deleteMessage",
            ActionKind::ReactToMessage => "reactToMessage",
            ActionKind::CreatePrivateChatroom => "createPrivateChatroom",
            ActionKind::CreateGroupChatroom => "createGroupChatroom",
            ActionKind::UpdateGroupChatroom => "updateGroupChatroom",
            ActionKind::DeleteGroupChatroom => "deleteGroupChatroom",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Envelope", into = "Envelope")]
pub enum Action {
    SendMessage(SendMessage),
    ViewMessage(ViewMessage),
    EditMessage(EditMessage),
    DeleteMessage(DeleteMessage),
    ReactToMessage(ReactToMessage),
    CreatePrivateChatroom(CreatePrivateChatroom),
    CreateGroupChatroom(GroupChatroom),
    UpdateGroupChatroom(GroupChatroom),
    DeleteGroupChatroom(DeleteGroupChatroom),
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::SendMessage(_) => ActionKind::SendMessage,
            Action::ViewMessage(_) => ActionKind::ViewMessage,
            Action::EditMessage(_) => ActionKind::EditMessage,
            Action::DeleteMessage(_) => ActionKind::DeleteMessage,
            Action::ReactToMessage(_) => ActionKind::ReactToMessage,
            Action::CreatePrivateChatroom(_) => ActionKind::CreatePrivateChatroom,
            Action::CreateGroupChatroom(_) => ActionKind::CreateGroupChatroom,
            Action::UpdateGroupChatroom(_) => ActionKind::UpdateGroupChatroom,
            Action::DeleteGroupChatroom(_) => ActionKind::DeleteGroupChatroom,
        }
    }

    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    message_option: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    send_message: Option<SendMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    view_message: Option<ViewMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    edit_message: Option<EditMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    delete_message: Option<DeleteMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    react_to_message: Option<ReactToMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    create_private_chatroom: Option<CreatePrivateChatroom>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    create_group_chatroom: Option<GroupChatroom>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    update_group_chatroom: Option<GroupChatroom>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    delete_group_chatroom: Option<DeleteGroupChatroom>,
}

impl Envelope {
    fn empty(message_option: ActionKind) -> Self {
        Self {
            message_option,
            send_message: None,
            view_message: None,
            edit_message: None,
            delete_message: None,
            react_to_message: None,
            create_private_chatroom: None,
            create_group_chatroom: None,
            update_group_chatroom: None,
            delete_group_chatroom: None,
        }
    }

    fn populated(&self) -> usize {
        [
            self.send_message.is_some(),
            self.view_message.is_some(),
            self.edit_message.is_some(),
            self.delete_message.is_some(),
            self.react_to_message.is_some(),
            self.create_private_chatroom.is_some(),
            self.create_group_chatroom.is_some(),
            self.update_group_chatroom.is_some(),
            self.delete_group_chatroom.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }
}

impl TryFrom<Envelope> for Action {
    type Error = String;

    fn try_from(envelope: Envelope) -> Result<Self, Self::Error> {
        let kind = envelope.message_option;
        if envelope.populated() > 1 {
            return Err(format!(
                "messageOption {} must carry only the `{}` payload",
                kind,
                kind.payload_key()
            ));
        }

        let action = match kind {
            ActionKind::SendMessage => envelope.send_message.map(Action::SendMessage),
            ActionKind::ViewMessage => envelope.view_message.map(Action::ViewMessage),
            ActionKind::EditMessage => envelope.edit_message.map(Action::EditMessage),
            ActionKind::DeleteMessage => envelope.delete_message.map(Action::DeleteMessage),
            ActionKind::ReactToMessage => envelope.react_to_message.map(Action::ReactToMessage),
            ActionKind::CreatePrivateChatroom => envelope
                .create_private_chatroom
                .map(Action::CreatePrivateChatroom),
            ActionKind::CreateGroupChatroom => envelope
                .create_group_chatroom
                .map(Action::CreateGroupChatroom),
            ActionKind::UpdateGroupChatroom => envelope
                .update_group_chatroom
                .map(Action::UpdateGroupChatroom),
            ActionKind::DeleteGroupChatroom => envelope
                .delete_group_chatroom
                .map(Action::DeleteGroupChatroom),
        };

        action.ok_or_else(|| {
            format!(
                "messageOption {} requires a `{}` payload",
                kind,
                kind.payload_key()
            )
        })
    }
}

impl From<Action> for Envelope {
    fn from(action: Action) -> Self {
        let mut envelope = Envelope::empty(action.kind());
        match action {
            Action::SendMessage(p) => envelope.send_message = Some(p),
            Action::ViewMessage(p) => envelope.view_message = Some(p),
            Action::EditMessage(p) => envelope.edit_message = Some(p),
            Action::DeleteMessage(p) => envelope.delete_message = Some(p),
            Action::ReactToMessage(p) => envelope.react_to_message = Some(p),
            Action::CreatePrivateChatroom(p) => envelope.create_private_chatroom = Some(p),
            Action::CreateGroupChatroom(p) => envelope.create_group_chatroom = Some(p),
            Action::UpdateGroupChatroom(p) => envelope.update_group_chatroom = Some(p),
            Action::DeleteGroupChatroom(p) => envelope.delete_group_chatroom = Some(p),
        }
        envelope
    }
}
