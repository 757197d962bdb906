//! Hydrated view types the transport layer serializes.

use cadence_database::{
    FileRef, Message, MessageWithSender, ReadReceipt, Room, User, UserSummary,
};
use serde::{Deserialize, Serialize};

/// Public identity as shown next to messages and members
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub avatar_url: Option<String>,
}

impl From<&UserSummary> for UserView {
    fn from(summary: &UserSummary) -> Self {
        Self {
            id: summary.public_id.clone(),
            name: summary.display_name.clone(),
            avatar_url: summary.avatar_url.clone(),
        }
    }
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.public_id.clone(),
            name: user.display_name.clone(),
            avatar_url: user.avatar_url.clone(),
        }
    }
}

/// File metadata as shown on a message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileView {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub size: i64,
}

impl From<&FileRef> for FileView {
    fn from(file: &FileRef) -> Self {
        Self {
            id: file.file_id.clone(),
            name: file.name.clone(),
            mime_type: file.mime_type.clone(),
            size: file.size,
        }
    }
}

/// Read receipt as shown on a message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadReceiptView {
    pub user_id: String,
    pub read_at: String,
}

impl From<&ReadReceipt> for ReadReceiptView {
    fn from(receipt: &ReadReceipt) -> Self {
        Self {
            user_id: receipt.user_id.clone(),
            read_at: receipt.read_at.clone(),
        }
    }
}

/// A message with its sender populated
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub id: String,
    pub chat_room_id: String,
    pub sender: Option<UserView>,
    pub content: String,
    #[serde(rename = "type")]
    pub message_type: String,
    pub file: Option<FileView>,
    pub read_by: Vec<ReadReceiptView>,
    pub edited_at: Option<String>,
    pub created_at: String,
}

impl MessageView {
    /// Build a view from a persisted message and the sender the caller
    /// already holds.
    pub fn from_message(
        message: &Message,
        room_public_id: &str,
        sender: Option<UserView>,
    ) -> Self {
        Self {
            id: message.public_id.clone(),
            chat_room_id: room_public_id.to_string(),
            sender,
            content: message.content.clone(),
            message_type: message.message_type.as_str().to_string(),
            file: message.file.as_ref().map(FileView::from),
            read_by: Vec::new(),
            edited_at: message.edited_at.clone(),
            created_at: message.created_at.clone(),
        }
    }

    /// Build a view from a hydrated store record.
    pub fn from_record(record: &MessageWithSender, room_public_id: &str) -> Self {
        let mut view = Self::from_message(
            &record.message,
            room_public_id,
            record.sender.as_ref().map(UserView::from),
        );
        view.read_by = record.read_by.iter().map(ReadReceiptView::from).collect();
        view
    }
}

/// Last-message projection as shown on a room
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastMessageView {
    pub content: String,
    pub sender: Option<UserView>,
    pub sent_at: String,
}

/// A room with its members and last-message projection populated
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomView {
    pub id: String,
    pub title: String,
    pub kind: String,
    pub members: Vec<UserView>,
    pub last_message: Option<LastMessageView>,
    pub created_at: String,
}

impl RoomView {
    pub fn from_room(
        room: &Room,
        members: Vec<UserView>,
        last_message_sender: Option<UserView>,
    ) -> Self {
        Self {
            id: room.public_id.clone(),
            title: room.title.clone(),
            kind: room.kind.as_str().to_string(),
            members,
            last_message: room.last_message.as_ref().map(|last| LastMessageView {
                content: last.content.clone(),
                sender: last_message_sender,
                sent_at: last.sent_at.clone(),
            }),
            created_at: room.created_at.clone(),
        }
    }
}

/// An invitation with room and inviter details populated
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationView {
    pub id: String,
    pub room_id: String,
    pub room_title: String,
    pub inviter: UserView,
    pub message: Option<String>,
    pub status: String,
    pub created_at: String,
    pub responded_at: Option<String>,
}
