//! Request payloads shared by the REST and socket boundaries.

use serde::{Deserialize, Serialize};

/// Request to create a new room
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    /// Room title
    pub title: String,
    /// Room kind, `direct` or `group`; defaults to `group`
    #[serde(default)]
    pub kind: Option<String>,
    /// Public ids of members to include alongside the creator
    #[serde(default)]
    pub member_ids: Vec<String>,
}

/// A new chat message as submitted by a client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessageInput {
    pub content: String,
    /// `text`, `image`, or `file`; defaults to `text`
    #[serde(default)]
    pub message_type: Option<String>,
    #[serde(default)]
    pub file: Option<FileInput>,
}

/// File metadata reference submitted alongside a file message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInput {
    /// Id assigned by the blob-storage service
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub size: i64,
}

/// Request to invite a user into a room
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvitationRequest {
    /// Public id of the invitee
    pub invitee_id: String,
    /// Optional message from the inviter
    #[serde(default)]
    pub message: Option<String>,
}

/// Request to respond to an invitation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RespondInvitationRequest {
    /// `accept` or `decline`
    pub action: String,
}
