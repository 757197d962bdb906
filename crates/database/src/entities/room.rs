use serde::{Deserialize, Serialize};

/// A named set of member identities sharing a message stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    /// Database primary key
    pub id: i64,
    /// Publicly accessible id
    pub public_id: String,
    /// Room title
    pub title: String,
    /// Kind of room (direct, group)
    pub kind: RoomKind,
    /// User who created the room (always a member)
    pub creator_id: i64,
    /// Cached projection of the most recently persisted message
    pub last_message: Option<LastMessage>,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

/// Room kind enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RoomKind {
    Direct,
    Group,
}

impl From<&str> for RoomKind {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "direct" => RoomKind::Direct,
            _ => RoomKind::Group,
        }
    }
}

impl RoomKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomKind::Direct => "direct",
            RoomKind::Group => "group",
        }
    }
}

/// Last-message projection carried on the room row.
///
/// Always reflects the most recently *persisted* message for the room;
/// file messages are summarized with an attachment marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastMessage {
    pub content: String,
    pub sender_id: Option<i64>,
    pub sent_at: String,
}

impl Room {
    /// Validate room data before persistence
    pub fn validate_title(title: &str) -> Result<(), String> {
        if title.trim().is_empty() {
            return Err("room title cannot be empty".to_string());
        }
        if title.len() > 255 {
            return Err("room title too long (max 255 characters)".to_string());
        }
        Ok(())
    }

    pub fn is_direct(&self) -> bool {
        matches!(self.kind, RoomKind::Direct)
    }
}
