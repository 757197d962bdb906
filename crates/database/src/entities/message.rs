use serde::{Deserialize, Serialize};

use super::user::UserSummary;

/// A message in the append-only per-room log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Database primary key; also the per-room ordering key
    pub id: i64,
    /// Publicly accessible id
    pub public_id: String,
    /// Room this message belongs to
    pub room_id: i64,
    /// Sender identity; absent iff `message_type` is `System`
    pub sender_id: Option<i64>,
    /// Message content
    pub content: String,
    /// Type of message
    pub message_type: MessageType,
    /// File metadata reference (the bytes live with the blob-storage service)
    pub file: Option<FileRef>,
    /// Set when the message was edited; the edit path is not driven here
    pub edited_at: Option<String>,
    /// Creation timestamp
    pub created_at: String,
}

/// Message type enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Text,
    Image,
    File,
    System,
}

impl From<&str> for MessageType {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "image" => MessageType::Image,
            "file" => MessageType::File,
            "system" => MessageType::System,
            _ => MessageType::Text,
        }
    }
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Text => "text",
            MessageType::Image => "image",
            MessageType::File => "file",
            MessageType::System => "system",
        }
    }
}

/// Metadata reference to an externally stored file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRef {
    /// Id assigned by the blob-storage service
    pub file_id: String,
    /// Original file name
    pub name: String,
    /// Mime type
    pub mime_type: String,
    /// Size in bytes
    pub size: i64,
}

/// A read receipt attached to a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadReceipt {
    pub user_id: String,
    pub read_at: String,
}

/// Message hydrated with its sender and read receipts, as handed to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageWithSender {
    pub message: Message,
    pub sender: Option<UserSummary>,
    pub read_by: Vec<ReadReceipt>,
}

impl Message {
    pub fn is_system(&self) -> bool {
        matches!(self.message_type, MessageType::System)
    }

    /// Projection summary for the room's last-message cache.
    pub fn projection_summary(&self) -> String {
        match (&self.message_type, &self.file) {
            (MessageType::File, Some(file)) => format!("\u{1F4CE} {}", file.name),
            (MessageType::File, None) => "\u{1F4CE} attachment".to_string(),
            _ => self.content.clone(),
        }
    }

    /// Validate message fields against the type rules.
    pub fn validate(
        content: &str,
        message_type: MessageType,
        sender_id: Option<i64>,
        file: Option<&FileRef>,
    ) -> Result<(), String> {
        if content.trim().is_empty() {
            return Err("message content cannot be empty".to_string());
        }
        if content.len() > 10_000 {
            return Err("message content too long (max 10,000 characters)".to_string());
        }
        match message_type {
            MessageType::System => {
                if sender_id.is_some() {
                    return Err("system messages cannot carry a sender".to_string());
                }
            }
            _ => {
                if sender_id.is_none() {
                    return Err("sender is required for non-system messages".to_string());
                }
            }
        }
        if matches!(message_type, MessageType::File) && file.is_none() {
            return Err("file messages require a file descriptor".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_type_conversion() {
        assert_eq!(MessageType::from("text"), MessageType::Text);
        assert_eq!(MessageType::from("image"), MessageType::Image);
        assert_eq!(MessageType::from("file"), MessageType::File);
        assert_eq!(MessageType::from("system"), MessageType::System);
        assert_eq!(MessageType::from("unknown"), MessageType::Text);
    }

    #[test]
    fn validation_rules() {
        assert!(Message::validate("hi", MessageType::Text, Some(1), None).is_ok());
        assert!(Message::validate("", MessageType::Text, Some(1), None).is_err());
        assert!(Message::validate("   ", MessageType::Text, Some(1), None).is_err());
        // sender required for non-system types
        assert!(Message::validate("hi", MessageType::Text, None, None).is_err());
        // system messages must not carry a sender
        assert!(Message::validate("joined", MessageType::System, None, None).is_ok());
        assert!(Message::validate("joined", MessageType::System, Some(1), None).is_err());
        // file messages require a descriptor
        assert!(Message::validate("report.pdf", MessageType::File, Some(1), None).is_err());
        let file = FileRef {
            file_id: "f1".into(),
            name: "report.pdf".into(),
            mime_type: "application/pdf".into(),
            size: 1024,
        };
        assert!(Message::validate("report.pdf", MessageType::File, Some(1), Some(&file)).is_ok());
    }

    #[test]
    fn file_projection_uses_attachment_marker() {
        let message = Message {
            id: 1,
            public_id: "m1".into(),
            room_id: 1,
            sender_id: Some(1),
            content: "report.pdf".into(),
            message_type: MessageType::File,
            file: Some(FileRef {
                file_id: "f1".into(),
                name: "report.pdf".into(),
                mime_type: "application/pdf".into(),
                size: 2048,
            }),
            edited_at: None,
            created_at: "2026-01-01T00:00:00Z".into(),
        };
        assert_eq!(message.projection_summary(), "\u{1F4CE} report.pdf");
    }
}
