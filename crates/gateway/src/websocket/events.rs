//! Closed event vocabulary for the persistent connection.
//!
//! Payloads are tagged serde enums; anything that does not parse into one of
//! these shapes is rejected with an `error` event instead of being coerced.

use cadence_rooms::{MessageView, NewMessageInput, UserView};
use serde::{Deserialize, Serialize};

/// Client events received over the socket
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    /// Present a signed token to bind this connection to an identity
    Authenticate { token: String },
    /// Subscribe to a room's live fan-out
    JoinRoom { room_id: String },
    /// Send a chat message to a room
    SendMessage {
        chat_room_id: String,
        #[serde(flatten)]
        message: NewMessageInput,
    },
    /// Ephemeral typing signal
    TypingStart { chat_room_id: String },
    /// Ephemeral typing stop signal
    TypingStop { chat_room_id: String },
}

/// Server events sent over the socket
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// Authentication handshake succeeded
    Authenticated { success: bool },
    /// Authentication failed; the connection stays open for a retry
    AuthenticationError { message: String },
    /// Subscription confirmation
    JoinedRoom { room_id: String },
    /// A message was persisted and fanned out to the room
    NewMessage { message: MessageView },
    /// Someone in the room started or stopped typing
    UserTyping { user: UserView, is_typing: bool },
    /// A member joined, carrying the persisted system message
    UserJoined {
        message: MessageView,
        user_id: String,
        user_name: String,
    },
    /// A member left, carrying the persisted system message
    UserLeft {
        message: MessageView,
        user_id: String,
        user_name: String,
    },
    /// Error delivered to the originating connection only
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn client_events_parse_from_tagged_json() {
        let event: ClientEvent =
            serde_json::from_value(json!({"type": "authenticate", "token": "abc"})).unwrap();
        assert!(matches!(event, ClientEvent::Authenticate { token } if token == "abc"));

        let event: ClientEvent =
            serde_json::from_value(json!({"type": "join_room", "roomId": "r1"})).unwrap();
        assert!(matches!(event, ClientEvent::JoinRoom { room_id } if room_id == "r1"));

        let event: ClientEvent = serde_json::from_value(json!({
            "type": "send_message",
            "chatRoomId": "r1",
            "content": "hi",
        }))
        .unwrap();
        match event {
            ClientEvent::SendMessage {
                chat_room_id,
                message,
            } => {
                assert_eq!(chat_room_id, "r1");
                assert_eq!(message.content, "hi");
                assert!(message.message_type.is_none());
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn send_message_accepts_file_payload() {
        let event: ClientEvent = serde_json::from_value(json!({
            "type": "send_message",
            "chatRoomId": "r1",
            "content": "plan.pdf",
            "messageType": "file",
            "file": {"id": "blob_1", "name": "plan.pdf", "mimeType": "application/pdf", "size": 64}
        }))
        .unwrap();
        match event {
            ClientEvent::SendMessage { message, .. } => {
                let file = message.file.unwrap();
                assert_eq!(file.mime_type, "application/pdf");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn unknown_event_shapes_are_rejected() {
        assert!(serde_json::from_value::<ClientEvent>(json!({"type": "drop_tables"})).is_err());
        assert!(serde_json::from_value::<ClientEvent>(json!({"type": "join_room"})).is_err());
        assert!(serde_json::from_value::<ClientEvent>(json!({"no": "tag"})).is_err());
    }

    #[test]
    fn server_events_serialize_with_snake_case_tags() {
        let value =
            serde_json::to_value(ServerEvent::Authenticated { success: true }).unwrap();
        assert_eq!(value["type"], "authenticated");
        assert_eq!(value["success"], true);

        let value = serde_json::to_value(ServerEvent::UserTyping {
            user: UserView {
                id: "u1".into(),
                name: "alice".into(),
                avatar_url: None,
            },
            is_typing: true,
        })
        .unwrap();
        assert_eq!(value["type"], "user_typing");
        assert_eq!(value["isTyping"], true);
        assert_eq!(value["user"]["name"], "alice");
    }
}
