//! Message store service: validation, append, paged history, read receipts.

use cadence_database::{
    FileRef, MemberRepository, Message, MessageRepository, MessagingError, MessagingResult,
    MessageType, RoomRepository, SqlitePool, User,
};
use tracing::debug;

use crate::types::{MessageView, NewMessageInput, UserView};

/// Service for message operations
pub struct MessageService {
    rooms: RoomRepository,
    members: MemberRepository,
    messages: MessageRepository,
}

impl MessageService {
    /// Create a new message service instance
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            rooms: RoomRepository::new(pool.clone()),
            members: MemberRepository::new(pool.clone()),
            messages: MessageRepository::new(pool),
        }
    }

    /// Validate and append a message to a room's log.
    ///
    /// Succeeds only after the message and the room's last-message projection
    /// are durably committed; callers broadcast strictly after this returns.
    pub async fn send(
        &self,
        room_public_id: &str,
        sender: &User,
        input: NewMessageInput,
    ) -> MessagingResult<MessageView> {
        let room = self
            .rooms
            .find_by_public_id(room_public_id)
            .await?
            .ok_or_else(|| MessagingError::room_not_found(room_public_id))?;

        if !self.members.is_member(room.id, sender.id).await? {
            return Err(MessagingError::permission_denied(
                "not a member of the room",
            ));
        }

        let message_type = input
            .message_type
            .as_deref()
            .map(MessageType::from)
            .unwrap_or(MessageType::Text);
        if message_type == MessageType::System {
            return Err(MessagingError::validation(
                "system messages are generated by the server",
            ));
        }

        let file = input.file.as_ref().map(|f| FileRef {
            file_id: f.id.clone(),
            name: f.name.clone(),
            mime_type: f.mime_type.clone(),
            size: f.size,
        });

        Message::validate(&input.content, message_type, Some(sender.id), file.as_ref())
            .map_err(MessagingError::validation)?;

        let message = self
            .messages
            .create(
                room.id,
                Some(sender.id),
                &input.content,
                message_type,
                file.as_ref(),
            )
            .await?;

        Ok(MessageView::from_message(
            &message,
            &room.public_id,
            Some(UserView::from(sender)),
        ))
    }

    /// Paged history for a room.
    ///
    /// Pages are requested newest-first but each page is returned in
    /// chronological order, so callers always read oldest-to-newest.
    pub async fn list(
        &self,
        room_public_id: &str,
        caller: &User,
        page: u32,
        limit: u32,
    ) -> MessagingResult<Vec<MessageView>> {
        let room = self
            .rooms
            .find_by_public_id(room_public_id)
            .await?
            .ok_or_else(|| MessagingError::room_not_found(room_public_id))?;

        if !self.members.is_member(room.id, caller.id).await? {
            return Err(MessagingError::permission_denied(
                "not a member of the room",
            ));
        }

        let page = page.max(1);
        let offset = i64::from(page - 1) * i64::from(limit);

        let mut records = self
            .messages
            .list_page(room.id, i64::from(limit), offset)
            .await?;
        records.reverse();

        debug!(
            room_id = %room.public_id,
            page,
            limit,
            returned = records.len(),
            "listed message page"
        );

        Ok(records
            .iter()
            .map(|record| MessageView::from_record(record, &room.public_id))
            .collect())
    }

    /// Record a read receipt for the caller. Idempotent.
    pub async fn mark_read(&self, message_public_id: &str, caller: &User) -> MessagingResult<()> {
        let message = self
            .messages
            .find_by_public_id(message_public_id)
            .await?
            .ok_or_else(|| MessagingError::message_not_found(message_public_id))?;

        if !self.members.is_member(message.room_id, caller.id).await? {
            return Err(MessagingError::permission_denied(
                "not a member of the room",
            ));
        }

        self.messages.mark_read(message_public_id, caller.id).await
    }
}
