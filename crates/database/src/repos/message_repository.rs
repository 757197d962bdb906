//! Repository for the append-only per-room message log.

use crate::entities::{FileRef, Message, MessageType, MessageWithSender, ReadReceipt, UserSummary};
use crate::types::{MessagingError, MessagingResult};
use sqlx::{sqlite::SqliteRow, Row, Sqlite, SqlitePool, Transaction};
use std::collections::HashMap;
use tracing::info;

/// Repository for message database operations
pub struct MessageRepository {
    pool: SqlitePool,
}

impl MessageRepository {
    /// Create a new message repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append a message to a room's log.
    ///
    /// The insert and the room's last-message projection update commit in one
    /// transaction, so the projection always reflects the most recently
    /// persisted message.
    pub async fn create(
        &self,
        room_id: i64,
        sender_id: Option<i64>,
        content: &str,
        message_type: MessageType,
        file: Option<&FileRef>,
    ) -> MessagingResult<Message> {
        let mut tx = self.pool.begin().await?;
        let message = append_message_tx(&mut tx, room_id, sender_id, content, message_type, file)
            .await?;
        tx.commit().await?;

        info!(
            message_id = message.id,
            public_id = %message.public_id,
            room_id,
            message_type = message_type.as_str(),
            "appended message"
        );
        Ok(message)
    }

    /// Find a message by its public id
    pub async fn find_by_public_id(&self, public_id: &str) -> MessagingResult<Option<Message>> {
        let row = sqlx::query(
            "SELECT id, public_id, room_id, sender_id, content, message_type,
                    file_id, file_name, file_mime_type, file_size, edited_at, created_at
             FROM messages WHERE public_id = ?",
        )
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| message_from_row(&row)).transpose()
    }

    /// Fetch one newest-first page of a room's log, hydrated with sender and
    /// read receipts. Callers are expected to reverse the page into
    /// chronological order before handing it out.
    pub async fn list_page(
        &self,
        room_id: i64,
        limit: i64,
        offset: i64,
    ) -> MessagingResult<Vec<MessageWithSender>> {
        let rows = sqlx::query(
            "SELECT m.id, m.public_id, m.room_id, m.sender_id, m.content, m.message_type,
                    m.file_id, m.file_name, m.file_mime_type, m.file_size, m.edited_at, m.created_at,
                    u.public_id AS sender_public_id, u.display_name AS sender_display_name,
                    u.avatar_url AS sender_avatar_url
             FROM messages m
             LEFT JOIN users u ON m.sender_id = u.id
             WHERE m.room_id = ?
             ORDER BY m.id DESC
             LIMIT ? OFFSET ?",
        )
        .bind(room_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let message = message_from_row(row)?;
            let sender = sender_from_row(row)?;
            messages.push(MessageWithSender {
                message,
                sender,
                read_by: Vec::new(),
            });
        }

        self.attach_read_receipts(&mut messages).await?;
        Ok(messages)
    }

    /// Record that a user has read a message. Idempotent.
    pub async fn mark_read(&self, message_public_id: &str, user_id: i64) -> MessagingResult<()> {
        let message = self
            .find_by_public_id(message_public_id)
            .await?
            .ok_or_else(|| MessagingError::message_not_found(message_public_id))?;

        let now = chrono::Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT OR IGNORE INTO message_reads (message_id, user_id, read_at) VALUES (?, ?, ?)",
        )
        .bind(message.id)
        .bind(user_id)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn attach_read_receipts(
        &self,
        messages: &mut [MessageWithSender],
    ) -> MessagingResult<()> {
        if messages.is_empty() {
            return Ok(());
        }

        let ids: Vec<i64> = messages.iter().map(|m| m.message.id).collect();
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT r.message_id, u.public_id AS user_public_id, r.read_at
             FROM message_reads r
             JOIN users u ON r.user_id = u.id
             WHERE r.message_id IN ({placeholders})
             ORDER BY r.read_at ASC"
        );

        let mut query = sqlx::query(&sql);
        for id in &ids {
            query = query.bind(id);
        }
        let rows = query.fetch_all(&self.pool).await?;

        let mut by_message: HashMap<i64, Vec<ReadReceipt>> = HashMap::new();
        for row in rows {
            let message_id: i64 = row.try_get("message_id")?;
            by_message.entry(message_id).or_default().push(ReadReceipt {
                user_id: row.try_get("user_public_id")?,
                read_at: row.try_get("read_at")?,
            });
        }

        for message in messages.iter_mut() {
            if let Some(reads) = by_message.remove(&message.message.id) {
                message.read_by = reads;
            }
        }
        Ok(())
    }
}

/// Insert a message and refresh the owning room's last-message projection in
/// the caller's transaction. Shared by the plain append path and the system
/// messages written during invitation accepts and leaves.
pub(crate) async fn append_message_tx(
    tx: &mut Transaction<'_, Sqlite>,
    room_id: i64,
    sender_id: Option<i64>,
    content: &str,
    message_type: MessageType,
    file: Option<&FileRef>,
) -> MessagingResult<Message> {
    let public_id = cuid2::create_id();
    let now = chrono::Utc::now().to_rfc3339();

    let result = sqlx::query(
        "INSERT INTO messages (public_id, room_id, sender_id, content, message_type,
                               file_id, file_name, file_mime_type, file_size, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&public_id)
    .bind(room_id)
    .bind(sender_id)
    .bind(content)
    .bind(message_type.as_str())
    .bind(file.map(|f| f.file_id.as_str()))
    .bind(file.map(|f| f.name.as_str()))
    .bind(file.map(|f| f.mime_type.as_str()))
    .bind(file.map(|f| f.size))
    .bind(&now)
    .execute(&mut **tx)
    .await?;

    let message = Message {
        id: result.last_insert_rowid(),
        public_id,
        room_id,
        sender_id,
        content: content.to_string(),
        message_type,
        file: file.cloned(),
        edited_at: None,
        created_at: now.clone(),
    };

    sqlx::query(
        "UPDATE rooms SET last_message_content = ?, last_message_sender_id = ?,
                          last_message_at = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(message.projection_summary())
    .bind(sender_id)
    .bind(&now)
    .bind(&now)
    .bind(room_id)
    .execute(&mut **tx)
    .await?;

    Ok(message)
}

pub(crate) fn message_from_row(row: &SqliteRow) -> MessagingResult<Message> {
    let message_type: String = row.try_get("message_type")?;
    let file_id: Option<String> = row.try_get("file_id")?;
    let file = match file_id {
        Some(file_id) => Some(FileRef {
            file_id,
            name: row
                .try_get::<Option<String>, _>("file_name")?
                .unwrap_or_default(),
            mime_type: row
                .try_get::<Option<String>, _>("file_mime_type")?
                .unwrap_or_default(),
            size: row.try_get::<Option<i64>, _>("file_size")?.unwrap_or(0),
        }),
        None => None,
    };

    Ok(Message {
        id: row.try_get("id")?,
        public_id: row.try_get("public_id")?,
        room_id: row.try_get("room_id")?,
        sender_id: row.try_get("sender_id")?,
        content: row.try_get("content")?,
        message_type: MessageType::from(message_type.as_str()),
        file,
        edited_at: row.try_get("edited_at")?,
        created_at: row.try_get("created_at")?,
    })
}

pub(crate) fn sender_from_row(row: &SqliteRow) -> MessagingResult<Option<UserSummary>> {
    let public_id: Option<String> = row.try_get("sender_public_id")?;
    match public_id {
        Some(public_id) => Ok(Some(UserSummary {
            public_id,
            display_name: row
                .try_get::<Option<String>, _>("sender_display_name")?
                .unwrap_or_default(),
            avatar_url: row.try_get("sender_avatar_url")?,
        })),
        None => Ok(None),
    }
}
