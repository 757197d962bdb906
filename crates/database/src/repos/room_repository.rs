//! Repository for room lifecycle and durable membership changes.

use crate::entities::{LastMessage, Message, MessageType, Room, RoomKind, User};
use crate::repos::message_repository::append_message_tx;
use crate::types::{MessagingError, MessagingResult};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::info;

/// Result of a user leaving a room.
#[derive(Debug)]
pub struct LeaveOutcome {
    /// The persisted "… left the room" system message
    pub message: Message,
    /// True when the leaver was the last member and the room was
    /// cascade-deleted together with its messages and invitations
    pub room_deleted: bool,
}

/// Repository for room database operations
pub struct RoomRepository {
    pool: SqlitePool,
}

impl RoomRepository {
    /// Create a new room repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a room with its creator and any initial members.
    pub async fn create(
        &self,
        creator_id: i64,
        title: &str,
        kind: RoomKind,
        member_ids: &[i64],
    ) -> MessagingResult<Room> {
        let public_id = cuid2::create_id();
        let now = chrono::Utc::now().to_rfc3339();

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO rooms (public_id, title, kind, creator_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&public_id)
        .bind(title)
        .bind(kind.as_str())
        .bind(creator_id)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        let room_id = result.last_insert_rowid();

        // The creator is always a member; OR IGNORE dedupes a creator listed
        // among the initial members.
        for user_id in std::iter::once(&creator_id).chain(member_ids) {
            sqlx::query(
                "INSERT OR IGNORE INTO room_members (room_id, user_id, joined_at) VALUES (?, ?, ?)",
            )
            .bind(room_id)
            .bind(user_id)
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            room_id,
            public_id = %public_id,
            creator_id,
            kind = kind.as_str(),
            "created room"
        );

        Ok(Room {
            id: room_id,
            public_id,
            title: title.to_string(),
            kind,
            creator_id,
            last_message: None,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Find a room by its public id
    pub async fn find_by_public_id(&self, public_id: &str) -> MessagingResult<Option<Room>> {
        let row = sqlx::query(
            "SELECT id, public_id, title, kind, creator_id, last_message_content,
                    last_message_sender_id, last_message_at, created_at, updated_at
             FROM rooms WHERE public_id = ?",
        )
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| room_from_row(&row)).transpose()
    }

    /// Find a room by database id
    pub async fn find_by_id(&self, id: i64) -> MessagingResult<Option<Room>> {
        let row = sqlx::query(
            "SELECT id, public_id, title, kind, creator_id, last_message_content,
                    last_message_sender_id, last_message_at, created_at, updated_at
             FROM rooms WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| room_from_row(&row)).transpose()
    }

    /// List the rooms a user is a member of, most recently active first.
    pub async fn list_for_user(&self, user_id: i64) -> MessagingResult<Vec<Room>> {
        let rows = sqlx::query(
            "SELECT r.id, r.public_id, r.title, r.kind, r.creator_id, r.last_message_content,
                    r.last_message_sender_id, r.last_message_at, r.created_at, r.updated_at
             FROM rooms r
             JOIN room_members m ON m.room_id = r.id
             WHERE m.user_id = ?
             ORDER BY COALESCE(r.last_message_at, r.created_at) DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(room_from_row).collect()
    }

    /// Remove a user from durable membership.
    ///
    /// Persists the "left the room" system message first, then deletes the
    /// membership row; if the member set is now empty the room and all of its
    /// messages, read receipts, and invitations go with it, in the same
    /// transaction.
    pub async fn leave(&self, room: &Room, user: &User) -> MessagingResult<LeaveOutcome> {
        let mut tx = self.pool.begin().await?;

        let member = sqlx::query("SELECT id FROM room_members WHERE room_id = ? AND user_id = ?")
            .bind(room.id)
            .bind(user.id)
            .fetch_optional(&mut *tx)
            .await?;
        if member.is_none() {
            return Err(MessagingError::permission_denied(
                "not a member of the room",
            ));
        }

        let content = format!("{} left the room", user.display_name);
        let message =
            append_message_tx(&mut tx, room.id, None, &content, MessageType::System, None).await?;

        sqlx::query("DELETE FROM room_members WHERE room_id = ? AND user_id = ?")
            .bind(room.id)
            .bind(user.id)
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query("SELECT COUNT(*) AS count FROM room_members WHERE room_id = ?")
            .bind(room.id)
            .fetch_one(&mut *tx)
            .await?;
        let remaining: i64 = row.try_get("count")?;

        let room_deleted = remaining == 0;
        if room_deleted {
            // Foreign keys cascade messages, reads, members, and invitations.
            sqlx::query("DELETE FROM rooms WHERE id = ?")
                .bind(room.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        info!(
            room_id = room.id,
            user_id = user.id,
            room_deleted,
            "user left room"
        );

        Ok(LeaveOutcome {
            message,
            room_deleted,
        })
    }
}

pub(crate) fn room_from_row(row: &SqliteRow) -> MessagingResult<Room> {
    let kind: String = row.try_get("kind")?;
    let last_message_content: Option<String> = row.try_get("last_message_content")?;
    let last_message = match last_message_content {
        Some(content) => Some(LastMessage {
            content,
            sender_id: row.try_get("last_message_sender_id")?,
            sent_at: row
                .try_get::<Option<String>, _>("last_message_at")?
                .unwrap_or_default(),
        }),
        None => None,
    };

    Ok(Room {
        id: row.try_get("id")?,
        public_id: row.try_get("public_id")?,
        title: row.try_get("title")?,
        kind: RoomKind::from(kind.as_str()),
        creator_id: row.try_get("creator_id")?,
        last_message,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
