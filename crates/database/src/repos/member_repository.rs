//! Repository for durable membership lookups.

use crate::entities::{MemberWithUser, UserSummary};
use crate::types::MessagingResult;
use sqlx::{Row, SqlitePool};

/// Repository for room membership queries
pub struct MemberRepository {
    pool: SqlitePool,
}

impl MemberRepository {
    /// Create a new member repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Whether a user is currently a member of a room
    pub async fn is_member(&self, room_id: i64, user_id: i64) -> MessagingResult<bool> {
        let row = sqlx::query("SELECT id FROM room_members WHERE room_id = ? AND user_id = ?")
            .bind(room_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    /// Database ids of every member of a room
    pub async fn member_ids(&self, room_id: i64) -> MessagingResult<Vec<i64>> {
        let rows = sqlx::query("SELECT user_id FROM room_members WHERE room_id = ?")
            .bind(room_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| row.try_get("user_id").map_err(Into::into))
            .collect()
    }

    /// Members of a room hydrated with their public identities
    pub async fn list_with_users(&self, room_id: i64) -> MessagingResult<Vec<MemberWithUser>> {
        let rows = sqlx::query(
            "SELECT m.joined_at, u.public_id, u.display_name, u.avatar_url
             FROM room_members m
             JOIN users u ON m.user_id = u.id
             WHERE m.room_id = ?
             ORDER BY m.joined_at ASC, m.id ASC",
        )
        .bind(room_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(MemberWithUser {
                    user: UserSummary {
                        public_id: row.try_get("public_id")?,
                        display_name: row.try_get("display_name")?,
                        avatar_url: row.try_get("avatar_url")?,
                    },
                    joined_at: row.try_get("joined_at")?,
                })
            })
            .collect()
    }
}
