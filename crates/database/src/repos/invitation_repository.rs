//! Repository for the invitation workflow state machine.

use crate::entities::{
    Invitation, InvitationStatus, InvitationWithDetails, Message, MessageType, Room, User,
    UserSummary,
};
use crate::repos::message_repository::append_message_tx;
use crate::repos::room_repository::room_from_row;
use crate::types::{MessagingError, MessagingResult};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::info;

/// Result of a successful invitation accept.
#[derive(Debug)]
pub struct AcceptOutcome {
    pub invitation: Invitation,
    /// The room as it stood at accept time, for fan-out targeting
    pub room: Room,
    /// The persisted "… joined the room" system message; absent only when the
    /// invitee somehow already held membership
    pub message: Option<Message>,
}

/// Repository for invitation database operations
pub struct InvitationRepository {
    pool: SqlitePool,
}

impl InvitationRepository {
    /// Create a new invitation repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a new pending invitation.
    ///
    /// The partial unique index on (room, invitee, pending) turns a racing
    /// duplicate into a conflict instead of a second pending row.
    pub async fn create(
        &self,
        room_id: i64,
        inviter_id: i64,
        invitee_id: i64,
        message: Option<&str>,
    ) -> MessagingResult<Invitation> {
        let public_id = cuid2::create_id();
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO invitations (public_id, room_id, inviter_id, invitee_id, status, message, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&public_id)
        .bind(room_id)
        .bind(inviter_id)
        .bind(invitee_id)
        .bind(InvitationStatus::Pending.as_str())
        .bind(message)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error()
                .is_some_and(|db| db.is_unique_violation())
            {
                MessagingError::DuplicateInvitation
            } else {
                MessagingError::Database(e)
            }
        })?;

        let invitation_id = result.last_insert_rowid();

        info!(
            invitation_id,
            public_id = %public_id,
            room_id,
            inviter_id,
            invitee_id,
            "created invitation"
        );

        Ok(Invitation {
            id: invitation_id,
            public_id,
            room_id,
            inviter_id,
            invitee_id,
            status: InvitationStatus::Pending,
            message: message.map(|s| s.to_string()),
            created_at: now,
            responded_at: None,
        })
    }

    /// Whether a pending invitation already exists for (room, invitee)
    pub async fn pending_exists(&self, room_id: i64, invitee_id: i64) -> MessagingResult<bool> {
        let row = sqlx::query(
            "SELECT id FROM invitations WHERE room_id = ? AND invitee_id = ? AND status = 'pending'",
        )
        .bind(room_id)
        .bind(invitee_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }

    /// Pending invitations addressed to a user, hydrated for listing
    pub async fn list_pending_for_invitee(
        &self,
        invitee_id: i64,
    ) -> MessagingResult<Vec<InvitationWithDetails>> {
        let rows = sqlx::query(
            "SELECT i.id, i.public_id, i.room_id, i.inviter_id, i.invitee_id, i.status,
                    i.message, i.created_at, i.responded_at,
                    r.public_id AS room_public_id, r.title AS room_title,
                    u.public_id AS inviter_public_id, u.display_name AS inviter_display_name,
                    u.avatar_url AS inviter_avatar_url
             FROM invitations i
             JOIN rooms r ON i.room_id = r.id
             JOIN users u ON i.inviter_id = u.id
             WHERE i.invitee_id = ? AND i.status = 'pending'
             ORDER BY i.created_at DESC",
        )
        .bind(invitee_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(invitation_with_details_from_row).collect()
    }

    /// Accept a pending invitation.
    ///
    /// The status transition, the membership insert, and the join system
    /// message commit in one transaction. The guarded UPDATE linearizes
    /// concurrent responds: only one caller observes an affected row, so only
    /// one join message and one broadcast can ever come out of an invitation.
    /// Room existence is re-checked inside the transaction to lose cleanly
    /// against a racing last-member leave.
    pub async fn accept(&self, public_id: &str, invitee: &User) -> MessagingResult<AcceptOutcome> {
        let now = chrono::Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE invitations SET status = 'accepted', responded_at = ?
             WHERE public_id = ? AND invitee_id = ? AND status = 'pending'",
        )
        .bind(&now)
        .bind(public_id)
        .bind(invitee.id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(self
                .classify_failed_transition(public_id, invitee.id)
                .await?);
        }

        let invitation = self.fetch_in_tx(&mut tx, public_id).await?;

        let room_row = sqlx::query(
            "SELECT id, public_id, title, kind, creator_id, last_message_content,
                    last_message_sender_id, last_message_at, created_at, updated_at
             FROM rooms WHERE id = ?",
        )
        .bind(invitation.room_id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(room_row) = room_row else {
            // A concurrent last-leave deleted the room; rolling back leaves
            // nothing dangling.
            return Err(MessagingError::room_not_found(public_id));
        };
        let room = room_from_row(&room_row)?;

        let inserted = sqlx::query(
            "INSERT OR IGNORE INTO room_members (room_id, user_id, joined_at) VALUES (?, ?, ?)",
        )
        .bind(invitation.room_id)
        .bind(invitee.id)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        let message = if inserted.rows_affected() > 0 {
            let content = format!("{} joined the room", invitee.display_name);
            Some(
                append_message_tx(
                    &mut tx,
                    invitation.room_id,
                    None,
                    &content,
                    MessageType::System,
                    None,
                )
                .await?,
            )
        } else {
            None
        };

        tx.commit().await?;

        info!(
            invitation_id = invitation.id,
            room_id = invitation.room_id,
            invitee_id = invitee.id,
            "invitation accepted"
        );

        Ok(AcceptOutcome {
            invitation,
            room,
            message,
        })
    }

    /// Decline a pending invitation. No side effects beyond the status row.
    pub async fn decline(&self, public_id: &str, invitee_id: i64) -> MessagingResult<Invitation> {
        let now = chrono::Utc::now().to_rfc3339();

        let updated = sqlx::query(
            "UPDATE invitations SET status = 'declined', responded_at = ?
             WHERE public_id = ? AND invitee_id = ? AND status = 'pending'",
        )
        .bind(&now)
        .bind(public_id)
        .bind(invitee_id)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(self.classify_failed_transition(public_id, invitee_id).await?);
        }

        info!(public_id, invitee_id, "invitation declined");

        let row = sqlx::query(
            "SELECT id, public_id, room_id, inviter_id, invitee_id, status, message,
                    created_at, responded_at
             FROM invitations WHERE public_id = ?",
        )
        .bind(public_id)
        .fetch_one(&self.pool)
        .await?;
        invitation_from_row(&row)
    }

    /// A zero-row transition is either an attempt on a terminal invitation
    /// (conflict) or an invitation that does not exist for this invitee.
    async fn classify_failed_transition(
        &self,
        public_id: &str,
        invitee_id: i64,
    ) -> MessagingResult<MessagingError> {
        let row = sqlx::query("SELECT status FROM invitations WHERE public_id = ? AND invitee_id = ?")
            .bind(public_id)
            .bind(invitee_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(match row {
            Some(_) => MessagingError::AlreadyResponded,
            None => MessagingError::invitation_not_found(public_id),
        })
    }

    async fn fetch_in_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        public_id: &str,
    ) -> MessagingResult<Invitation> {
        let row = sqlx::query(
            "SELECT id, public_id, room_id, inviter_id, invitee_id, status, message,
                    created_at, responded_at
             FROM invitations WHERE public_id = ?",
        )
        .bind(public_id)
        .fetch_one(&mut **tx)
        .await?;
        invitation_from_row(&row)
    }
}

pub(crate) fn invitation_from_row(row: &SqliteRow) -> MessagingResult<Invitation> {
    let status: String = row.try_get("status")?;
    Ok(Invitation {
        id: row.try_get("id")?,
        public_id: row.try_get("public_id")?,
        room_id: row.try_get("room_id")?,
        inviter_id: row.try_get("inviter_id")?,
        invitee_id: row.try_get("invitee_id")?,
        status: InvitationStatus::from(status.as_str()),
        message: row.try_get("message")?,
        created_at: row.try_get("created_at")?,
        responded_at: row.try_get("responded_at")?,
    })
}

fn invitation_with_details_from_row(row: &SqliteRow) -> MessagingResult<InvitationWithDetails> {
    Ok(InvitationWithDetails {
        invitation: invitation_from_row(row)?,
        room_public_id: row.try_get("room_public_id")?,
        room_title: row.try_get("room_title")?,
        inviter: UserSummary {
            public_id: row.try_get("inviter_public_id")?,
            display_name: row.try_get("inviter_display_name")?,
            avatar_url: row.try_get("inviter_avatar_url")?,
        },
    })
}
