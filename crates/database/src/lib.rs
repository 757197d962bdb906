//! # Cadence Database Crate
//!
//! Persistence layer for the collaboration messaging subsystem: connection
//! management, migrations, entities, and repository implementations, plus the
//! error taxonomy shared by every layer above.

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod types;

pub use connection::prepare_database;
pub use migrations::run_migrations;

// Re-export repositories
pub use repos::{
    AcceptOutcome, InvitationRepository, LeaveOutcome, MemberRepository, MessageRepository,
    RoomRepository, UserRepository,
};

// Re-export entities
pub use entities::{
    FileRef, Invitation, InvitationStatus, InvitationWithDetails, LastMessage, MemberWithUser,
    Message, MessageType, MessageWithSender, ReadReceipt, Room, RoomKind, RoomMember, User,
    UserSummary,
};

// Re-export types
pub use types::{MessagingError, MessagingResult};

pub use sqlx::SqlitePool;

/// Initialize the database with migrations
pub async fn initialize_database(
    config: &cadence_config::DatabaseConfig,
) -> anyhow::Result<SqlitePool> {
    let pool = prepare_database(config).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}
