//! Repository implementations for data access

pub mod invitation_repository;
pub mod member_repository;
pub mod message_repository;
pub mod room_repository;
pub mod user_repository;

pub use invitation_repository::{AcceptOutcome, InvitationRepository};
pub use member_repository::MemberRepository;
pub use message_repository::MessageRepository;
pub use room_repository::{LeaveOutcome, RoomRepository};
pub use user_repository::UserRepository;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::connection::prepare_database;
    use crate::entities::{Room, RoomKind, User};
    use crate::migrations::run_migrations;
    use crate::repos::{RoomRepository, UserRepository};
    use cadence_config::DatabaseConfig;
    use sqlx::SqlitePool;
    use tempfile::TempDir;

    /// Tempfile-backed pool with the full schema applied.
    pub async fn create_test_pool() -> (SqlitePool, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let config = DatabaseConfig {
            url: format!("sqlite://{}", db_path.display()),
            max_connections: 2,
        };

        let pool = prepare_database(&config).await.unwrap();
        run_migrations(&pool).await.unwrap();
        (pool, temp_dir)
    }

    pub async fn seed_user(pool: &SqlitePool, name: &str) -> User {
        UserRepository::new(pool.clone())
            .create(name, &format!("{name}@example.com"), None)
            .await
            .unwrap()
    }

    pub async fn seed_room(
        pool: &SqlitePool,
        creator_id: i64,
        title: &str,
        member_ids: &[i64],
    ) -> Room {
        RoomRepository::new(pool.clone())
            .create(creator_id, title, RoomKind::Group, member_ids)
            .await
            .unwrap()
    }
}
