//! Repository for identity lookups against the externally-owned users table.

use crate::entities::User;
use crate::types::MessagingResult;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::info;

/// Repository for user directory operations
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a user by database id
    pub async fn find_by_id(&self, id: i64) -> MessagingResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, public_id, display_name, email, avatar_url, created_at
             FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| user_from_row(&row)).transpose()
    }

    /// Find a user by public id
    pub async fn find_by_public_id(&self, public_id: &str) -> MessagingResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, public_id, display_name, email, avatar_url, created_at
             FROM users WHERE public_id = ?",
        )
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| user_from_row(&row)).transpose()
    }

    /// Search users by display name or email substring
    pub async fn search(&self, query: &str, limit: i64) -> MessagingResult<Vec<User>> {
        let pattern = format!("%{}%", query);

        let rows = sqlx::query(
            "SELECT id, public_id, display_name, email, avatar_url, created_at
             FROM users WHERE display_name LIKE ? OR email LIKE ?
             ORDER BY display_name ASC LIMIT ?",
        )
        .bind(&pattern)
        .bind(&pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(user_from_row).collect()
    }

    /// Create a user row.
    ///
    /// Account creation belongs to the account service; this exists for
    /// development seeding and tests.
    pub async fn create(
        &self,
        display_name: &str,
        email: &str,
        avatar_url: Option<&str>,
    ) -> MessagingResult<User> {
        let public_id = cuid2::create_id();
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO users (public_id, display_name, email, avatar_url, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&public_id)
        .bind(display_name)
        .bind(email)
        .bind(avatar_url)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let user_id = result.last_insert_rowid();
        info!(user_id, public_id = %public_id, "created user row");

        Ok(User {
            id: user_id,
            public_id,
            display_name: display_name.to_string(),
            email: email.to_string(),
            avatar_url: avatar_url.map(|s| s.to_string()),
            created_at: now,
        })
    }
}

pub(crate) fn user_from_row(row: &SqliteRow) -> MessagingResult<User> {
    Ok(User {
        id: row.try_get("id")?,
        public_id: row.try_get("public_id")?,
        display_name: row.try_get("display_name")?,
        email: row.try_get("email")?,
        avatar_url: row.try_get("avatar_url")?,
        created_at: row.try_get("created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::test_support::create_test_pool;

    #[tokio::test]
    async fn create_and_find_user() {
        let (pool, _dir) = create_test_pool().await;
        let repo = UserRepository::new(pool);

        let created = repo
            .create("alice", "alice@example.com", None)
            .await
            .unwrap();
        assert!(created.id > 0);

        let by_id = repo.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(by_id.public_id, created.public_id);

        let by_public = repo
            .find_by_public_id(&created.public_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_public.display_name, "alice");
    }

    #[tokio::test]
    async fn search_matches_name_and_email() {
        let (pool, _dir) = create_test_pool().await;
        let repo = UserRepository::new(pool);

        repo.create("alice", "alice@example.com", None)
            .await
            .unwrap();
        repo.create("bob", "bob@example.com", None).await.unwrap();
        repo.create("carol", "carol@work.example", None)
            .await
            .unwrap();

        let by_name = repo.search("ali", 10).await.unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].display_name, "alice");

        let by_email = repo.search("work.example", 10).await.unwrap();
        assert_eq!(by_email.len(), 1);
        assert_eq!(by_email[0].display_name, "carol");

        let none = repo.search("nobody", 10).await.unwrap();
        assert!(none.is_empty());
    }
}
