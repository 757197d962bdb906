//! Identity directory over the externally-owned users table.

use cadence_database::{SqlitePool, User, UserRepository};
use tracing::debug;

use crate::types::{UserError, UserResult};
use crate::utils::JwtManager;

/// Read-only view of the account service's user records, plus the
/// token-to-identity resolution every boundary needs.
pub struct UserDirectory {
    user_repository: UserRepository,
}

impl UserDirectory {
    /// Create a new directory backed by the given pool
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            user_repository: UserRepository::new(pool),
        }
    }

    /// Resolve a user by public id
    pub async fn get(&self, public_id: &str) -> UserResult<User> {
        self.user_repository
            .find_by_public_id(public_id)
            .await?
            .ok_or_else(|| UserError::user_not_found(public_id))
    }

    /// Resolve a user by database id
    pub async fn get_by_id(&self, id: i64) -> UserResult<User> {
        self.user_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| UserError::user_not_found(id.to_string()))
    }

    /// Substring search over display name and email
    pub async fn search(&self, query: &str, limit: i64) -> UserResult<Vec<User>> {
        let users = self.user_repository.search(query, limit).await?;
        debug!(query, hits = users.len(), "user directory search");
        Ok(users)
    }

    /// Validate a signed token and resolve the identity behind it.
    pub async fn authenticate(&self, jwt: &JwtManager, token: &str) -> UserResult<User> {
        let claims = jwt.validate_token(token)?;
        self.get(&claims.sub).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_database::{prepare_database, run_migrations};
    use cadence_config::DatabaseConfig;
    use std::time::Duration;
    use tempfile::TempDir;

    async fn setup() -> (SqlitePool, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("users.db");
        let config = DatabaseConfig {
            url: format!("sqlite://{}", db_path.display()),
            max_connections: 2,
        };
        let pool = prepare_database(&config).await.unwrap();
        run_migrations(&pool).await.unwrap();
        (pool, temp_dir)
    }

    #[tokio::test]
    async fn authenticate_resolves_token_subject() {
        let (pool, _dir) = setup().await;
        let user = UserRepository::new(pool.clone())
            .create("alice", "alice@example.com", None)
            .await
            .unwrap();

        let directory = UserDirectory::new(pool);
        let jwt = JwtManager::new("secret", Duration::from_secs(3600));
        let token = jwt.generate_token(&user.public_id).unwrap();

        let resolved = directory.authenticate(&jwt, &token).await.unwrap();
        assert_eq!(resolved.id, user.id);
        assert_eq!(resolved.display_name, "alice");
    }

    #[tokio::test]
    async fn authenticate_rejects_unknown_subject() {
        let (pool, _dir) = setup().await;
        let directory = UserDirectory::new(pool);
        let jwt = JwtManager::new("secret", Duration::from_secs(3600));
        let token = jwt.generate_token("ghost").unwrap();

        let err = directory.authenticate(&jwt, &token).await.unwrap_err();
        assert!(matches!(err, UserError::UserNotFound { .. }));
    }

    #[tokio::test]
    async fn authenticate_rejects_bad_token() {
        let (pool, _dir) = setup().await;
        let directory = UserDirectory::new(pool);
        let jwt = JwtManager::new("secret", Duration::from_secs(3600));

        let err = directory.authenticate(&jwt, "garbage").await.unwrap_err();
        assert!(matches!(err, UserError::InvalidToken(_)));
    }
}
