//! Error types for identity and token handling.

use thiserror::Error;

/// Result type alias for user operations
pub type UserResult<T> = Result<T, UserError>;

/// Errors surfaced by the identity directory and token validation
#[derive(Debug, Error)]
pub enum UserError {
    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token expired")]
    TokenExpired,

    #[error("token creation failed: {0}")]
    TokenCreationFailed(String),

    #[error("user not found: {id}")]
    UserNotFound { id: String },

    #[error("database error: {0}")]
    Database(String),
}

impl UserError {
    /// Create a not found error
    pub fn user_not_found(id: impl Into<String>) -> Self {
        Self::UserNotFound { id: id.into() }
    }
}

impl From<cadence_database::MessagingError> for UserError {
    fn from(err: cadence_database::MessagingError) -> Self {
        match err {
            cadence_database::MessagingError::UserNotFound { id } => Self::UserNotFound { id },
            other => Self::Database(other.to_string()),
        }
    }
}
