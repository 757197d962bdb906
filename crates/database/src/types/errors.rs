//! Error taxonomy shared across the messaging subsystem.

use thiserror::Error;

/// Result type alias for messaging operations
pub type MessagingResult<T> = Result<T, MessagingError>;

/// Main error type for the messaging subsystem.
///
/// Every variant maps onto one propagation class: authentication problems keep
/// the connection open for a retry, validation/permission/not-found/conflict
/// errors go back to the originating caller only, and database errors abort
/// the in-flight composite operation before anything is broadcast.
#[derive(Debug, Error)]
pub enum MessagingError {
    #[error("authentication failed: {message}")]
    Authentication { message: String },

    #[error("validation error: {message}")]
    Validation { message: String },

    #[error("room not found: {id}")]
    RoomNotFound { id: String },

    #[error("user not found: {id}")]
    UserNotFound { id: String },

    #[error("message not found: {id}")]
    MessageNotFound { id: String },

    #[error("invitation not found: {id}")]
    InvitationNotFound { id: String },

    #[error("permission denied: {reason}")]
    PermissionDenied { reason: String },

    #[error("user is already a member of the room")]
    AlreadyMember,

    #[error("a pending invitation already exists for this user")]
    DuplicateInvitation,

    #[error("invitation has already been responded to")]
    AlreadyResponded,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl MessagingError {
    /// Create an authentication error
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a not found error for rooms
    pub fn room_not_found(id: impl Into<String>) -> Self {
        Self::RoomNotFound { id: id.into() }
    }

    /// Create a not found error for users
    pub fn user_not_found(id: impl Into<String>) -> Self {
        Self::UserNotFound { id: id.into() }
    }

    /// Create a not found error for messages
    pub fn message_not_found(id: impl Into<String>) -> Self {
        Self::MessageNotFound { id: id.into() }
    }

    /// Create a not found error for invitations
    pub fn invitation_not_found(id: impl Into<String>) -> Self {
        Self::InvitationNotFound { id: id.into() }
    }

    /// Create a permission denied error
    pub fn permission_denied(reason: impl Into<String>) -> Self {
        Self::PermissionDenied {
            reason: reason.into(),
        }
    }

    /// Whether this error belongs to the conflict family (duplicate pending
    /// invitation, already-member, transition out of a terminal state).
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::AlreadyMember | Self::DuplicateInvitation | Self::AlreadyResponded
        )
    }
}
