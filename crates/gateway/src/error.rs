//! Error types for the gateway layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cadence_database::MessagingError;
use cadence_users::UserError;
use serde_json::json;
use thiserror::Error;

/// Gateway error types
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{0}")]
    Messaging(#[from] MessagingError),

    #[error("{0}")]
    User(#[from] UserError),

    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Messaging(err) => match err {
                MessagingError::Authentication { .. } => StatusCode::UNAUTHORIZED,
                MessagingError::Validation { .. } => StatusCode::BAD_REQUEST,
                MessagingError::RoomNotFound { .. }
                | MessagingError::UserNotFound { .. }
                | MessagingError::MessageNotFound { .. }
                | MessagingError::InvitationNotFound { .. } => StatusCode::NOT_FOUND,
                MessagingError::PermissionDenied { .. } => StatusCode::FORBIDDEN,
                MessagingError::AlreadyMember
                | MessagingError::DuplicateInvitation
                | MessagingError::AlreadyResponded => StatusCode::CONFLICT,
                MessagingError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            GatewayError::User(err) => match err {
                UserError::InvalidToken(_)
                | UserError::TokenExpired
                | UserError::UserNotFound { .. } => StatusCode::UNAUTHORIZED,
                UserError::TokenCreationFailed(_) | UserError::Database(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            GatewayError::AuthenticationFailed(_) => StatusCode::UNAUTHORIZED,
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = json!({
            "error": status.as_str(),
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messaging_errors_map_to_expected_statuses() {
        let cases = [
            (
                GatewayError::from(MessagingError::validation("empty content")),
                StatusCode::BAD_REQUEST,
            ),
            (
                GatewayError::from(MessagingError::room_not_found("r1")),
                StatusCode::NOT_FOUND,
            ),
            (
                GatewayError::from(MessagingError::permission_denied("not a member")),
                StatusCode::FORBIDDEN,
            ),
            (
                GatewayError::from(MessagingError::DuplicateInvitation),
                StatusCode::CONFLICT,
            ),
            (
                GatewayError::from(MessagingError::AlreadyMember),
                StatusCode::CONFLICT,
            ),
            (
                GatewayError::from(MessagingError::AlreadyResponded),
                StatusCode::CONFLICT,
            ),
            (
                GatewayError::from(MessagingError::authentication("expired")),
                StatusCode::UNAUTHORIZED,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.status_code(), expected, "{err}");
        }
    }

    #[test]
    fn token_errors_are_unauthorized() {
        let err = GatewayError::from(UserError::TokenExpired);
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);

        let err = GatewayError::from(UserError::InvalidToken("bad".into()));
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }
}
