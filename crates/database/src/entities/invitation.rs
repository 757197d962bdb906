use serde::{Deserialize, Serialize};

use super::user::UserSummary;

/// A proposed membership change requiring invitee consent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invitation {
    /// Database primary key
    pub id: i64,
    /// Publicly accessible id
    pub public_id: String,
    /// Room the invitee is being invited to
    pub room_id: i64,
    /// Member who issued the invitation
    pub inviter_id: i64,
    /// Identity whose consent is pending
    pub invitee_id: i64,
    /// Workflow status; terminal once it leaves `Pending`
    pub status: InvitationStatus,
    /// Optional message from the inviter
    pub message: Option<String>,
    /// Creation timestamp
    pub created_at: String,
    /// Set when the invitee responds
    pub responded_at: Option<String>,
}

/// Invitation status enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Declined,
}

impl From<&str> for InvitationStatus {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "accepted" => InvitationStatus::Accepted,
            "declined" => InvitationStatus::Declined,
            _ => InvitationStatus::Pending,
        }
    }
}

impl InvitationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Declined => "declined",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, InvitationStatus::Pending)
    }
}

/// Invitation hydrated with room and inviter details for listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvitationWithDetails {
    pub invitation: Invitation,
    pub room_public_id: String,
    pub room_title: String,
    pub inviter: UserSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_conversion() {
        assert_eq!(InvitationStatus::from("pending"), InvitationStatus::Pending);
        assert_eq!(
            InvitationStatus::from("accepted"),
            InvitationStatus::Accepted
        );
        assert_eq!(
            InvitationStatus::from("declined"),
            InvitationStatus::Declined
        );
        assert_eq!(InvitationStatus::from("garbage"), InvitationStatus::Pending);
    }

    #[test]
    fn terminal_states() {
        assert!(!InvitationStatus::Pending.is_terminal());
        assert!(InvitationStatus::Accepted.is_terminal());
        assert!(InvitationStatus::Declined.is_terminal());
    }
}
