use serde::{Deserialize, Serialize};

use super::user::UserSummary;

/// Durable room membership row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomMember {
    pub id: i64,
    pub room_id: i64,
    pub user_id: i64,
    pub joined_at: String,
}

/// Membership row hydrated with the member's public identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberWithUser {
    pub user: UserSummary,
    pub joined_at: String,
}
