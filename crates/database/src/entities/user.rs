use serde::{Deserialize, Serialize};

/// An identity as this subsystem sees it.
///
/// Accounts are owned by the account service; the messaging core only reads
/// them for presence binding, membership checks, and sender hydration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Database primary key
    pub id: i64,
    /// Publicly accessible id
    pub public_id: String,
    /// Display name shown next to messages
    pub display_name: String,
    /// Email, used only for directory search
    pub email: String,
    /// Optional avatar reference
    pub avatar_url: Option<String>,
    /// Creation timestamp
    pub created_at: String,
}

/// The subset of a user that rides along on hydrated messages and rooms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub public_id: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            public_id: user.public_id.clone(),
            display_name: user.display_name.clone(),
            avatar_url: user.avatar_url.clone(),
        }
    }
}
