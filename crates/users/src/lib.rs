//! # Cadence Users Crate
//!
//! Identity directory and token authentication for the messaging subsystem.
//! Accounts themselves (registration, passwords, profiles) are owned by the
//! account service; this crate only resolves signed tokens to identities and
//! answers directory searches.

pub mod services;
pub mod types;
pub mod utils;

// Re-export database types for convenience
pub use cadence_database::{User, UserSummary};

pub use services::UserDirectory;
pub use types::{UserError, UserResult};
pub use utils::{Claims, JwtManager};
