//! Business logic layer

pub mod invitation_service;
pub mod message_service;
pub mod room_service;

pub use invitation_service::{InvitationService, JoinedRoom, RespondOutcome};
pub use message_service::MessageService;
pub use room_service::{LeaveResult, RoomService};
