//! # Cadence Rooms Crate
//!
//! Core business logic for the collaboration messaging subsystem: room
//! lifecycle and membership, the append-only message store semantics, and the
//! invitation workflow. The gateway layers presence, fan-out, and transport on
//! top of these services.

pub mod services;
pub mod types;

// Re-export the shared taxonomy for convenience
pub use cadence_database::{MessagingError, MessagingResult};

pub use services::{
    InvitationService, JoinedRoom, LeaveResult, MessageService, RespondOutcome, RoomService,
};
pub use types::{
    CreateInvitationRequest, CreateRoomRequest, FileInput, FileView, InvitationView,
    LastMessageView, MessageView, NewMessageInput, ReadReceiptView, RespondInvitationRequest,
    RoomView, UserView,
};
