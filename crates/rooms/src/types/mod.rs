//! Shared types for the rooms crate

pub mod requests;
pub mod responses;

pub use requests::{
    CreateInvitationRequest, CreateRoomRequest, FileInput, NewMessageInput,
    RespondInvitationRequest,
};
pub use responses::{
    FileView, InvitationView, LastMessageView, MessageView, ReadReceiptView, RoomView, UserView,
};
