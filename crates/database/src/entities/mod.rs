//! Domain entities persisted by the messaging subsystem

pub mod invitation;
pub mod member;
pub mod message;
pub mod room;
pub mod user;

pub use invitation::{Invitation, InvitationStatus, InvitationWithDetails};
pub use member::{MemberWithUser, RoomMember};
pub use message::{FileRef, Message, MessageType, MessageWithSender, ReadReceipt};
pub use room::{LastMessage, Room, RoomKind};
pub use user::{User, UserSummary};
