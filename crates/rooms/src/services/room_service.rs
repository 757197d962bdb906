//! Room lifecycle and membership service.

use cadence_database::{
    MemberRepository, MessagingError, MessagingResult, Room, RoomKind, RoomRepository, SqlitePool,
    User, UserRepository,
};
use tracing::info;

use crate::types::{CreateRoomRequest, MessageView, RoomView, UserView};

/// Result of a user leaving a room, carried up for fan-out.
#[derive(Debug)]
pub struct LeaveResult {
    /// Public id of the room that was left
    pub room_id: String,
    /// The persisted "… left the room" system message
    pub message: MessageView,
    /// True when the room was cascade-deleted with the last leave
    pub room_deleted: bool,
}

/// Service for room operations
pub struct RoomService {
    rooms: RoomRepository,
    members: MemberRepository,
    users: UserRepository,
}

impl RoomService {
    /// Create a new room service instance
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            rooms: RoomRepository::new(pool.clone()),
            members: MemberRepository::new(pool.clone()),
            users: UserRepository::new(pool),
        }
    }

    /// Create a room. The creator always becomes a member; additional members
    /// are resolved by public id and must exist.
    pub async fn create_room(
        &self,
        creator: &User,
        request: CreateRoomRequest,
    ) -> MessagingResult<RoomView> {
        Room::validate_title(&request.title).map_err(MessagingError::validation)?;

        let kind = request
            .kind
            .as_deref()
            .map(RoomKind::from)
            .unwrap_or(RoomKind::Group);

        let mut member_ids = Vec::with_capacity(request.member_ids.len());
        for public_id in &request.member_ids {
            let user = self
                .users
                .find_by_public_id(public_id)
                .await?
                .ok_or_else(|| MessagingError::user_not_found(public_id))?;
            member_ids.push(user.id);
        }

        let room = self
            .rooms
            .create(creator.id, request.title.trim(), kind, &member_ids)
            .await?;

        info!(room_id = %room.public_id, creator = %creator.public_id, "room created");
        self.hydrate(&room).await
    }

    /// List the caller's rooms with members and last-message projection.
    pub async fn list_rooms(&self, user: &User) -> MessagingResult<Vec<RoomView>> {
        let rooms = self.rooms.list_for_user(user.id).await?;
        let mut views = Vec::with_capacity(rooms.len());
        for room in &rooms {
            views.push(self.hydrate(room).await?);
        }
        Ok(views)
    }

    /// Resolve a room by public id
    pub async fn get_room(&self, public_id: &str) -> MessagingResult<Room> {
        self.rooms
            .find_by_public_id(public_id)
            .await?
            .ok_or_else(|| MessagingError::room_not_found(public_id))
    }

    /// Whether a user is a durable member of a room
    pub async fn is_member(&self, room: &Room, user: &User) -> MessagingResult<bool> {
        self.members.is_member(room.id, user.id).await
    }

    /// Database ids of a room's current members, for fan-out targeting
    pub async fn member_ids(&self, room: &Room) -> MessagingResult<Vec<i64>> {
        self.members.member_ids(room.id).await
    }

    /// Leave a room. Persists the departure system message and, when the
    /// leaver was the last member, cascade-deletes the room.
    pub async fn leave_room(&self, room_public_id: &str, user: &User) -> MessagingResult<LeaveResult> {
        let room = self.get_room(room_public_id).await?;
        let outcome = self.rooms.leave(&room, user).await?;

        Ok(LeaveResult {
            room_id: room.public_id.clone(),
            message: MessageView::from_message(&outcome.message, &room.public_id, None),
            room_deleted: outcome.room_deleted,
        })
    }

    async fn hydrate(&self, room: &Room) -> MessagingResult<RoomView> {
        let members = self
            .members
            .list_with_users(room.id)
            .await?
            .iter()
            .map(|member| UserView::from(&member.user))
            .collect();

        let last_message_sender = match room.last_message.as_ref().and_then(|m| m.sender_id) {
            Some(sender_id) => self
                .users
                .find_by_id(sender_id)
                .await?
                .map(|user| UserView::from(&user)),
            None => None,
        };

        Ok(RoomView::from_room(room, members, last_message_sender))
    }
}
