//! Invitation workflow service.

use cadence_database::{
    Invitation, InvitationRepository, InvitationWithDetails, MemberRepository, MessagingError,
    MessagingResult, RoomRepository, SqlitePool, User, UserRepository,
};
use tracing::info;

use crate::types::{CreateInvitationRequest, InvitationView, MessageView, UserView};

/// Side effects of a first-time accept, carried up for fan-out.
#[derive(Debug)]
pub struct JoinedRoom {
    /// Public id of the room that gained a member
    pub room_id: String,
    /// The persisted "… joined the room" system message
    pub message: MessageView,
    /// The new member
    pub user: UserView,
}

/// Result of responding to an invitation.
#[derive(Debug)]
pub struct RespondOutcome {
    pub invitation: InvitationView,
    /// Present only when an accept actually added the invitee
    pub joined: Option<JoinedRoom>,
}

/// Service for managing room invitations
pub struct InvitationService {
    rooms: RoomRepository,
    members: MemberRepository,
    users: UserRepository,
    invitations: InvitationRepository,
}

impl InvitationService {
    /// Create a new invitation service instance
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            rooms: RoomRepository::new(pool.clone()),
            members: MemberRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            invitations: InvitationRepository::new(pool),
        }
    }

    /// Create a pending invitation.
    ///
    /// The inviter must be a member, the invitee must exist and not already
    /// be a member, and only one pending invitation may exist per
    /// (room, invitee) — concurrent duplicates lose at the unique index.
    pub async fn create(
        &self,
        room_public_id: &str,
        inviter: &User,
        request: CreateInvitationRequest,
    ) -> MessagingResult<InvitationView> {
        let room = self
            .rooms
            .find_by_public_id(room_public_id)
            .await?
            .ok_or_else(|| MessagingError::room_not_found(room_public_id))?;

        if !self.members.is_member(room.id, inviter.id).await? {
            return Err(MessagingError::permission_denied(
                "only members can invite",
            ));
        }

        let invitee = self
            .users
            .find_by_public_id(&request.invitee_id)
            .await?
            .ok_or_else(|| MessagingError::user_not_found(&request.invitee_id))?;

        if self.members.is_member(room.id, invitee.id).await? {
            return Err(MessagingError::AlreadyMember);
        }

        let invitation = self
            .invitations
            .create(room.id, inviter.id, invitee.id, request.message.as_deref())
            .await?;

        info!(
            invitation_id = %invitation.public_id,
            room_id = %room.public_id,
            invitee = %invitee.public_id,
            "invitation created"
        );

        Ok(view_from_parts(
            &invitation,
            &room.public_id,
            &room.title,
            UserView::from(inviter),
        ))
    }

    /// Pending invitations addressed to the caller.
    pub async fn list_received(&self, user: &User) -> MessagingResult<Vec<InvitationView>> {
        let invitations = self.invitations.list_pending_for_invitee(user.id).await?;
        Ok(invitations.iter().map(view_from_details).collect())
    }

    /// Respond to a pending invitation with `accept` or `decline`.
    ///
    /// Responses are linearized per invitation: of two concurrent responds
    /// only one succeeds, so an accept adds the invitee and produces its join
    /// message exactly once.
    pub async fn respond(
        &self,
        invitation_public_id: &str,
        invitee: &User,
        action: &str,
    ) -> MessagingResult<RespondOutcome> {
        match action {
            "accept" => self.accept(invitation_public_id, invitee).await,
            "decline" => self.decline(invitation_public_id, invitee).await,
            other => Err(MessagingError::validation(format!(
                "unknown invitation action: {other}"
            ))),
        }
    }

    async fn accept(
        &self,
        invitation_public_id: &str,
        invitee: &User,
    ) -> MessagingResult<RespondOutcome> {
        let outcome = self
            .invitations
            .accept(invitation_public_id, invitee)
            .await?;

        let inviter = self.inviter_view(outcome.invitation.inviter_id).await?;
        let invitation = view_from_parts(
            &outcome.invitation,
            &outcome.room.public_id,
            &outcome.room.title,
            inviter,
        );

        let joined = outcome.message.map(|message| JoinedRoom {
            room_id: outcome.room.public_id.clone(),
            message: MessageView::from_message(&message, &outcome.room.public_id, None),
            user: UserView::from(invitee),
        });

        Ok(RespondOutcome { invitation, joined })
    }

    async fn decline(
        &self,
        invitation_public_id: &str,
        invitee: &User,
    ) -> MessagingResult<RespondOutcome> {
        let invitation = self
            .invitations
            .decline(invitation_public_id, invitee.id)
            .await?;

        let (room_public_id, room_title) = match self.rooms.find_by_id(invitation.room_id).await? {
            Some(room) => (room.public_id, room.title),
            None => (String::new(), String::new()),
        };
        let inviter = self.inviter_view(invitation.inviter_id).await?;

        Ok(RespondOutcome {
            invitation: view_from_parts(&invitation, &room_public_id, &room_title, inviter),
            joined: None,
        })
    }

    async fn inviter_view(&self, inviter_id: i64) -> MessagingResult<UserView> {
        let inviter = self
            .users
            .find_by_id(inviter_id)
            .await?
            .ok_or_else(|| MessagingError::user_not_found(inviter_id.to_string()))?;
        Ok(UserView::from(&inviter))
    }
}

fn view_from_parts(
    invitation: &Invitation,
    room_public_id: &str,
    room_title: &str,
    inviter: UserView,
) -> InvitationView {
    InvitationView {
        id: invitation.public_id.clone(),
        room_id: room_public_id.to_string(),
        room_title: room_title.to_string(),
        inviter,
        message: invitation.message.clone(),
        status: invitation.status.as_str().to_string(),
        created_at: invitation.created_at.clone(),
        responded_at: invitation.responded_at.clone(),
    }
}

fn view_from_details(details: &InvitationWithDetails) -> InvitationView {
    let inviter = UserView::from(&details.inviter);
    view_from_parts(
        &details.invitation,
        &details.room_public_id,
        &details.room_title,
        inviter,
    )
}
