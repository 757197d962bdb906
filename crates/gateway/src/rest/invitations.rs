//! Invitation REST endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use cadence_rooms::{CreateInvitationRequest, InvitationView, RespondInvitationRequest};
use std::sync::Arc;

use crate::error::GatewayResult;
use crate::middleware::CurrentUser;
use crate::state::GatewayState;
use crate::websocket::events::ServerEvent;

/// Create invitation routes
pub fn create_invitation_routes() -> Router<Arc<GatewayState>> {
    Router::new()
        .route("/rooms/:room_id/invitations", post(create_invitation))
        .route("/invitations", get(list_received_invitations))
        .route("/invitations/:invitation_id/respond", post(respond_to_invitation))
}

/// Invite a user to a room. Only members can invite, and only one pending
/// invitation may exist per (room, invitee).
pub async fn create_invitation(
    State(state): State<Arc<GatewayState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(room_id): Path<String>,
    Json(request): Json<CreateInvitationRequest>,
) -> GatewayResult<(StatusCode, Json<InvitationView>)> {
    let invitation = state
        .invitation_service
        .create(&room_id, &user, request)
        .await?;
    Ok((StatusCode::CREATED, Json(invitation)))
}

/// Pending invitations addressed to the caller
pub async fn list_received_invitations(
    State(state): State<Arc<GatewayState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> GatewayResult<Json<Vec<InvitationView>>> {
    let invitations = state.invitation_service.list_received(&user).await?;
    Ok(Json(invitations))
}

/// Accept or decline an invitation. A first-time accept persists the join
/// system message and broadcasts `user_joined` to the room.
pub async fn respond_to_invitation(
    State(state): State<Arc<GatewayState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(invitation_id): Path<String>,
    Json(request): Json<RespondInvitationRequest>,
) -> GatewayResult<Json<InvitationView>> {
    let outcome = state
        .invitation_service
        .respond(&invitation_id, &user, &request.action)
        .await?;

    if let Some(joined) = &outcome.joined {
        state
            .router
            .broadcast(
                &joined.room_id,
                ServerEvent::UserJoined {
                    message: joined.message.clone(),
                    user_id: joined.user.id.clone(),
                    user_name: joined.user.name.clone(),
                },
            )
            .await;
    }

    Ok(Json(outcome.invitation))
}
