//! Room REST endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use cadence_rooms::{CreateRoomRequest, RoomView};
use serde::Serialize;
use std::sync::Arc;

use crate::error::GatewayResult;
use crate::middleware::CurrentUser;
use crate::state::GatewayState;
use crate::websocket::events::ServerEvent;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveResponse {
    pub room_id: String,
    pub room_deleted: bool,
}

/// Create room routes
pub fn create_room_routes() -> Router<Arc<GatewayState>> {
    Router::new()
        .route("/rooms", get(list_rooms).post(create_room))
        .route("/rooms/:room_id/leave", post(leave_room))
}

/// List the caller's rooms with members and last-message projection
pub async fn list_rooms(
    State(state): State<Arc<GatewayState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> GatewayResult<Json<Vec<RoomView>>> {
    let rooms = state.room_service.list_rooms(&user).await?;
    Ok(Json(rooms))
}

/// Create a room; the caller becomes the creator and first member
pub async fn create_room(
    State(state): State<Arc<GatewayState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(request): Json<CreateRoomRequest>,
) -> GatewayResult<(StatusCode, Json<RoomView>)> {
    let room = state.room_service.create_room(&user, request).await?;
    Ok((StatusCode::CREATED, Json(room)))
}

/// Leave a room: persists the departure system message, broadcasts
/// `user_left`, and cascade-deletes the room when the last member goes.
pub async fn leave_room(
    State(state): State<Arc<GatewayState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(room_id): Path<String>,
) -> GatewayResult<Json<LeaveResponse>> {
    let outcome = state.room_service.leave_room(&room_id, &user).await?;

    state
        .router
        .broadcast(
            &outcome.room_id,
            ServerEvent::UserLeft {
                message: outcome.message.clone(),
                user_id: user.public_id.clone(),
                user_name: user.display_name.clone(),
            },
        )
        .await;

    state.router.remove_subscriber(&outcome.room_id, user.id).await;
    if outcome.room_deleted {
        state.router.drop_room(&outcome.room_id).await;
    }

    Ok(Json(LeaveResponse {
        room_id: outcome.room_id,
        room_deleted: outcome.room_deleted,
    }))
}
