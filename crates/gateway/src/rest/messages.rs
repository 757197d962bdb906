//! Message REST endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use cadence_rooms::MessageView;
use serde::Deserialize;
use std::sync::Arc;

use crate::error::GatewayResult;
use crate::middleware::CurrentUser;
use crate::state::GatewayState;

#[derive(Debug, Deserialize)]
pub struct ListMessagesQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Create message routes
pub fn create_message_routes() -> Router<Arc<GatewayState>> {
    Router::new()
        .route("/rooms/:room_id/messages", get(list_messages))
        .route("/messages/:message_id/read", post(mark_read))
}

/// Paged room history. Pages are requested newest-first; each page comes back
/// in chronological order.
pub async fn list_messages(
    State(state): State<Arc<GatewayState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(room_id): Path<String>,
    Query(query): Query<ListMessagesQuery>,
) -> GatewayResult<Json<Vec<MessageView>>> {
    let page = query.page.unwrap_or(1);
    let limit = query
        .limit
        .unwrap_or(state.settings.default_page_size)
        .clamp(1, state.settings.max_page_size);

    let messages = state.message_service.list(&room_id, &user, page, limit).await?;
    Ok(Json(messages))
}

/// Record a read receipt for the caller
pub async fn mark_read(
    State(state): State<Arc<GatewayState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(message_id): Path<String>,
) -> GatewayResult<StatusCode> {
    state.message_service.mark_read(&message_id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}
