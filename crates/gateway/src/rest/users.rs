//! User directory REST endpoints

use axum::{
    extract::{Query, State},
    routing::get,
    Extension, Json, Router,
};
use cadence_rooms::UserView;
use serde::Deserialize;
use std::sync::Arc;

use crate::error::GatewayResult;
use crate::middleware::CurrentUser;
use crate::state::GatewayState;

const SEARCH_LIMIT: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

/// Create user routes
pub fn create_user_routes() -> Router<Arc<GatewayState>> {
    Router::new().route("/users/search", get(search_users))
}

/// Substring search over display names and emails
pub async fn search_users(
    State(state): State<Arc<GatewayState>>,
    Extension(CurrentUser(_user)): Extension<CurrentUser>,
    Query(query): Query<SearchQuery>,
) -> GatewayResult<Json<Vec<UserView>>> {
    let users = state.directory.search(query.q.trim(), SEARCH_LIMIT).await?;
    Ok(Json(users.iter().map(UserView::from).collect()))
}
