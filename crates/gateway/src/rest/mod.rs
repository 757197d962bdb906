//! REST API endpoints for the gateway

pub mod health;
pub mod invitations;
pub mod messages;
pub mod rooms;
pub mod users;

use axum::{middleware as axum_middleware, routing::get, Router};
use std::sync::Arc;

use crate::middleware::auth_middleware;
use crate::state::GatewayState;

/// Create all REST API routes under `/api`
pub fn create_rest_routes(state: Arc<GatewayState>) -> Router<Arc<GatewayState>> {
    let protected = Router::new()
        .merge(rooms::create_room_routes())
        .merge(messages::create_message_routes())
        .merge(invitations::create_invitation_routes())
        .merge(users::create_user_routes())
        .route_layer(axum_middleware::from_fn_with_state(state, auth_middleware));

    let api = Router::new()
        .route("/health", get(health::health_check))
        .merge(protected);

    Router::new().nest("/api", api)
}
