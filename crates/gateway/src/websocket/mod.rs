//! WebSocket endpoints for the gateway

pub mod events;
pub mod session;

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::state::GatewayState;

/// Create the WebSocket routes
pub fn create_websocket_routes() -> Router<Arc<GatewayState>> {
    Router::new().route("/ws", get(session::collab_websocket_handler))
}

pub use events::{ClientEvent, ServerEvent};
