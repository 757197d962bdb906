//! # Cadence Gateway Crate
//!
//! Transport boundary for the collaboration messaging subsystem: the
//! persistent-connection event layer (presence registry, room broadcast
//! router, typing notifier) and the thin REST surface the excluded front-end
//! consumes.
//!
//! ## Architecture
//!
//! - **presence**: identity to live-connection binding with bounded outbound
//!   queues
//! - **broadcast**: room subscription sets and fan-out through presence
//! - **websocket**: authentication handshake, event vocabulary, dispatch
//! - **rest**: request/response wrappers over the domain services
//! - **state**: the service graph, constructed once and injected

pub mod broadcast;
pub mod error;
pub mod middleware;
pub mod presence;
pub mod rest;
pub mod state;
pub mod websocket;

// Re-export main types for convenience
pub use broadcast::RoomRouter;
pub use error::{GatewayError, GatewayResult};
pub use presence::{ConnectionHandle, Delivery, PresenceRegistry};
pub use state::{GatewaySettings, GatewayState};
pub use websocket::{ClientEvent, ServerEvent};

use axum::{http::Method, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Create the main application router with all routes
pub fn create_router(state: Arc<GatewayState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .merge(rest::create_rest_routes(state.clone()))
        .merge(websocket::create_websocket_routes())
        .layer(cors)
        .with_state(state)
}
