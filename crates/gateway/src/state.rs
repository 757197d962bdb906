//! Shared application state for the gateway

use std::sync::Arc;
use std::time::Duration;

use cadence_config::AppConfig;
use cadence_database::SqlitePool;
use cadence_rooms::{InvitationService, MessageService, RoomService};
use cadence_users::{JwtManager, UserDirectory};

use crate::broadcast::RoomRouter;
use crate::presence::PresenceRegistry;

/// Tunables lifted out of the application config.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    /// Window an unauthenticated socket has to present a valid token
    pub handshake_timeout: Duration,
    /// Capacity of each connection's outbound queue
    pub outbound_queue_depth: usize,
    pub default_page_size: u32,
    pub max_page_size: u32,
}

/// Shared application state containing the service graph.
///
/// Constructed once at process start and injected everywhere; the presence
/// registry and router in particular are plain fields here, not globals.
pub struct GatewayState {
    pub directory: UserDirectory,
    pub jwt: JwtManager,
    pub room_service: RoomService,
    pub message_service: MessageService,
    pub invitation_service: InvitationService,
    pub presence: Arc<PresenceRegistry>,
    pub router: RoomRouter,
    pub settings: GatewaySettings,
}

impl GatewayState {
    /// Wire up the full service graph over one pool.
    pub fn new(pool: SqlitePool, config: &AppConfig) -> Arc<Self> {
        let presence = Arc::new(PresenceRegistry::new());
        let router = RoomRouter::new(presence.clone());

        Arc::new(Self {
            directory: UserDirectory::new(pool.clone()),
            jwt: JwtManager::new(
                &config.auth.jwt_secret,
                Duration::from_secs(config.auth.token_ttl_seconds),
            ),
            room_service: RoomService::new(pool.clone()),
            message_service: MessageService::new(pool.clone()),
            invitation_service: InvitationService::new(pool),
            presence,
            router,
            settings: GatewaySettings {
                handshake_timeout: Duration::from_secs(config.auth.handshake_timeout_seconds),
                outbound_queue_depth: config.messaging.outbound_queue_depth,
                default_page_size: config.messaging.default_page_size,
                max_page_size: config.messaging.max_page_size,
            },
        })
    }
}
