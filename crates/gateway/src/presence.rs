//! Presence registry: identity to live-connection binding.
//!
//! One explicit registry is constructed at process start and injected into
//! everything that needs it; there is no ambient global connection map.

use std::collections::HashMap;

use tokio::sync::{mpsc, RwLock};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::websocket::events::ServerEvent;

/// What travels down a connection's outbound queue.
#[derive(Debug, Clone)]
pub enum Delivery {
    /// A server event to serialize onto the socket
    Event(ServerEvent),
    /// Tells the outbound pump to close the socket; sent to a connection
    /// displaced by a newer binding for the same identity
    Close,
}

/// Handle to one live connection: its id and the sending side of its bounded
/// outbound queue.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    connection_id: String,
    user_id: i64,
    tx: mpsc::Sender<Delivery>,
}

impl ConnectionHandle {
    pub fn new(user_id: i64, tx: mpsc::Sender<Delivery>) -> Self {
        Self {
            connection_id: Uuid::new_v4().to_string(),
            user_id,
            tx,
        }
    }

    pub fn connection_id(&self) -> &str {
        &self.connection_id
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    /// Queue an event for delivery.
    ///
    /// Never blocks: a full queue drops the event so a slow recipient cannot
    /// stall the room. Chat history stays durable in the store, so a dropped
    /// live event is recoverable by polling.
    pub fn send(&self, event: ServerEvent) -> bool {
        match self.tx.try_send(Delivery::Event(event)) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(
                    connection_id = %self.connection_id,
                    user_id = self.user_id,
                    "outbound queue full, dropping event"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }

    /// Ask the connection's outbound pump to close the socket.
    pub fn close(&self) {
        let _ = self.tx.try_send(Delivery::Close);
    }
}

/// Maps an authenticated identity to at most one live connection.
pub struct PresenceRegistry {
    connections: RwLock<HashMap<i64, ConnectionHandle>>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Bind an identity to a connection, replacing any prior binding.
    /// Returns the displaced handle so the caller can close it.
    pub async fn bind(&self, handle: ConnectionHandle) -> Option<ConnectionHandle> {
        let mut connections = self.connections.write().await;
        let previous = connections.insert(handle.user_id(), handle);
        if previous.is_some() {
            debug!("replaced existing presence binding");
        }
        previous
    }

    /// Remove the binding for this connection, but only if it is still the
    /// current one; a handle displaced by a later bind leaves the newer
    /// binding untouched.
    pub async fn unbind(&self, handle: &ConnectionHandle) -> bool {
        let mut connections = self.connections.write().await;
        match connections.get(&handle.user_id()) {
            Some(current) if current.connection_id() == handle.connection_id() => {
                connections.remove(&handle.user_id());
                true
            }
            _ => false,
        }
    }

    /// Look up the live connection for an identity, if any.
    pub async fn lookup(&self, user_id: i64) -> Option<ConnectionHandle> {
        self.connections.read().await.get(&user_id).cloned()
    }
}

impl Default for PresenceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
