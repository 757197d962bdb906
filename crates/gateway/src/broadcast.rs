//! Room broadcast router: live subscription sets and fan-out.
//!
//! Subscriptions are live-connection state only; durable membership lives in
//! the store and is never touched here. Fan-out goes through the presence
//! registry and silently skips identities with no live connection.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::presence::PresenceRegistry;
use crate::websocket::events::ServerEvent;

/// Routes events to every connection subscribed to a room.
pub struct RoomRouter {
    presence: Arc<PresenceRegistry>,
    subscriptions: RwLock<HashMap<String, HashSet<i64>>>,
}

impl RoomRouter {
    pub fn new(presence: Arc<PresenceRegistry>) -> Self {
        Self {
            presence,
            subscriptions: RwLock::new(HashMap::new()),
        }
    }

    /// Subscribe a user's connection to a room's fan-out set.
    pub async fn join(&self, room_id: &str, user_id: i64) {
        let mut subscriptions = self.subscriptions.write().await;
        subscriptions
            .entry(room_id.to_string())
            .or_default()
            .insert(user_id);
    }

    /// Whether a user is currently subscribed to a room.
    pub async fn is_subscribed(&self, room_id: &str, user_id: i64) -> bool {
        self.subscriptions
            .read()
            .await
            .get(room_id)
            .is_some_and(|set| set.contains(&user_id))
    }

    /// Remove one user from one room's fan-out set.
    pub async fn remove_subscriber(&self, room_id: &str, user_id: i64) {
        let mut subscriptions = self.subscriptions.write().await;
        if let Some(set) = subscriptions.get_mut(room_id) {
            set.remove(&user_id);
            if set.is_empty() {
                subscriptions.remove(room_id);
            }
        }
    }

    /// Remove a room's fan-out set entirely, after a cascade delete.
    pub async fn drop_room(&self, room_id: &str) {
        self.subscriptions.write().await.remove(room_id);
    }

    /// Remove a disconnected user from every fan-out set. Durable membership
    /// is untouched: disconnect is not leave.
    pub async fn drop_connection(&self, user_id: i64) {
        let mut subscriptions = self.subscriptions.write().await;
        subscriptions.retain(|_, set| {
            set.remove(&user_id);
            !set.is_empty()
        });
    }

    /// Deliver an event to every subscribed identity with a live connection.
    /// Returns how many connections the event was queued on.
    pub async fn broadcast(&self, room_id: &str, event: ServerEvent) -> usize {
        let subscribers: Vec<i64> = match self.subscriptions.read().await.get(room_id) {
            Some(set) => set.iter().copied().collect(),
            None => return 0,
        };

        let mut delivered = 0;
        for user_id in subscribers {
            if let Some(connection) = self.presence.lookup(user_id).await {
                if connection.send(event.clone()) {
                    delivered += 1;
                }
            }
        }

        debug!(room_id, delivered, "room broadcast");
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presence::{ConnectionHandle, Delivery};
    use tokio::sync::mpsc;

    async fn connect(
        presence: &PresenceRegistry,
        user_id: i64,
    ) -> mpsc::Receiver<Delivery> {
        let (tx, rx) = mpsc::channel(16);
        presence.bind(ConnectionHandle::new(user_id, tx)).await;
        rx
    }

    fn event() -> ServerEvent {
        ServerEvent::JoinedRoom {
            room_id: "r1".to_string(),
        }
    }

    #[tokio::test]
    async fn broadcast_reaches_subscribed_live_connections_only() {
        let presence = Arc::new(PresenceRegistry::new());
        let router = RoomRouter::new(presence.clone());

        let mut alice_rx = connect(&presence, 1).await;
        let _bob_rx = connect(&presence, 2).await;

        router.join("r1", 1).await;
        // user 3 is subscribed but has no live connection
        router.join("r1", 3).await;
        // bob is connected but never joined r1

        let delivered = router.broadcast("r1", event()).await;
        assert_eq!(delivered, 1);
        assert!(matches!(alice_rx.recv().await, Some(Delivery::Event(_))));
    }

    #[tokio::test]
    async fn broadcast_to_unknown_room_is_a_no_op() {
        let presence = Arc::new(PresenceRegistry::new());
        let router = RoomRouter::new(presence);
        assert_eq!(router.broadcast("missing", event()).await, 0);
    }

    #[tokio::test]
    async fn drop_connection_unsubscribes_everywhere() {
        let presence = Arc::new(PresenceRegistry::new());
        let router = RoomRouter::new(presence.clone());
        let _rx = connect(&presence, 1).await;

        router.join("r1", 1).await;
        router.join("r2", 1).await;

        router.drop_connection(1).await;

        assert!(!router.is_subscribed("r1", 1).await);
        assert!(!router.is_subscribed("r2", 1).await);
        assert_eq!(router.broadcast("r1", event()).await, 0);
    }

    #[tokio::test]
    async fn remove_subscriber_is_scoped_to_one_room() {
        let presence = Arc::new(PresenceRegistry::new());
        let router = RoomRouter::new(presence);

        router.join("r1", 1).await;
        router.join("r2", 1).await;

        router.remove_subscriber("r1", 1).await;

        assert!(!router.is_subscribed("r1", 1).await);
        assert!(router.is_subscribed("r2", 1).await);
    }
}
