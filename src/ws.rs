//! Real-time broadcast registry.
//!
//! Maps a family id to its currently-connected WebSocket subscribers. This is
//! deliberately in-process state: the deployment shape is a single server
//! process, and the registry is owned by `AppState` rather than living in a
//! global. Broadcasts are best-effort and always happen after the triggering
//! transaction has committed; a failed send evicts that one subscriber and
//! delivery continues to the rest.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::sync::mpsc;
use uuid::Uuid;

pub type ConnId = u64;

#[derive(Clone, Default)]
pub struct WsRegistry {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    next_id: ConnId,
    families: HashMap<Uuid, Vec<(ConnId, mpsc::UnboundedSender<String>)>>,
}

impl WsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber under a family. The returned receiver yields
    /// serialized event payloads until the connection is deregistered.
    pub fn register(&self, family_id: Uuid) -> (ConnId, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock().expect("ws registry poisoned");
        inner.next_id += 1;
        let conn_id = inner.next_id;
        inner.families.entry(family_id).or_default().push((conn_id, tx));
        let total = inner.families.get(&family_id).map_or(0, Vec::len);
        tracing::info!(%family_id, conn_id, total, "ws client connected");
        (conn_id, rx)
    }

    pub fn deregister(&self, family_id: Uuid, conn_id: ConnId) {
        let mut inner = self.inner.lock().expect("ws registry poisoned");
        if let Some(conns) = inner.families.get_mut(&family_id) {
            conns.retain(|(id, _)| *id != conn_id);
            if conns.is_empty() {
                inner.families.remove(&family_id);
            }
            tracing::info!(%family_id, conn_id, "ws client disconnected");
        }
    }

    /// Publish an event to every subscriber currently registered under the
    /// family. Connections joining after this snapshot do not receive it.
    pub fn broadcast_to_family(&self, family_id: Uuid, message: &Value) {
        let payload = message.to_string();
        let mut inner = self.inner.lock().expect("ws registry poisoned");
        let Some(conns) = inner.families.get_mut(&family_id) else {
            return;
        };
        conns.retain(|(conn_id, tx)| {
            if tx.send(payload.clone()).is_ok() {
                true
            } else {
                tracing::warn!(%family_id, conn_id, "ws send failed, dropping subscriber");
                false
            }
        });
        if conns.is_empty() {
            inner.families.remove(&family_id);
        }
    }

    #[cfg(test)]
    fn subscriber_count(&self, family_id: Uuid) -> usize {
        let inner = self.inner.lock().expect("ws registry poisoned");
        inner.families.get(&family_id).map_or(0, Vec::len)
    }
}

/// Event payload for the per-family channel.
pub fn item_event(action: &str, list_id: Uuid, item_id: Uuid) -> Value {
    serde_json::json!({
        "action": action,
        "list_id": list_id,
        "item_id": item_id,
    })
}

/// Event payload announcing a product image change.
pub fn product_event(action: &str, product_id: Uuid) -> Value {
    serde_json::json!({
        "action": action,
        "product_id": product_id,
    })
}

pub const ITEM_CREATED: &str = "ITEM_CREATED";
pub const ITEM_UPDATED: &str = "ITEM_UPDATED";
pub const ITEM_DELETED: &str = "ITEM_DELETED";
pub const PRODUCT_IMAGE_UPDATED: &str = "PRODUCT_IMAGE_UPDATED";

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn broadcast_reaches_all_family_subscribers() {
        let registry = WsRegistry::new();
        let family = Uuid::new_v4();
        let (_a, mut rx_a) = registry.register(family);
        let (_b, mut rx_b) = registry.register(family);

        let event = item_event(ITEM_CREATED, Uuid::new_v4(), Uuid::new_v4());
        registry.broadcast_to_family(family, &event);

        assert_eq!(rx_a.recv().await.unwrap(), event.to_string());
        assert_eq!(rx_b.recv().await.unwrap(), event.to_string());
    }

    #[tokio::test]
    async fn broadcast_skips_other_families() {
        let registry = WsRegistry::new();
        let family_a = Uuid::new_v4();
        let family_b = Uuid::new_v4();
        let (_a, mut rx_a) = registry.register(family_a);
        let (_b, mut rx_b) = registry.register(family_b);

        registry.broadcast_to_family(family_a, &item_event(ITEM_UPDATED, Uuid::new_v4(), Uuid::new_v4()));

        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn dead_subscriber_is_evicted_without_aborting_delivery() {
        let registry = WsRegistry::new();
        let family = Uuid::new_v4();
        let (_dead, rx_dead) = registry.register(family);
        drop(rx_dead);
        let (_live, mut rx_live) = registry.register(family);

        registry.broadcast_to_family(family, &item_event(ITEM_DELETED, Uuid::new_v4(), Uuid::new_v4()));

        assert!(rx_live.try_recv().is_ok());
        assert_eq!(registry.subscriber_count(family), 1);
    }

    #[tokio::test]
    async fn deregister_removes_connection() {
        let registry = WsRegistry::new();
        let family = Uuid::new_v4();
        let (conn_id, _rx) = registry.register(family);
        registry.deregister(family, conn_id);
        assert_eq!(registry.subscriber_count(family), 0);
    }
}
