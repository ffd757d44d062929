//! Channel registry: register and lookup transports by id.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Handle to a running transport (stop, send message).
#[async_trait]
pub trait ChannelHandle: Send + Sync {
    /// Channel id (e.g. "bridge").
    fn id(&self) -> &str;
    /// Stop the transport.
    fn stop(&self);
    /// Send a text message to a chat (e.g. the sender of an inbound message). Default returns error.
    async fn send_message(&self, _to: &str, _text: &str) -> Result<(), String> {
        Err("send not implemented".to_string())
    }
}

/// Registry of channel ids to handles. Shared between the router and shutdown.
pub struct ChannelRegistry {
    inner: Arc<RwLock<HashMap<String, Arc<dyn ChannelHandle>>>>,
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a handle; a previous handle under the same id is stopped.
    pub async fn register(&self, id: String, handle: Arc<dyn ChannelHandle>) {
        let mut g = self.inner.write().await;
        if let Some(old) = g.insert(id, handle) {
            old.stop();
        }
    }

    pub async fn get(&self, id: &str) -> Option<Arc<dyn ChannelHandle>> {
        let g = self.inner.read().await;
        g.get(id).cloned()
    }

    pub async fn ids(&self) -> Vec<String> {
        let g = self.inner.read().await;
        g.keys().cloned().collect()
    }

    /// Stop every registered transport.
    pub async fn stop_all(&self) {
        let g = self.inner.read().await;
        for handle in g.values() {
            handle.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct Dummy {
        id: String,
        stopped: AtomicBool,
    }

    #[async_trait]
    impl ChannelHandle for Dummy {
        fn id(&self) -> &str {
            &self.id
        }

        fn stop(&self) {
            self.stopped.store(true, Ordering::SeqCst);
        }
    }

    fn dummy(id: &str) -> Arc<Dummy> {
        Arc::new(Dummy {
            id: id.to_string(),
            stopped: AtomicBool::new(false),
        })
    }

    #[tokio::test]
    async fn register_replaces_and_stops_previous() {
        let registry = ChannelRegistry::new();
        let first = dummy("bridge");
        let second = dummy("bridge");
        registry.register("bridge".to_string(), first.clone()).await;
        registry.register("bridge".to_string(), second.clone()).await;
        assert!(first.stopped.load(Ordering::SeqCst));
        assert!(!second.stopped.load(Ordering::SeqCst));
        assert_eq!(registry.ids().await, vec!["bridge".to_string()]);
    }

    #[tokio::test]
    async fn default_send_message_errors() {
        let registry = ChannelRegistry::new();
        registry.register("bridge".to_string(), dummy("bridge")).await;
        let handle = registry.get("bridge").await.unwrap();
        assert!(handle.send_message("someone", "hi").await.is_err());
        assert!(registry.get("missing").await.is_none());
    }
}
