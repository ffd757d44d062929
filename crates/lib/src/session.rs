//! Session manager: owns the chat transport and applies its events.
//!
//! Pairing codes are rendered into the pairing slot, ready events record the bot's own id,
//! and inbound messages go to the message handler unless the bot sent them itself.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;

use crate::channels::{ChannelHandle, InboundMessage, SessionEvent};
use crate::gateway::{render_data_url, PairingSlot};
use crate::routing::MessageHandler;

pub struct SessionManager {
    transport: Arc<dyn ChannelHandle>,
    pairing: Arc<PairingSlot>,
    handler: Arc<dyn MessageHandler>,
    own_id: RwLock<Option<String>>,
    ready: AtomicBool,
}

impl SessionManager {
    /// `own_id` seeds the self-message filter before the transport reports ready.
    pub fn new(
        transport: Arc<dyn ChannelHandle>,
        pairing: Arc<PairingSlot>,
        handler: Arc<dyn MessageHandler>,
        own_id: Option<String>,
    ) -> Self {
        Self {
            transport,
            pairing,
            handler,
            own_id: RwLock::new(own_id),
            ready: AtomicBool::new(false),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    pub async fn own_id(&self) -> Option<String> {
        self.own_id.read().await.clone()
    }

    /// Apply one event and wait for it to finish (including message handling).
    pub async fn handle_event(&self, event: SessionEvent) {
        match event {
            SessionEvent::PairingCode(code) => self.on_pairing_code(&code).await,
            SessionEvent::Ready { own_id } => self.on_ready(own_id).await,
            SessionEvent::Message(msg) => self.on_message(msg).await,
        }
    }

    async fn on_pairing_code(&self, code: &str) {
        match render_data_url(code) {
            Ok(url) => {
                self.pairing.store(url).await;
                log::info!("pairing code received; scan it at /api/qr-code");
            }
            Err(e) => log::warn!("error generating QR code: {}", e),
        }
    }

    async fn on_ready(&self, own_id: String) {
        *self.own_id.write().await = Some(own_id);
        self.ready.store(true, Ordering::SeqCst);
        log::info!("client is ready on {}", self.transport.id());
    }

    /// True when `sender` is the bot's own identifier.
    async fn is_own_message(&self, sender: &str) -> bool {
        self.own_id.read().await.as_deref() == Some(sender)
    }

    async fn on_message(&self, msg: InboundMessage) {
        if self.is_own_message(&msg.sender).await {
            log::debug!("ignoring own message on {}", msg.channel_id);
            return;
        }
        self.handler.handle(msg).await;
    }

    /// Consume events until the sender side closes. Pairing and ready events are applied in order;
    /// each message is handled on its own task.
    pub fn start(self: Arc<Self>, mut events: mpsc::Receiver<SessionEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                match event {
                    SessionEvent::Message(msg) => {
                        let manager = self.clone();
                        tokio::spawn(async move {
                            manager.on_message(msg).await;
                        });
                    }
                    other => self.handle_event(other).await,
                }
            }
            log::debug!("session event queue closed");
        })
    }
}
