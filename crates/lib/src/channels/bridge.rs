//! Chat bridge channel: the bridge process owns the chat-network session, pushes events to
//! our webhook (POST /bridge/events) and accepts replies on `POST {baseUrl}/messages`.

use crate::channels::inbound::{InboundMessage, MessageKind, SessionEvent};
use crate::channels::registry::ChannelHandle;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};

/// Registry id of the bridge channel.
pub const BRIDGE_CHANNEL_ID: &str = "bridge";

/// Webhook payload, tagged by `event`.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BridgeEvent {
    /// New pairing code to render as QR.
    Qr { qr: String },
    /// Session established; `wid` is the bot's own serialized chat id.
    Ready { wid: String },
    /// A message was created in one of the bot's chats.
    Message { message: BridgeMessage },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
pub struct BridgeMessage {
    pub from: String,
    #[serde(default)]
    pub body: String,
    #[serde(rename = "type", default = "default_message_type")]
    pub kind: String,
    #[serde(default)]
    pub location: Option<BridgeLocation>,
}

#[derive(Debug, Deserialize)]
pub struct BridgeLocation {
    pub latitude: f64,
    pub longitude: f64,
}

fn default_message_type() -> String {
    "chat".to_string()
}

impl BridgeMessage {
    /// Convert to an inbound message. A location message without coordinates is dropped.
    pub fn into_inbound(self) -> Option<InboundMessage> {
        let kind = match self.kind.as_str() {
            "chat" | "text" => MessageKind::Text,
            "location" => match self.location {
                Some(loc) => MessageKind::Location {
                    latitude: loc.latitude,
                    longitude: loc.longitude,
                },
                None => {
                    log::warn!("bridge: location message from {} without coordinates, dropping", self.from);
                    return None;
                }
            },
            other => MessageKind::Other(other.to_string()),
        };
        Some(InboundMessage {
            channel_id: BRIDGE_CHANNEL_ID.to_string(),
            sender: self.from,
            body: self.body,
            kind,
        })
    }
}

impl BridgeEvent {
    /// Map a webhook payload to a session event. Unknown events and undeliverable messages yield None.
    pub fn into_session_event(self) -> Option<SessionEvent> {
        match self {
            BridgeEvent::Qr { qr } => Some(SessionEvent::PairingCode(qr)),
            BridgeEvent::Ready { wid } => Some(SessionEvent::Ready { own_id: wid }),
            BridgeEvent::Message { message } => message.into_inbound().map(SessionEvent::Message),
            BridgeEvent::Unknown => None,
        }
    }
}

/// Bridge channel connector: sends replies through the bridge HTTP API.
pub struct BridgeChannel {
    id: String,
    base_url: Option<String>,
    token: Option<String>,
    running: AtomicBool,
    client: reqwest::Client,
}

impl BridgeChannel {
    pub fn new(base_url: Option<String>, token: Option<String>) -> Self {
        Self {
            id: BRIDGE_CHANNEL_ID.to_string(),
            base_url: base_url.map(|u| u.trim_end_matches('/').to_string()),
            token,
            running: AtomicBool::new(true),
            client: reqwest::Client::new(),
        }
    }

    /// False once stopped; the webhook refuses events from then on.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Send a text message to a chat via the bridge's messages API.
    pub async fn send_message(&self, to: &str, text: &str) -> Result<(), String> {
        let base = self
            .base_url
            .as_ref()
            .ok_or("bridge base url not configured")?;
        let url = format!("{}/messages", base);
        let body = serde_json::json!({ "to": to, "text": text });
        let mut req = self.client.post(&url).json(&body);
        if let Some(ref token) = self.token {
            req = req.bearer_auth(token);
        }
        let res = req.send().await.map_err(|e| e.to_string())?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(format!("send message failed: {} {}", status, body));
        }
        Ok(())
    }
}

#[async_trait]
impl ChannelHandle for BridgeChannel {
    fn id(&self) -> &str {
        &self.id
    }

    fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    async fn send_message(&self, to: &str, text: &str) -> Result<(), String> {
        BridgeChannel::send_message(self, to, text).await
    }
}
