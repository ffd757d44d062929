//! Message routing: location messages are logged and dropped, everything else is logged and answered.

use async_trait::async_trait;
use std::sync::Arc;

use crate::channels::{ChannelRegistry, InboundMessage, MessageKind};
use crate::config::RepliesConfig;
use crate::remote::RemoteEndpoint;
use crate::responder;

/// Handles one inbound message. Invoked by the session manager for every message that passes
/// the self-message filter.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, msg: InboundMessage);
}

/// Routes inbound messages to the remote endpoint and sends replies back on the originating channel.
pub struct MessageRouter {
    endpoint: Arc<dyn RemoteEndpoint>,
    channels: Arc<ChannelRegistry>,
    replies: RepliesConfig,
    reply_on_log_failure: bool,
}

impl MessageRouter {
    pub fn new(
        endpoint: Arc<dyn RemoteEndpoint>,
        channels: Arc<ChannelRegistry>,
        replies: RepliesConfig,
        reply_on_log_failure: bool,
    ) -> Self {
        Self {
            endpoint,
            channels,
            replies,
            reply_on_log_failure,
        }
    }

    async fn log_location(&self, latitude: f64, longitude: f64) {
        log::info!("received location: latitude {}, longitude {}", latitude, longitude);
        match self.endpoint.log_location(latitude, longitude).await {
            Ok(data) => log::info!("location saved: {}", data),
            Err(e) => log::warn!("error saving location: {}", e),
        }
    }

    /// Returns whether the endpoint acknowledged the message.
    async fn log_message(&self, body: &str) -> bool {
        match self.endpoint.log_message(body).await {
            Ok(data) => {
                log::info!("message saved: {}", data);
                true
            }
            Err(e) => {
                log::warn!("error saving message: {}", e);
                false
            }
        }
    }

    async fn respond(&self, msg: &InboundMessage) {
        let reply = responder::resolve_reply(self.endpoint.as_ref(), &msg.body, &self.replies).await;
        let Some(handle) = self.channels.get(&msg.channel_id).await else {
            log::warn!("reply dropped: channel {} not registered", msg.channel_id);
            return;
        };
        if let Err(e) = handle.send_message(&msg.sender, &reply).await {
            log::warn!("send_message to {} failed: {}", msg.sender, e);
        }
    }
}

#[async_trait]
impl MessageHandler for MessageRouter {
    async fn handle(&self, msg: InboundMessage) {
        log::info!("{}", msg.body);
        match &msg.kind {
            MessageKind::Location { latitude, longitude } => {
                self.log_location(*latitude, *longitude).await;
            }
            MessageKind::Text | MessageKind::Other(_) => {
                let logged = self.log_message(&msg.body).await;
                if !logged && !self.reply_on_log_failure {
                    log::debug!("skipping reply to {}: logging failed", msg.sender);
                    return;
                }
                self.respond(&msg).await;
            }
        }
    }
}
