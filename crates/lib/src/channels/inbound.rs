//! Inbound message and session events: what a transport delivers to the session manager.

/// Content kind of an inbound message. Only location is routed differently; every other
/// kind goes through the text path using whatever body it carries.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageKind {
    Text,
    Location { latitude: f64, longitude: f64 },
    /// Media, stickers and anything else, with the transport's type tag.
    Other(String),
}

/// A message from a channel, scoped to a single event.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub channel_id: String,
    /// Sender identifier; replies are addressed to it.
    pub sender: String,
    /// Body text (may be empty, e.g. for media).
    pub body: String,
    pub kind: MessageKind,
}

impl InboundMessage {
    pub fn text(channel_id: impl Into<String>, sender: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            sender: sender.into(),
            body: body.into(),
            kind: MessageKind::Text,
        }
    }

    pub fn location(
        channel_id: impl Into<String>,
        sender: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            channel_id: channel_id.into(),
            sender: sender.into(),
            body: String::new(),
            kind: MessageKind::Location { latitude, longitude },
        }
    }
}

/// Lifecycle and message events emitted by a transport.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The chat network issued a new pairing code (raw string, not yet rendered).
    PairingCode(String),
    /// The session is established; `own_id` is the bot's own chat identifier.
    Ready { own_id: String },
    Message(InboundMessage),
}
