//! Communication channels (chat bridge).
//!
//! Channel trait and registry so the server can start/stop transports and the router can
//! send replies. Transports turn their native events into `SessionEvent`s for the session manager.

mod bridge;
mod inbound;
mod registry;

pub use bridge::{BridgeChannel, BridgeEvent, BridgeLocation, BridgeMessage, BRIDGE_CHANNEL_ID};
pub use inbound::{InboundMessage, MessageKind, SessionEvent};
pub use registry::{ChannelHandle, ChannelRegistry};
