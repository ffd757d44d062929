//! Gateway: the relay's HTTP surface.
//!
//! One port serves the pairing endpoint, the bridge webhook, a health probe, and the public directory.

mod pairing;
mod server;

pub use pairing::{render_data_url, PairingSlot, RenderError};
pub use server::{router, run_server, AppState, BRIDGE_SECRET_HEADER, QR_NOT_READY_MESSAGE};
