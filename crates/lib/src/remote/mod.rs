//! Remote endpoint abstraction and the spreadsheet script client.
//!
//! The same endpoint logs messages and locations (POST) and supplies reply text (GET).

mod sheets;

use async_trait::async_trait;
use serde_json::Value;

pub use sheets::{RemoteError, SheetClient};

/// Operations the router needs from the remote endpoint.
#[async_trait]
pub trait RemoteEndpoint: Send + Sync {
    /// Log a message body. Returns the endpoint's JSON acknowledgement.
    async fn log_message(&self, text: &str) -> Result<Value, RemoteError>;

    /// Log a shared location.
    async fn log_location(&self, latitude: f64, longitude: f64) -> Result<Value, RemoteError>;

    /// Ask for the reply to `query`. `None` means the endpoint had no reply text.
    async fn fetch_reply(&self, query: &str) -> Result<Option<String>, RemoteError>;
}
