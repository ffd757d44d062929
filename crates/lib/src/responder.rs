//! Reply selection: turn the remote reply lookup into the text sent back to the sender.

use crate::config::RepliesConfig;
use crate::remote::{RemoteEndpoint, RemoteError};

/// Query string sent to the endpoint for a message body.
pub fn reply_query(body: &str) -> String {
    body.to_lowercase()
}

/// Replace literal `\n` (backslash, n) sequences with real newlines.
pub fn unescape_newlines(text: &str) -> String {
    text.replace("\\n", "\n")
}

/// Pick the outgoing text for a reply lookup result.
pub fn reply_text(result: Result<Option<String>, RemoteError>, replies: &RepliesConfig) -> String {
    match result {
        Ok(Some(text)) => unescape_newlines(&text),
        Ok(None) => replies.default_greeting.clone(),
        Err(e) => {
            log::warn!("error fetching response: {}", e);
            replies.fallback.clone()
        }
    }
}

/// Fetch the reply for `body` and resolve it to the text to send. Never fails.
pub async fn resolve_reply(endpoint: &dyn RemoteEndpoint, body: &str, replies: &RepliesConfig) -> String {
    let result = endpoint.fetch_reply(&reply_query(body)).await;
    reply_text(result, replies)
}
