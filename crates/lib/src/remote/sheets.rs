//! Spreadsheet script client: one endpoint URL that accepts logging POSTs and answers reply queries.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use super::RemoteEndpoint;

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("remote request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("remote api error: {0}")]
    Api(String),
    #[error("remote response is not valid json: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Body of the reply query response. Only `response` is read.
#[derive(Debug, Deserialize)]
struct ReplyPayload {
    #[serde(default)]
    response: Option<Value>,
}

/// Client for the spreadsheet script endpoint.
#[derive(Clone)]
pub struct SheetClient {
    endpoint_url: String,
    client: reqwest::Client,
}

impl SheetClient {
    /// Build a client for `endpoint_url`. With `timeout` unset, requests wait indefinitely.
    pub fn new(endpoint_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, RemoteError> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        Ok(Self {
            endpoint_url: endpoint_url.into(),
            client: builder.build()?,
        })
    }

    /// POST a JSON body to the endpoint and return the parsed JSON response.
    async fn post_json(&self, body: &Value) -> Result<Value, RemoteError> {
        let res = self.client.post(&self.endpoint_url).json(body).send().await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(RemoteError::Api(format!("{} {}", status, body)));
        }
        let text = res.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl RemoteEndpoint for SheetClient {
    /// POST `{"message": text}`.
    async fn log_message(&self, text: &str) -> Result<Value, RemoteError> {
        self.post_json(&json!({ "message": text })).await
    }

    /// POST `{"latitude": .., "longitude": ..}`.
    async fn log_location(&self, latitude: f64, longitude: f64) -> Result<Value, RemoteError> {
        self.post_json(&json!({ "latitude": latitude, "longitude": longitude }))
            .await
    }

    /// GET `?query=<url-encoded query>`. Ok(None) when the response has no usable `response` field.
    async fn fetch_reply(&self, query: &str) -> Result<Option<String>, RemoteError> {
        let res = self
            .client
            .get(&self.endpoint_url)
            .query(&[("query", query)])
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(RemoteError::Api(format!("{} {}", status, body)));
        }
        let text = res.text().await?;
        let payload: ReplyPayload = serde_json::from_str(&text)?;
        match payload.response {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(other) => Err(RemoteError::Api(format!(
                "response field is not a string: {}",
                other
            ))),
        }
    }
}
