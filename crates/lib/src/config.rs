//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.sheetrelay/config.json`) and environment.
//! Every field is optional; a missing file yields the defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Reply sent when the remote endpoint answers without a `response` field.
pub const DEFAULT_GREETING: &str = "Hello, how can I assist you?";

/// Reply sent when the reply fetch fails (network, status, or parse error).
pub const DEFAULT_FALLBACK: &str = "Sorry, I could not process your request.";

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// HTTP server settings (pairing endpoint, webhook, static files).
    #[serde(default)]
    pub server: ServerConfig,

    /// Remote spreadsheet endpoint used for logging and replies.
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Transport settings (chat bridge).
    #[serde(default)]
    pub channels: ChannelsConfig,

    /// Canned reply texts.
    #[serde(default)]
    pub replies: RepliesConfig,
}

/// Server bind, port, and static file root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// HTTP port (default 3000). Overridden by PORT env.
    #[serde(default = "default_server_port")]
    pub port: u16,

    /// Bind address (default "0.0.0.0").
    #[serde(default = "default_server_bind")]
    pub bind: String,

    /// Directory served for every path not handled by the API. Relative paths are resolved
    /// against the config file's parent. Default: `public` next to the config file.
    #[serde(default)]
    pub public_dir: Option<PathBuf>,
}

fn default_server_port() -> u16 {
    3000
}

fn default_server_bind() -> String {
    "0.0.0.0".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
            bind: default_server_bind(),
            public_dir: None,
        }
    }
}

/// Remote endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteConfig {
    /// Script URL that accepts the logging POSTs and the reply GET. Overridden by SHEETRELAY_ENDPOINT_URL env.
    pub endpoint_url: Option<String>,

    /// Per-request timeout in seconds. Unset means requests may wait indefinitely.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// When false, a text message whose logging call failed gets no reply.
    #[serde(default = "default_true")]
    pub reply_on_log_failure: bool,
}

fn default_true() -> bool {
    true
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint_url: None,
            timeout_secs: None,
            reply_on_log_failure: true,
        }
    }
}

/// Per-transport config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelsConfig {
    #[serde(default)]
    pub bridge: BridgeChannelConfig,
}

/// Chat bridge config: where replies are sent and how webhook events are verified.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeChannelConfig {
    /// Bridge API base URL (e.g. "http://127.0.0.1:8080"). Replies go to `{baseUrl}/messages`.
    pub base_url: Option<String>,
    /// Bearer token for the bridge API. Overridden by BRIDGE_TOKEN env.
    pub token: Option<String>,
    /// When set, POST /bridge/events must carry a matching X-Bridge-Secret header.
    pub webhook_secret: Option<String>,
    /// Bot's own chat id. Normally learned from the bridge's ready event.
    pub own_id: Option<String>,
}

/// Canned replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepliesConfig {
    #[serde(default = "default_greeting")]
    pub default_greeting: String,
    #[serde(default = "default_fallback")]
    pub fallback: String,
}

fn default_greeting() -> String {
    DEFAULT_GREETING.to_string()
}

fn default_fallback() -> String {
    DEFAULT_FALLBACK.to_string()
}

impl Default for RepliesConfig {
    fn default() -> Self {
        Self {
            default_greeting: default_greeting(),
            fallback: default_fallback(),
        }
    }
}

/// Trimmed, non-empty env var value.
fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|s| {
        let t = s.trim();
        if t.is_empty() {
            None
        } else {
            Some(t.to_string())
        }
    })
}

fn trimmed(value: Option<&String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Resolve the HTTP port: env PORT overrides config. An unparsable PORT is ignored.
pub fn resolve_port(config: &Config) -> u16 {
    match env_non_empty("PORT") {
        Some(p) => p.parse().unwrap_or_else(|_| {
            log::warn!("ignoring invalid PORT value {:?}", p);
            config.server.port
        }),
        None => config.server.port,
    }
}

/// Resolve the remote endpoint URL: env SHEETRELAY_ENDPOINT_URL overrides config.
pub fn resolve_endpoint_url(config: &Config) -> Option<String> {
    env_non_empty("SHEETRELAY_ENDPOINT_URL").or_else(|| trimmed(config.remote.endpoint_url.as_ref()))
}

/// Resolve the bridge bearer token: env BRIDGE_TOKEN overrides config.
pub fn resolve_bridge_token(config: &Config) -> Option<String> {
    env_non_empty("BRIDGE_TOKEN").or_else(|| trimmed(config.channels.bridge.token.as_ref()))
}

/// True if the bind address is loopback (127.0.0.1, ::1, etc.).
pub fn is_loopback_bind(bind: &str) -> bool {
    let b = bind.trim();
    b == "127.0.0.1" || b == "::1" || b == "localhost"
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("SHEETRELAY_CONFIG_PATH").map(PathBuf::from).unwrap_or_else(|_| {
        dirs::home_dir()
            .map(|h| h.join(".sheetrelay").join("config.json"))
            .unwrap_or_else(|| PathBuf::from("config.json"))
    })
}

/// Load config from the given path, or the default path (or SHEETRELAY_CONFIG_PATH). Missing file => default config.
/// The PORT env override is applied to `server.port`.
/// Returns the config and the path that was used (for resolving the public directory).
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let mut config: Config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    config.server.port = resolve_port(&config);
    Ok((config, path))
}

fn config_parent(config_path: &Path) -> &Path {
    config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

/// Resolve the static file root: `server.publicDir` if set (relative paths resolved against the
/// config file's parent), otherwise `public` next to the config file.
pub fn resolve_public_dir(config: &Config, config_path: &Path) -> PathBuf {
    let parent = config_parent(config_path);
    match &config.server.public_dir {
        Some(d) if !d.as_os_str().is_empty() => {
            if d.is_absolute() {
                d.clone()
            } else {
                parent.join(d)
            }
        }
        _ => parent.join("public"),
    }
}
