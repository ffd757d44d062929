//! HTTP server: pairing endpoint, bridge webhook, health, and static files (single port).

use crate::channels::{BridgeChannel, BridgeEvent, ChannelHandle, ChannelRegistry, SessionEvent};
use crate::config::{self, Config};
use crate::gateway::pairing::PairingSlot;
use crate::remote::SheetClient;
use crate::routing::MessageRouter;
use crate::session::SessionManager;
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tower_http::services::ServeDir;

/// Body of the 404 returned before any pairing code arrived.
pub const QR_NOT_READY_MESSAGE: &str = "QR code not available yet.";

/// Header carrying the bridge webhook secret.
pub const BRIDGE_SECRET_HEADER: &str = "X-Bridge-Secret";

const EVENT_QUEUE_CAPACITY: usize = 64;

/// Shared state for the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Port reported by the health endpoint.
    pub port: u16,
    pub pairing: Arc<PairingSlot>,
    pub session: Arc<SessionManager>,
    pub bridge: Arc<BridgeChannel>,
    /// Queue into the session manager; the webhook pushes parsed bridge events here.
    pub event_tx: mpsc::Sender<SessionEvent>,
    /// When Some, webhook requests must carry this value in X-Bridge-Secret.
    pub webhook_secret: Option<String>,
}

/// Build the router: API routes plus static files from `public_dir` for everything else.
pub fn router(state: AppState, public_dir: &Path) -> Router {
    Router::new()
        .route("/api/qr-code", get(qr_code))
        .route("/api/health", get(health_http))
        .route("/bridge/events", post(bridge_events))
        .fallback_service(ServeDir::new(public_dir))
        .with_state(state)
}

/// Run the relay: wire the bridge transport, session manager and router, then serve HTTP on
/// `server.bind:server.port` until SIGINT/SIGTERM.
/// `config_path` locates the default public directory.
pub async fn run_server(config: Config, config_path: PathBuf) -> Result<()> {
    let endpoint_url = config::resolve_endpoint_url(&config).context(
        "remote endpoint not configured (set remote.endpointUrl or SHEETRELAY_ENDPOINT_URL)",
    )?;
    let timeout = config.remote.timeout_secs.map(Duration::from_secs);
    let endpoint = SheetClient::new(endpoint_url, timeout).context("building remote endpoint client")?;
    if timeout.is_none() {
        log::debug!("no remote timeout configured; requests may wait indefinitely");
    }

    let bind = config.server.bind.trim().to_string();
    let port = config.server.port;
    let bridge_config = &config.channels.bridge;
    if bridge_config.base_url.is_none() {
        log::warn!("channels.bridge.baseUrl not set; replies cannot be delivered");
    }
    if bridge_config.webhook_secret.is_none() && !config::is_loopback_bind(&bind) {
        log::warn!("bridge webhook is reachable on {} without a secret (set channels.bridge.webhookSecret)", bind);
    }

    let bridge = Arc::new(BridgeChannel::new(
        bridge_config.base_url.clone(),
        config::resolve_bridge_token(&config),
    ));
    let channel_registry = Arc::new(ChannelRegistry::new());
    channel_registry
        .register(bridge.id().to_string(), bridge.clone())
        .await;

    let pairing = Arc::new(PairingSlot::new());
    let message_router = Arc::new(MessageRouter::new(
        Arc::new(endpoint),
        channel_registry.clone(),
        config.replies.clone(),
        config.remote.reply_on_log_failure,
    ));
    let session = Arc::new(SessionManager::new(
        bridge.clone(),
        pairing.clone(),
        message_router,
        bridge_config.own_id.clone(),
    ));
    let (event_tx, event_rx) = mpsc::channel::<SessionEvent>(EVENT_QUEUE_CAPACITY);
    let session_task = session.clone().start(event_rx);

    let state = AppState {
        port,
        pairing,
        session,
        bridge,
        event_tx,
        webhook_secret: bridge_config.webhook_secret.clone(),
    };
    let public_dir = config::resolve_public_dir(&config, &config_path);
    if !public_dir.exists() {
        log::warn!("public directory {} does not exist; static files will 404", public_dir.display());
    }
    let app = router(state, &public_dir);

    let bind_addr = format!("{}:{}", bind, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("server is running on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(channel_registry))
        .await
        .context("server exited")?;
    let _ = session_task.await;
    log::info!("server stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM). Stops all transports.
async fn shutdown_signal(channel_registry: Arc<ChannelRegistry>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                log::warn!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, stopping transports");
    channel_registry.stop_all().await;
}

/// GET /api/qr-code: the stored pairing image, or 404 until one arrives.
async fn qr_code(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.pairing.current().await {
        Some(url) => (StatusCode::OK, Json(json!({ "qrCode": url }))),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": QR_NOT_READY_MESSAGE })),
        ),
    }
}

/// GET /api/health returns a simple health JSON (for probes).
async fn health_http(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "runtime": "running",
        "port": state.port,
        "ready": state.session.is_ready(),
        "paired": state.pairing.is_available().await,
    }))
}

/// POST /bridge/events: receives bridge event JSON; verifies optional secret, queues the session event.
async fn bridge_events(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    if let Some(ref expected) = state.webhook_secret {
        let provided = headers
            .get(BRIDGE_SECRET_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if provided != expected.as_str() {
            return StatusCode::FORBIDDEN;
        }
    }
    if !state.bridge.is_running() {
        return StatusCode::SERVICE_UNAVAILABLE;
    }
    let event: BridgeEvent = match serde_json::from_slice(&body) {
        Ok(e) => e,
        Err(e) => {
            log::debug!("bridge webhook: invalid payload: {}", e);
            return StatusCode::BAD_REQUEST;
        }
    };
    let Some(event) = event.into_session_event() else {
        return StatusCode::OK;
    };
    if state.event_tx.send(event).await.is_err() {
        return StatusCode::SERVICE_UNAVAILABLE;
    }
    StatusCode::OK
}
