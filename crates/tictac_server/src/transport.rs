//! axum transport: WebSocket endpoint, health check, static files.

use crate::{ConnectionIds, Lobby, RoomError, ServerConfig, Session, SharedSession};
use anyhow::{Context, Result};
use axum::Router;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use futures::{SinkExt, StreamExt};
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, instrument, warn};

/// Path of the WebSocket endpoint.
pub const WS_PATH: &str = "/ws";

/// Path of the liveness check.
pub const HEALTH_PATH: &str = "/health";

/// Body returned by the liveness check.
pub const HEALTH_BODY: &str = r#"{ "ok": true }"#;

/// State shared by every request handler.
#[derive(Debug, Clone)]
pub struct AppState {
    session: SharedSession,
    ids: Arc<ConnectionIds>,
}

impl AppState {
    /// Wraps a session.
    pub fn new(session: SharedSession) -> Self {
        Self {
            session,
            ids: Arc::new(ConnectionIds::new()),
        }
    }

    /// The shared session.
    pub fn session(&self) -> &SharedSession {
        &self.session
    }
}

/// Builds the HTTP router.
pub fn router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route(HEALTH_PATH, get(health))
        .route(WS_PATH, get(ws_handler))
        .fallback_service(ServeDir::new(static_dir.as_ref()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds the configured address and serves until ctrl-c.
#[instrument(skip_all, fields(addr = %config.bind_addr()))]
pub async fn serve(config: ServerConfig) -> Result<()> {
    let listener = TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr()))?;
    let local = listener.local_addr()?;
    info!(%local, "Server listening");

    let state = AppState::new(Session::shared(Lobby::new()));
    let app = router(state, config.static_dir());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

async fn health() -> Response {
    ([(header::CONTENT_TYPE, "application/json")], HEALTH_BODY).into_response()
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Runs one connection: a writer task drains the mailbox while this task
/// feeds inbound frames to the session, one lock acquisition per frame.
#[instrument(skip_all, fields(conn))]
async fn handle_socket(socket: WebSocket, state: AppState) {
    let conn = state.ids.next();
    tracing::Span::current().record("conn", tracing::field::display(conn));

    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();
    state.session.lock().await.connect(conn, tx);

    let writer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let text = match serde_json::to_string(&message) {
                Ok(text) => text,
                Err(e) => {
                    error!(error = %e, "Failed to encode outbound frame");
                    continue;
                }
            };
            if let Err(e) = sink.send(Message::Text(text.into())).await {
                debug!(error = %e, "Socket write failed");
                break;
            }
        }
        sink.close().await.ok();
    });

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => state.session.lock().await.dispatch(conn, text.as_str()),
            Ok(Message::Binary(bytes)) => {
                debug!(len = bytes.len(), "Binary frame");
                state
                    .session
                    .lock()
                    .await
                    .reject(conn, RoomError::InvalidMessageFormat);
            }
            Ok(Message::Close(_)) => break,
            Ok(Message::Ping(_) | Message::Pong(_)) => {}
            Err(e) => {
                warn!(error = %e, "Socket read failed");
                break;
            }
        }
    }

    state.session.lock().await.disconnect(conn);
    if let Err(e) = writer.await {
        warn!(error = %e, "Writer task failed");
    }
}
