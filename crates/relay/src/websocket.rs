//! HTTP-Seite des Relays
//!
//! ## Endpunkte
//! - `GET /ws/{*kanal}` - WebSocket-Upgrade; der gesamte Restpfad ist die
//!   Kanal-ID (Standard-Base64 darf `/` enthalten)
//! - `GET /health` - Health-Check JSON
//! - `GET /metrics` - Prometheus-Textformat (abschaltbar)

use axum::{
    extract::{ws::WebSocketUpgrade, Path, State},
    response::Response,
    routing::get,
    Router,
};
use offrecord_core::ChannelId;
use offrecord_observability::{health_router, metrics_router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::connection::ClientConnection;
use crate::error::RelayResult;
use crate::heartbeat::heartbeat_starten;
use crate::server_state::RelayState;

/// Baut den kompletten HTTP-Router des Relays
pub fn router(state: Arc<RelayState>) -> Router {
    let mut router = Router::new()
        .route("/ws/{*kanal}", get(ws_handler))
        .with_state(Arc::clone(&state))
        .merge(health_router(state.metriken.clone()));

    if state.config.metriken_aktiviert {
        router = router.merge(metrics_router(state.metriken.clone()));
    }

    router.layer(TraceLayer::new_for_http())
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(kanal): Path<String>,
    State(state): State<Arc<RelayState>>,
) -> Response {
    let limit = state.config.transport_limit();
    let kanal_id = ChannelId::new(kanal);

    ws.max_message_size(limit)
        .max_frame_size(limit)
        .on_upgrade(move |socket| async move {
            let shutdown_rx = state.shutdown_rx.clone();
            ClientConnection::neu(state, kanal_id)
                .verarbeiten(socket, shutdown_rx)
                .await;
        })
}

// ---------------------------------------------------------------------------
// RelayServer
// ---------------------------------------------------------------------------

/// Bindet den TCP-Socket und bedient den Router
pub struct RelayServer {
    state: Arc<RelayState>,
    bind_addr: SocketAddr,
}

impl RelayServer {
    pub fn neu(state: Arc<RelayState>, bind_addr: SocketAddr) -> Self {
        Self { state, bind_addr }
    }

    /// Bindet und laeuft bis `shutdown_rx` ein `true`-Signal empfaengt
    pub async fn starten(self) -> RelayResult<()> {
        let listener = TcpListener::bind(self.bind_addr).await?;
        self.mit_listener(listener).await
    }

    /// Wie `starten`, aber auf einem bereits gebundenen Socket
    pub async fn mit_listener(self, listener: TcpListener) -> RelayResult<()> {
        let lokale_addr = listener.local_addr()?;
        tracing::info!(adresse = %lokale_addr, "Relay gestartet");

        let heartbeat = heartbeat_starten(
            Arc::clone(&self.state.registry),
            self.state.config.heartbeat_intervall(),
            self.state.shutdown_rx.clone(),
        );

        let mut shutdown_rx = self.state.shutdown_rx.clone();
        axum::serve(listener, router(Arc::clone(&self.state)))
            .with_graceful_shutdown(async move {
                while !*shutdown_rx.borrow_and_update() {
                    if shutdown_rx.changed().await.is_err() {
                        break;
                    }
                }
            })
            .await?;

        let _ = heartbeat.await;
        tracing::info!("Relay gestoppt");
        Ok(())
    }

    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
