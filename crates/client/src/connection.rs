//! Client-seitige WebSocket-Verbindung zum Relay
//!
//! Sendet verschluesselte Umschlaege als Binaer-Frames und liest die
//! JSON-Nachrichten des Relays.

use futures_util::{SinkExt, StreamExt};
use offrecord_protocol::frame::LEEREN_FRAME;
use offrecord_protocol::{ServerNachricht, Umschlag};
use std::sync::Once;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::error::{ClientError, ClientResult};

static TLS_PROVIDER: Once = Once::new();

/// Installiert den rustls-Krypto-Provider fuer `wss://`
fn tls_initialisieren() {
    TLS_PROVIDER.call_once(|| {
        // Schlaegt fehl, wenn bereits ein Provider installiert ist
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Offene Verbindung zu einem Kanal
pub struct RelayVerbindung {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
    url: String,
}

impl RelayVerbindung {
    /// Baut die WebSocket-Verbindung auf
    pub async fn verbinden(url: &str) -> ClientResult<Self> {
        tls_initialisieren();
        tracing::debug!(url = %url, "Verbinde mit Relay");
        let (ws, _antwort) = connect_async(url).await?;
        tracing::info!("Mit Relay verbunden");
        Ok(Self {
            ws,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Sendet einen Umschlag als CBOR-Binaer-Frame
    pub async fn umschlag_senden(&mut self, umschlag: &Umschlag) -> ClientResult<()> {
        let bytes = umschlag.kodieren()?;
        self.ws.send(Message::binary(bytes)).await?;
        Ok(())
    }

    /// Fordert das Leeren des Kanals an
    pub async fn leeren_senden(&mut self) -> ClientResult<()> {
        self.ws.send(Message::text(LEEREN_FRAME)).await?;
        Ok(())
    }

    /// Wartet auf die naechste Nachricht des Relays
    ///
    /// `Ok(None)` bei regulaerem Ende der Verbindung.
    pub async fn empfangen(&mut self) -> ClientResult<Option<ServerNachricht>> {
        while let Some(nachricht) = self.ws.next().await {
            match nachricht? {
                Message::Text(text) => {
                    let nachricht = ServerNachricht::aus_json(text.as_str())
                        .map_err(|e| ClientError::Protokoll(e.to_string()))?;
                    return Ok(Some(nachricht));
                }
                Message::Close(Some(frame)) if frame.code != CloseCode::Normal => {
                    return Err(ClientError::VomRelayGeschlossen {
                        code: u16::from(frame.code),
                        grund: frame.reason.as_str().to_string(),
                    });
                }
                Message::Close(_) => return Ok(None),
                // Ping/Pong beantwortet tungstenite selbst
                _ => continue,
            }
        }
        Ok(None)
    }

    /// Schliesst die Verbindung regulaer
    pub async fn schliessen(mut self) -> ClientResult<()> {
        match self.ws.close(None).await {
            Ok(())
            | Err(tokio_tungstenite::tungstenite::Error::ConnectionClosed)
            | Err(tokio_tungstenite::tungstenite::Error::AlreadyClosed) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
