//! Client-Connection - Verwaltet eine einzelne WebSocket-Verbindung
//!
//! Jede Verbindung laeuft in ihrem eigenen tokio-Task.
//!
//! ## State Machine
//! ```text
//! Verbindend -> Offen -> Geschlossen
//! ```
//!
//! Beim Uebergang nach `Geschlossen` verlaesst der Listener den Kanal,
//! bevor der Close-Frame geschrieben wird. Wer danach postet, erreicht
//! diese Verbindung nicht mehr.

use axum::extract::ws::{CloseFrame, Message, Utf8Bytes, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use offrecord_core::{ChannelId, ListenerId};
use offrecord_protocol::{frame_auswerten, ClientAktion, EingehendesFrame, FrameFehler};
use offrecord_protocol::frame::{
    CLOSE_GOING_AWAY, CLOSE_UEBERLASTET, CLOSE_ZU_GROSS, GRUND_ZU_GROSS,
};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_tungstenite::tungstenite;

use crate::broadcast::ListenerSender;
use crate::channel::Channel;
use crate::error::RelayResult;
use crate::server_state::RelayState;

// ---------------------------------------------------------------------------
// Verbindungszustand
// ---------------------------------------------------------------------------

/// Zustand der WebSocket-Verbindung
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbindungsZustand {
    /// Upgrade angenommen, noch nicht im Kanal
    Verbindend,
    /// Im Kanal, Frames werden verarbeitet
    Offen,
    /// Kanal verlassen, Socket wird geschlossen
    Geschlossen,
}

// ---------------------------------------------------------------------------
// ClientConnection
// ---------------------------------------------------------------------------

/// Verarbeitet eine einzelne WebSocket-Verbindung
pub struct ClientConnection {
    state: Arc<RelayState>,
    kanal_id: ChannelId,
    listener_id: ListenerId,
    zustand: VerbindungsZustand,
}

impl ClientConnection {
    pub fn neu(state: Arc<RelayState>, kanal_id: ChannelId) -> Self {
        Self {
            state,
            kanal_id,
            listener_id: ListenerId::new(),
            zustand: VerbindungsZustand::Verbindend,
        }
    }

    pub fn zustand(&self) -> VerbindungsZustand {
        self.zustand
    }

    /// Startet die Verarbeitungsschleife
    ///
    /// Laeuft bis der Client trennt, ein Frame abgewiesen wird oder ein
    /// Shutdown-Signal eingeht.
    pub async fn verarbeiten(mut self, socket: WebSocket, mut shutdown_rx: watch::Receiver<bool>) {
        let (mut sink, mut stream) = socket.split();

        let (sender, mut sende_rx) =
            ListenerSender::neu(self.listener_id, self.state.config.send_queue_groesse);
        let kanal = self.state.registry.beitreten(&self.kanal_id, sender);
        self.zustand = VerbindungsZustand::Offen;
        self.state.metriken.verbundene_listener.inc();
        self.state.kanal_gauge_aktualisieren();

        tracing::info!(kanal = %self.kanal_id, listener = %self.listener_id, "Listener verbunden");

        let close_frame = loop {
            if *shutdown_rx.borrow_and_update() {
                break Some(CloseFrame {
                    code: CLOSE_GOING_AWAY,
                    reason: Utf8Bytes::from_static("Server shutting down"),
                });
            }
            tokio::select! {
                // Eingehendes Frame vom Client
                eingehend = stream.next() => {
                    let ergebnis = match eingehend {
                        Some(Ok(Message::Text(text))) => {
                            self.frame_verarbeiten(&kanal, EingehendesFrame::Text(text.as_str()))
                        }
                        Some(Ok(Message::Binary(bytes))) => {
                            self.frame_verarbeiten(&kanal, EingehendesFrame::Binaer(&bytes[..]))
                        }
                        // Pong-Antworten erledigt der Transport
                        Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => Ok(()),
                        Some(Ok(Message::Close(_))) | None => {
                            tracing::debug!(listener = %self.listener_id, "Verbindung vom Client getrennt");
                            break None;
                        }
                        // Ueber dem Transport-Limit bricht schon der Transport ab
                        Some(Err(e)) if ist_groessenfehler(&e) => {
                            tracing::warn!(
                                kanal = %self.kanal_id,
                                listener = %self.listener_id,
                                fehler = %e,
                                "Frame ueber dem Transport-Limit - Verbindung wird geschlossen"
                            );
                            self.state.metriken.frame_abgewiesen("zu_gross");
                            break Some(CloseFrame {
                                code: CLOSE_ZU_GROSS,
                                reason: Utf8Bytes::from_static(GRUND_ZU_GROSS),
                            });
                        }
                        Some(Err(e)) => {
                            tracing::debug!(listener = %self.listener_id, fehler = %e, "Lesefehler");
                            break None;
                        }
                    };
                    if let Err(fehler) = ergebnis {
                        tracing::warn!(
                            kanal = %self.kanal_id,
                            listener = %self.listener_id,
                            fehler = %fehler,
                            "Frame abgewiesen - Verbindung wird geschlossen"
                        );
                        self.state.metriken.frame_abgewiesen(fehler.label());
                        break Some(CloseFrame {
                            code: fehler.close_code(),
                            reason: Utf8Bytes::from(fehler.close_grund()),
                        });
                    }
                }

                // Ausgehender Frame aus dem Kanal
                ausgehend = sende_rx.recv() => {
                    let Some(frame) = ausgehend else {
                        // Der Kanal hat den Listener wegen voller Queue entfernt
                        tracing::warn!(
                            kanal = %self.kanal_id,
                            listener = %self.listener_id,
                            "Listener zu langsam - Verbindung wird geschlossen"
                        );
                        break Some(CloseFrame {
                            code: CLOSE_UEBERLASTET,
                            reason: Utf8Bytes::from_static("Too slow, reconnect"),
                        });
                    };
                    if let Err(e) = senden(&mut sink, Message::Text(frame)).await {
                        tracing::debug!(listener = %self.listener_id, fehler = %e, "Senden fehlgeschlagen");
                        break None;
                    }
                }

                // Shutdown-Signal, ausgewertet am Schleifenanfang
                Ok(()) = shutdown_rx.changed() => {}
            }
        };

        // Erst austreten, dann Close-Frame schreiben
        self.schliessen();
        drop(sende_rx);

        if let Some(frame) = close_frame {
            let _ = senden(&mut sink, Message::Close(Some(frame))).await;
        }
        let _ = sink.close().await;
        self.state.metriken.verbundene_listener.dec();

        tracing::info!(kanal = %self.kanal_id, listener = %self.listener_id, "Verbindungs-Task beendet");
    }

    /// Wertet ein Frame aus und wendet es auf den Kanal an
    fn frame_verarbeiten(
        &self,
        kanal: &Channel,
        frame: EingehendesFrame<'_>,
    ) -> Result<(), FrameFehler> {
        match frame_auswerten(frame, self.state.config.max_nachricht_bytes)? {
            ClientAktion::Leeren => {
                kanal.leeren();
                self.state.metriken.leerungen_total.inc();
            }
            ClientAktion::Posten(payload) => {
                kanal.posten(payload);
                self.state.metriken.nachrichten_total.inc();
            }
        }
        Ok(())
    }

    fn schliessen(&mut self) {
        if self.zustand == VerbindungsZustand::Geschlossen {
            return;
        }
        self.zustand = VerbindungsZustand::Geschlossen;
        self.state
            .registry
            .verlassen(&self.kanal_id, &self.listener_id);
        self.state.kanal_gauge_aktualisieren();
    }
}

async fn senden(sink: &mut SplitSink<WebSocket, Message>, nachricht: Message) -> RelayResult<()> {
    sink.send(nachricht).await?;
    Ok(())
}

/// Erkennt den Abbruch des Transports wegen einer zu grossen Nachricht
///
/// Durchsucht die Fehlerkette nach dem Kapazitaetsfehler von tungstenite.
/// Der Textvergleich greift, falls axum eine andere tungstenite-Version
/// einbindet als dieses Crate.
fn ist_groessenfehler(fehler: &axum::Error) -> bool {
    let mut quelle: Option<&(dyn std::error::Error + 'static)> = Some(fehler);
    while let Some(e) = quelle {
        if matches!(
            e.downcast_ref::<tungstenite::Error>(),
            Some(tungstenite::Error::Capacity(_))
        ) || e.downcast_ref::<tungstenite::error::CapacityError>().is_some()
        {
            return true;
        }
        let text = e.to_string();
        if text.starts_with("Space limit exceeded") || text.starts_with("Message too long") {
            return true;
        }
        quelle = e.source();
    }
    false
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tungstenite::error::CapacityError;

    #[test]
    fn kapazitaetsfehler_wird_erkannt() {
        let fehler = axum::Error::new(tungstenite::Error::Capacity(
            CapacityError::MessageTooLong {
                size: 5 * 1024 * 1024,
                max_size: 4 * 1024 * 1024,
            },
        ));
        assert!(ist_groessenfehler(&fehler));
    }

    #[test]
    fn andere_transportfehler_sind_keine_groessenfehler() {
        let fehler = axum::Error::new(tungstenite::Error::ConnectionClosed);
        assert!(!ist_groessenfehler(&fehler));

        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        assert!(!ist_groessenfehler(&axum::Error::new(io)));
    }
}
