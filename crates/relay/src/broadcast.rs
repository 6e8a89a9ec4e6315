//! Send-Queues der Listener
//!
//! Jede Verbindung hat eine begrenzte Queue. Der Kanal legt fertig
//! serialisierte Text-Frames hinein, der Verbindungs-Task schreibt sie auf
//! den Socket.
//!
//! Geschlossene Queues werden uebersprungen. Ein Listener mit voller Queue
//! kommt nicht hinterher und wird aus dem Kanal entfernt; mit dem letzten
//! Sender endet seine Queue und der Verbindungs-Task schliesst den Socket.
//! Beim erneuten Verbinden bekommt der Client den aktuellen Verlauf.

use axum::extract::ws::Utf8Bytes;
use offrecord_core::ListenerId;
use offrecord_protocol::ServerNachricht;
use tokio::sync::mpsc;

/// Standardgroesse der Send-Queue pro Listener
pub const SEND_QUEUE_GROESSE: usize = 256;

/// Ergebnis einer einzelnen Sendung
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zustellung {
    Zugestellt,
    /// Queue voll, der Listener haengt hinterher
    Voll,
    /// Verbindungs-Task ist bereits beendet
    Geschlossen,
}

/// Handle auf die Send-Queue eines verbundenen Listeners
#[derive(Clone, Debug)]
pub struct ListenerSender {
    pub listener_id: ListenerId,
    pub tx: mpsc::Sender<Utf8Bytes>,
}

impl ListenerSender {
    /// Erstellt Handle und zugehoerige Empfangs-Queue
    pub fn neu(listener_id: ListenerId, groesse: usize) -> (Self, mpsc::Receiver<Utf8Bytes>) {
        let (tx, rx) = mpsc::channel(groesse.max(1));
        (Self { listener_id, tx }, rx)
    }

    /// Sendet einen Frame nicht-blockierend an den Listener
    ///
    pub fn senden(&self, frame: Utf8Bytes) -> Zustellung {
        match self.tx.try_send(frame) {
            Ok(()) => Zustellung::Zugestellt,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(listener = %self.listener_id, "Send-Queue voll");
                Zustellung::Voll
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(listener = %self.listener_id, "Send-Queue geschlossen");
                Zustellung::Geschlossen
            }
        }
    }
}

/// Serialisiert eine Server-Nachricht einmalig fuer alle Empfaenger
pub(crate) fn frame_bauen(nachricht: &ServerNachricht) -> Option<Utf8Bytes> {
    match nachricht.zu_json() {
        Ok(text) => Some(Utf8Bytes::from(text)),
        Err(e) => {
            tracing::error!(fehler = %e, "Server-Nachricht nicht serialisierbar");
            None
        }
    }
}

/// Sendet denselben Frame an alle Listener
///
/// Listener mit voller Queue werden aus `listeners` entfernt. Gibt die
/// Anzahl der entfernten Listener zurueck.
pub(crate) fn an_alle_senden(listeners: &mut Vec<ListenerSender>, frame: &Utf8Bytes) -> usize {
    let vorher = listeners.len();
    listeners.retain(|listener| {
        if listener.senden(frame.clone()) == Zustellung::Voll {
            tracing::warn!(listener = %listener.listener_id, "Listener zu langsam - wird getrennt");
            false
        } else {
            true
        }
    });
    vorher - listeners.len()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
