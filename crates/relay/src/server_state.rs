//! Gemeinsamer Zustand des Relays
//!
//! Haelt Konfiguration, Registry und Metriken als Arc-Referenzen, die
//! sicher zwischen den Verbindungs-Tasks geteilt werden.

use offrecord_core::{HEARTBEAT_INTERVALL_SEK, MAX_NACHRICHT_BYTES, MAX_VERLAUF};
use offrecord_observability::RelayMetriken;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::broadcast::SEND_QUEUE_GROESSE;
use crate::registry::ChannelRegistry;

/// Laufzeit-Konfiguration des Relays
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Maximale Eintraege im Verlauf eines Kanals
    pub verlauf_groesse: usize,
    /// Maximale Groesse eines Client-Frames in Bytes
    pub max_nachricht_bytes: usize,
    /// Intervall der Anwesenheitsmeldung in Sekunden
    pub heartbeat_sek: u64,
    /// Kapazitaet der Send-Queue pro Listener
    pub send_queue_groesse: usize,
    /// `/metrics` ausliefern
    pub metriken_aktiviert: bool,
}

impl RelayConfig {
    pub fn heartbeat_intervall(&self) -> Duration {
        Duration::from_secs(self.heartbeat_sek.max(1))
    }

    /// Grenze des WebSocket-Transports
    ///
    /// Liegt ueber `max_nachricht_bytes`, damit zu grosse Frames bis zu
    /// dieser Groesse sauber mit 1009 abgewiesen werden.
    pub fn transport_limit(&self) -> usize {
        self.max_nachricht_bytes.saturating_mul(4)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            verlauf_groesse: MAX_VERLAUF,
            max_nachricht_bytes: MAX_NACHRICHT_BYTES,
            heartbeat_sek: HEARTBEAT_INTERVALL_SEK,
            send_queue_groesse: SEND_QUEUE_GROESSE,
            metriken_aktiviert: true,
        }
    }
}

/// Gemeinsamer Relay-Zustand (thread-safe, Arc-geteilt)
pub struct RelayState {
    pub config: Arc<RelayConfig>,
    pub registry: Arc<ChannelRegistry>,
    pub metriken: RelayMetriken,
    /// Wird beim Herunterfahren auf `true` gesetzt
    pub shutdown_rx: watch::Receiver<bool>,
}

impl RelayState {
    pub fn neu(
        config: RelayConfig,
        metriken: RelayMetriken,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Arc<Self> {
        let registry = Arc::new(ChannelRegistry::neu(config.verlauf_groesse));
        Arc::new(Self {
            config: Arc::new(config),
            registry,
            metriken,
            shutdown_rx,
        })
    }

    /// Gleicht die Kanal-Gauge mit der Registry ab
    pub(crate) fn kanal_gauge_aktualisieren(&self) {
        self.metriken
            .aktive_kanaele
            .set(self.registry.kanal_anzahl() as i64);
    }
}
