//! Periodische Anwesenheitsmeldung
//!
//! Alle `heartbeat_sek` Sekunden bekommt jeder Kanal `{"ct": n}`. Das
//! korrigiert die angezeigte Anzahl, falls eine Meldung unterwegs verloren
//! ging.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::registry::ChannelRegistry;

/// Eine Heartbeat-Runde ueber alle Kanaele
///
/// Gibt die Anzahl der benachrichtigten Kanaele zurueck.
pub fn heartbeat_tick(registry: &ChannelRegistry) -> usize {
    let anzahl = registry.anwesenheit_an_alle_melden();
    tracing::trace!(kanaele = anzahl, "Heartbeat");
    anzahl
}

/// Startet den Heartbeat-Task
///
/// Laeuft bis `shutdown_rx` ein `true`-Signal empfaengt.
pub fn heartbeat_starten(
    registry: Arc<ChannelRegistry>,
    intervall: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + intervall, intervall);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    heartbeat_tick(&registry);
                }
                ergebnis = shutdown_rx.changed() => {
                    if ergebnis.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }
        tracing::debug!("Heartbeat gestoppt");
    })
}
