//! offrecord-server – Bibliotheks-Root
//!
//! Verdrahtet Konfiguration, Metriken und Relay und stellt den
//! oeffentlichen Einstiegspunkt fuer Integrationstests bereit.

pub mod config;

use anyhow::Result;
use config::ServerConfig;
use offrecord_observability::RelayMetriken;
use offrecord_relay::{RelayServer, RelayState};
use std::future::Future;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;

/// Wie lange nach dem Shutdown-Signal auf das Schliessen der Verbindungen
/// gewartet wird
const ABSCHLUSS_TIMEOUT: Duration = Duration::from_secs(2);

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Bindet die konfigurierte Adresse und laeuft bis Ctrl-C
    pub async fn starten(self) -> Result<()> {
        let adresse = self.config.bind_adresse()?;
        let listener = TcpListener::bind(adresse).await?;

        self.laufen(listener, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(fehler = %e, "Ctrl-C-Handler konnte nicht installiert werden");
            }
        })
        .await
    }

    /// Betreibt den Relay auf `listener` bis `signal` fertig ist
    ///
    /// Reihenfolge beim Herunterfahren:
    /// 1. Shutdown an alle Verbindungen melden (Close 1001)
    /// 2. Hoechstens zwei Sekunden auf das Schliessen warten
    /// 3. Auf das Ende des HTTP-Servers warten
    pub async fn laufen<F>(self, listener: TcpListener, signal: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let metriken = RelayMetriken::neu()?;
        let state = RelayState::neu(self.config.relay_config(), metriken.clone(), shutdown_rx);

        tracing::info!(
            server_name = %self.config.server.name,
            adresse = %listener.local_addr()?,
            verlauf = state.config.verlauf_groesse,
            max_bytes = state.config.max_nachricht_bytes,
            heartbeat_sek = state.config.heartbeat_sek,
            metriken = state.config.metriken_aktiviert,
            "Server startet"
        );

        let bind_addr = listener.local_addr()?;
        let mut relay = tokio::spawn(RelayServer::neu(state, bind_addr).mit_listener(listener));

        tokio::select! {
            _ = signal => {
                tracing::info!("Shutdown-Signal empfangen, Server wird beendet");
            }
            ergebnis = &mut relay => {
                // Relay ist ohne Signal beendet
                ergebnis??;
                return Ok(());
            }
        }

        let _ = shutdown_tx.send(true);
        verbindungen_abwarten(&metriken, ABSCHLUSS_TIMEOUT).await;

        relay.await??;
        tracing::info!("Server beendet");
        Ok(())
    }
}

/// Wartet bis keine Listener mehr verbunden sind oder `timeout` ablaeuft
async fn verbindungen_abwarten(metriken: &RelayMetriken, timeout: Duration) {
    let warten = async {
        while metriken.verbundene_listener.get() > 0 {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    };
    if tokio::time::timeout(timeout, warten).await.is_err() {
        tracing::warn!(
            offen = metriken.verbundene_listener.get(),
            "Nicht alle Verbindungen rechtzeitig geschlossen"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn server_beantwortet_health_und_stoppt_auf_signal() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let adresse = listener.local_addr().unwrap();
        let (stopp_tx, stopp_rx) = oneshot::channel::<()>();

        let server = tokio::spawn(Server::neu(ServerConfig::default()).laufen(listener, async {
            let _ = stopp_rx.await;
        }));

        let mut stream = TcpStream::connect(adresse).await.unwrap();
        stream
            .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut antwort = String::new();
        stream.read_to_string(&mut antwort).await.unwrap();
        assert!(antwort.starts_with("HTTP/1.1 200"), "{antwort}");
        assert!(antwort.contains("\"status\":\"healthy\""), "{antwort}");

        stopp_tx.send(()).unwrap();
        let ergebnis = tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .expect("Server stoppt nicht")
            .unwrap();
        assert!(ergebnis.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn abwarten_endet_nach_timeout() {
        let metriken = RelayMetriken::neu().unwrap();
        metriken.verbundene_listener.set(1);
        let start = tokio::time::Instant::now();
        verbindungen_abwarten(&metriken, Duration::from_secs(2)).await;
        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test]
    async fn abwarten_ohne_verbindungen_kehrt_sofort_zurueck() {
        let metriken = RelayMetriken::neu().unwrap();
        tokio::time::timeout(
            Duration::from_millis(100),
            verbindungen_abwarten(&metriken, Duration::from_secs(2)),
        )
        .await
        .unwrap();
    }
}
