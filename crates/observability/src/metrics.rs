//! Prometheus-kompatible Metriken fuer den Relay
//!
//! Registrierte Metriken:
//! - `offrecord_verbundene_listener` - Gauge: Offene WebSocket-Verbindungen
//! - `offrecord_aktive_kanaele` - Gauge: Kanaele in der Registry
//! - `offrecord_nachrichten_total` - Counter: Gepostete Nachrichten
//! - `offrecord_leerungen_total` - Counter: Geleerte Kanaele
//! - `offrecord_abgewiesene_frames_total` - Counter: Abgewiesene Frames (grund)
//!
//! Inhalte, Kanal-IDs oder Nicknames tauchen in keiner Metrik auf.

use anyhow::Result;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Alle offrecord-Prometheus-Metriken
///
/// Jede Instanz hat ihre eigene Registry, damit Tests parallel laufen koennen.
#[derive(Clone)]
pub struct RelayMetriken {
    pub registry: Arc<Registry>,

    pub verbundene_listener: IntGauge,
    pub aktive_kanaele: IntGauge,
    pub nachrichten_total: IntCounter,
    pub leerungen_total: IntCounter,
    pub abgewiesene_frames_total: IntCounterVec,
}

impl RelayMetriken {
    /// Erstellt und registriert alle Metriken in einer neuen Registry
    pub fn neu() -> Result<Self> {
        let registry = Registry::new();

        let verbundene_listener = IntGauge::with_opts(Opts::new(
            "offrecord_verbundene_listener",
            "Anzahl offener WebSocket-Verbindungen",
        ))?;
        registry.register(Box::new(verbundene_listener.clone()))?;

        let aktive_kanaele = IntGauge::with_opts(Opts::new(
            "offrecord_aktive_kanaele",
            "Anzahl Kanaele mit mindestens einem Listener",
        ))?;
        registry.register(Box::new(aktive_kanaele.clone()))?;

        let nachrichten_total = IntCounter::with_opts(Opts::new(
            "offrecord_nachrichten_total",
            "Gesamtanzahl geposteter Nachrichten",
        ))?;
        registry.register(Box::new(nachrichten_total.clone()))?;

        let leerungen_total = IntCounter::with_opts(Opts::new(
            "offrecord_leerungen_total",
            "Gesamtanzahl geleerter Kanaele",
        ))?;
        registry.register(Box::new(leerungen_total.clone()))?;

        let abgewiesene_frames_total = IntCounterVec::new(
            Opts::new(
                "offrecord_abgewiesene_frames_total",
                "Frames die zum Schliessen der Verbindung gefuehrt haben",
            ),
            &["grund"],
        )?;
        registry.register(Box::new(abgewiesene_frames_total.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            verbundene_listener,
            aktive_kanaele,
            nachrichten_total,
            leerungen_total,
            abgewiesene_frames_total,
        })
    }

    /// Zaehlt ein abgewiesenes Frame
    pub fn frame_abgewiesen(&self, grund: &str) {
        self.abgewiesene_frames_total
            .with_label_values(&[grund])
            .inc();
    }

    /// Exportiert alle Metriken im Prometheus-Textformat
    pub fn exportieren(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

/// Axum-Router fuer den `/metrics`-Endpunkt
pub fn metrics_router(metriken: RelayMetriken) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metriken)
}

async fn metrics_handler(State(metriken): State<RelayMetriken>) -> impl IntoResponse {
    match metriken.exportieren() {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(err) => {
            tracing::error!(fehler = %err, "Metriken-Export fehlgeschlagen");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
