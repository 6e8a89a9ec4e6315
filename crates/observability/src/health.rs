//! Health-Check-Endpunkt fuer den Relay
//!
//! Endpoint: `GET /health`
//! Response: JSON mit Status, Version, Uptime, aktiven Kanaelen und Verbindungen

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::metrics::RelayMetriken;

/// Status des Health-Checks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Antwort des Health-Check-Endpunkts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub aktive_kanaele: i64,
    pub verbindungen: i64,
}

/// Geteilter Zustand fuer den Health-Check-Handler
#[derive(Clone)]
pub struct HealthState {
    pub start_time: Arc<Instant>,
    pub metriken: RelayMetriken,
}

impl HealthState {
    pub fn neu(metriken: RelayMetriken) -> Self {
        Self {
            start_time: Arc::new(Instant::now()),
            metriken,
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Momentaufnahme fuer die Antwort
    pub fn antwort(&self) -> HealthResponse {
        HealthResponse {
            status: HealthStatus::Healthy,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.uptime_seconds(),
            aktive_kanaele: self.metriken.aktive_kanaele.get(),
            verbindungen: self.metriken.verbundene_listener.get(),
        }
    }
}

/// Axum-Router fuer den `/health`-Endpunkt
pub fn health_router(metriken: RelayMetriken) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(HealthState::neu(metriken))
}

/// `GET /health` - gibt den Serverstatus zurueck
async fn health_handler(State(state): State<HealthState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.antwort()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_state_frisch_erstellt() {
        let state = HealthState::neu(RelayMetriken::neu().unwrap());
        assert!(state.uptime_seconds() < 5);
    }

    #[test]
    fn antwort_spiegelt_metriken() {
        let metriken = RelayMetriken::neu().unwrap();
        metriken.aktive_kanaele.set(2);
        metriken.verbundene_listener.set(5);

        let antwort = HealthState::neu(metriken).antwort();
        assert_eq!(antwort.status, HealthStatus::Healthy);
        assert_eq!(antwort.aktive_kanaele, 2);
        assert_eq!(antwort.verbindungen, 5);
        assert_eq!(antwort.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn health_response_serialisierung() {
        let response = HealthResponse {
            status: HealthStatus::Healthy,
            version: "0.1.0".to_string(),
            uptime_seconds: 3600,
            aktive_kanaele: 1,
            verbindungen: 4,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"healthy\""));
        assert!(json.contains("\"version\":\"0.1.0\""));
        assert!(json.contains("\"uptime_seconds\":3600"));
        assert!(json.contains("\"aktive_kanaele\":1"));
        assert!(json.contains("\"verbindungen\":4"));
    }

    #[test]
    fn health_response_deserialisierung() {
        let json = r#"{"status":"unhealthy","version":"0.1.0","uptime_seconds":100,"aktive_kanaele":0,"verbindungen":0}"#;
        let response: HealthResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.status, HealthStatus::Unhealthy);
        assert_eq!(response.uptime_seconds, 100);
    }

    #[tokio::test]
    async fn health_handler_antwortet_200() {
        let state = HealthState::neu(RelayMetriken::neu().unwrap());
        let antwort = health_handler(State(state)).await.into_response();
        assert_eq!(antwort.status(), StatusCode::OK);
    }
}
