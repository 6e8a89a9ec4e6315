//! # offrecord-observability
//!
//! Observability-Crate fuer offrecord:
//! - Prometheus-kompatible Metriken (`/metrics`)
//! - Health-Check-Endpunkt (`/health`)
//! - Structured Logging via tracing-subscriber (Text oder JSON)
//!
//! Die Router werden vom Relay in seinen eigenen HTTP-Router eingehaengt,
//! es gibt keinen separaten Observability-Port.

pub mod health;
pub mod logging;
pub mod metrics;

pub use health::{health_router, HealthResponse, HealthState, HealthStatus};
pub use logging::logging_initialisieren;
pub use metrics::{metrics_router, RelayMetriken};
