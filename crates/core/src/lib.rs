//! offrecord-core – Gemeinsame Typen und Grenzwerte
//!
//! Dieses Crate stellt die Bausteine bereit, die Relay und Client gemeinsam
//! nutzen: Kanal- und Listener-IDs, die festen Protokoll-Grenzwerte und die
//! Millisekunden-Uhr fuer Log-Eintraege.

pub mod limits;
pub mod types;
pub mod zeit;

// Re-Exporte fuer bequemen Zugriff
pub use limits::{HEARTBEAT_INTERVALL_SEK, MAX_NACHRICHT_BYTES, MAX_VERLAUF};
pub use types::{ChannelId, ListenerId};
pub use zeit::jetzt_ms;
