//! Fehlertypen fuer den Relay

use offrecord_protocol::FrameFehler;
use thiserror::Error;

/// Fehlertyp fuer den Relay
#[derive(Debug, Error)]
pub enum RelayError {
    /// IO-Fehler (Bind, Accept)
    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),

    /// WebSocket-Transport (Senden an den Client fehlgeschlagen)
    #[error("WebSocket-Fehler: {0}")]
    Transport(#[from] axum::Error),

    /// Client hat gegen das Protokoll verstossen
    #[error("Protokollfehler: {0}")]
    Protokoll(#[from] FrameFehler),
}

/// Result-Typ fuer den Relay
pub type RelayResult<T> = Result<T, RelayError>;
