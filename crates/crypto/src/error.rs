//! Fehlertypen fuer das Kryptografie-Subsystem

use offrecord_protocol::UmschlagFehler;
use thiserror::Error;

/// Fehler im Kryptografie-Subsystem
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Box liess sich nicht oeffnen: falscher Schluessel oder manipuliert
    #[error("Authentifizierung fehlgeschlagen")]
    Authentifizierung,

    #[error("Verschluesselung fehlgeschlagen: {0}")]
    Verschluesselung(String),

    #[error("Ungueltige Nonce-Laenge: erwartet {erwartet}, erhalten {erhalten}")]
    UngueltigeNonce { erwartet: usize, erhalten: usize },

    #[error("Umschlag-Fehler: {0}")]
    Umschlag(#[from] UmschlagFehler),

    #[error("JSON-Fehler: {0}")]
    Json(#[from] serde_json::Error),
}

impl CryptoError {
    /// Gibt true zurueck wenn die Nachricht nicht zum eigenen Schluessel passt
    pub fn ist_authentifizierung(&self) -> bool {
        matches!(self, Self::Authentifizierung)
    }
}

pub type CryptoResult<T> = Result<T, CryptoError>;
