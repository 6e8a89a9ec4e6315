//! Fehlertypen fuer den Client

use offrecord_crypto::CryptoError;
use offrecord_protocol::UmschlagFehler;
use thiserror::Error;

/// Fehlertyp fuer den Client
#[derive(Debug, Error)]
pub enum ClientError {
    /// WebSocket-Verbindung oder -Transport fehlgeschlagen
    #[error("Verbindungsfehler: {0}")]
    Verbindung(#[from] tokio_tungstenite::tungstenite::Error),

    /// Der Relay hat die Verbindung mit einem Fehlercode geschlossen
    #[error("Vom Relay geschlossen ({code}): {grund}")]
    VomRelayGeschlossen { code: u16, grund: String },

    #[error("Kryptografie-Fehler: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Umschlag-Fehler: {0}")]
    Umschlag(#[from] UmschlagFehler),

    /// Relay hat etwas gesendet, das keine Server-Nachricht ist
    #[error("Protokollfehler: {0}")]
    Protokoll(String),

    #[error("Ungueltige Einladung: {0}")]
    UngueltigeEinladung(String),

    /// Link ohne `#passphrase`
    #[error("Kein Kanal gewaehlt")]
    KeinKanal,

    #[error("Nicht verbunden")]
    NichtVerbunden,
}

/// Result-Typ fuer den Client
pub type ClientResult<T> = Result<T, ClientError>;
