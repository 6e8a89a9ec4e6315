//! CBOR-Umschlag fuer verschluesselte Nachrichten
//!
//! ## Format
//! ```text
//! CBOR-Array(2) [ Bytes(nonce), Bytes(ciphertext) ]
//! ```
//!
//! Fuer den Transport im JSON-Post wird der Umschlag Base64-kodiert
//! (Standard-Alphabet mit Padding, wie die Binaer-Umkodierung des Relays).
//! Der Relay selbst dekodiert Umschlaege nie.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use ciborium::Value;
use thiserror::Error;

/// Fehler beim Kodieren oder Dekodieren eines Umschlags
#[derive(Debug, Error)]
pub enum UmschlagFehler {
    #[error("CBOR-Kodierung fehlgeschlagen: {0}")]
    Kodierung(String),

    #[error("CBOR-Dekodierung fehlgeschlagen: {0}")]
    Dekodierung(String),

    #[error("Ungueltige Umschlag-Struktur: {0}")]
    UngueltigeStruktur(String),

    #[error("Base64-Dekodierung fehlgeschlagen: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Nonce und Ciphertext einer verschluesselten Nachricht
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Umschlag {
    pub nonce: Vec<u8>,
    pub ciphertext: Vec<u8>,
}

impl Umschlag {
    pub fn neu(nonce: Vec<u8>, ciphertext: Vec<u8>) -> Self {
        Self { nonce, ciphertext }
    }

    /// Serialisiert zu CBOR-Bytes
    pub fn kodieren(&self) -> Result<Vec<u8>, UmschlagFehler> {
        let wert = Value::Array(vec![
            Value::Bytes(self.nonce.clone()),
            Value::Bytes(self.ciphertext.clone()),
        ]);
        let mut buf = Vec::with_capacity(self.nonce.len() + self.ciphertext.len() + 8);
        ciborium::into_writer(&wert, &mut buf)
            .map_err(|e| UmschlagFehler::Kodierung(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialisiert aus CBOR-Bytes
    pub fn dekodieren(bytes: &[u8]) -> Result<Self, UmschlagFehler> {
        let wert: Value =
            ciborium::from_reader(bytes).map_err(|e| UmschlagFehler::Dekodierung(e.to_string()))?;

        let Value::Array(elemente) = wert else {
            return Err(UmschlagFehler::UngueltigeStruktur(
                "Array erwartet".to_string(),
            ));
        };
        if elemente.len() != 2 {
            return Err(UmschlagFehler::UngueltigeStruktur(format!(
                "2 Elemente erwartet, {} erhalten",
                elemente.len()
            )));
        }

        let mut elemente = elemente.into_iter();
        let nonce = elemente.next().and_then(bytes_aus).ok_or_else(|| {
            UmschlagFehler::UngueltigeStruktur("Nonce ist kein Byte-String".to_string())
        })?;
        let ciphertext = elemente.next().and_then(bytes_aus).ok_or_else(|| {
            UmschlagFehler::UngueltigeStruktur("Ciphertext ist kein Byte-String".to_string())
        })?;

        Ok(Self { nonce, ciphertext })
    }

    /// CBOR-Bytes als Base64-Text (Payload-Form im Kanal-Log)
    pub fn zu_base64(&self) -> Result<String, UmschlagFehler> {
        Ok(STANDARD.encode(self.kodieren()?))
    }

    /// Gegenstueck zu `zu_base64`
    pub fn aus_base64(text: &str) -> Result<Self, UmschlagFehler> {
        let bytes = STANDARD.decode(text)?;
        Self::dekodieren(&bytes)
    }
}

/// Byte-String, auch wenn ein Typed-Array-Tag ihn umschliesst
fn bytes_aus(wert: Value) -> Option<Vec<u8>> {
    match wert {
        Value::Bytes(bytes) => Some(bytes),
        Value::Tag(_, inneres) => match *inneres {
            Value::Bytes(bytes) => Some(bytes),
            _ => None,
        },
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
