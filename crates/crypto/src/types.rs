//! Gemeinsame Typen fuer das Kryptografie-Subsystem

use offrecord_protocol::Umschlag;
use serde::{Deserialize, Serialize};

use crate::error::{CryptoError, CryptoResult};

/// Nonce-Laenge der XSalsa20-Poly1305-Box
pub const NONCE_LAENGE: usize = 24;

/// Klartext einer Chat-Nachricht
///
/// Wird vor der Verschluesselung als JSON-Array `[nickname, text]` kodiert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct Klartext {
    pub nickname: String,
    pub text: String,
}

impl Klartext {
    pub fn neu(nickname: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            nickname: nickname.into(),
            text: text.into(),
        }
    }

    /// UTF-8 JSON-Bytes, die in die Box gehen
    pub fn zu_bytes(&self) -> CryptoResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn aus_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

impl From<(String, String)> for Klartext {
    fn from((nickname, text): (String, String)) -> Self {
        Self { nickname, text }
    }
}

impl From<Klartext> for (String, String) {
    fn from(klartext: Klartext) -> Self {
        (klartext.nickname, klartext.text)
    }
}

/// Ergebnis einer Box-Verschluesselung
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerschluesselterPayload {
    /// 24 Bytes Zufalls-Nonce
    pub nonce: [u8; NONCE_LAENGE],
    /// Ciphertext inkl. 16 Bytes Poly1305-Tag
    pub ciphertext: Vec<u8>,
}

impl VerschluesselterPayload {
    /// Verpackt Nonce und Ciphertext in den Wire-Umschlag
    pub fn zu_umschlag(&self) -> Umschlag {
        Umschlag::neu(self.nonce.to_vec(), self.ciphertext.clone())
    }

    /// Liest Nonce und Ciphertext aus einem Umschlag
    pub fn aus_umschlag(umschlag: &Umschlag) -> CryptoResult<Self> {
        let nonce: [u8; NONCE_LAENGE] =
            umschlag
                .nonce
                .as_slice()
                .try_into()
                .map_err(|_| CryptoError::UngueltigeNonce {
                    erwartet: NONCE_LAENGE,
                    erhalten: umschlag.nonce.len(),
                })?;
        Ok(Self {
            nonce,
            ciphertext: umschlag.ciphertext.clone(),
        })
    }
}
