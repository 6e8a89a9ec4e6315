//! Entschluesselung von Kanal-Nachrichten

use crypto_box::aead::generic_array::GenericArray;
use crypto_box::aead::Aead;
use offrecord_protocol::Umschlag;

use super::selbst_box;
use crate::error::{CryptoError, CryptoResult};
use crate::keys::KanalSchluessel;
use crate::types::{Klartext, NONCE_LAENGE};

/// Oeffnet eine Box des Kanals
///
/// Jeder Fehlschlag der Authentifizierung (falscher Schluessel,
/// manipulierter Ciphertext, falsche Nonce) ergibt `Authentifizierung`.
pub fn entschluesseln(
    schluessel: &KanalSchluessel,
    nonce: &[u8],
    ciphertext: &[u8],
) -> CryptoResult<Vec<u8>> {
    if nonce.len() != NONCE_LAENGE {
        return Err(CryptoError::UngueltigeNonce {
            erwartet: NONCE_LAENGE,
            erhalten: nonce.len(),
        });
    }

    selbst_box(schluessel)
        .decrypt(GenericArray::from_slice(nonce), ciphertext)
        .map_err(|_| CryptoError::Authentifizierung)
}

/// Entschluesselt einen Payload aus dem Kanal-Log
///
/// `payload` ist der Base64-Text den der Relay fuer ein Binaer-Frame speichert.
pub fn nachricht_entschluesseln(
    schluessel: &KanalSchluessel,
    payload: &str,
) -> CryptoResult<Klartext> {
    let umschlag = Umschlag::aus_base64(payload)?;
    let bytes = entschluesseln(schluessel, &umschlag.nonce, &umschlag.ciphertext)?;
    Klartext::aus_bytes(&bytes)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
