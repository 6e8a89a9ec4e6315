//! Verschluesselung von Kanal-Nachrichten
//!
//! ## Format
//! ```text
//! nonce(24) zufaellig
//! ciphertext = Poly1305-Tag(16) || XSalsa20(klartext)
//! ```

use crypto_box::aead::{Aead, AeadCore, OsRng};
use crypto_box::SalsaBox;
use offrecord_protocol::Umschlag;

use super::selbst_box;
use crate::error::{CryptoError, CryptoResult};
use crate::keys::KanalSchluessel;
use crate::types::{Klartext, VerschluesselterPayload, NONCE_LAENGE};

/// Verschluesselt beliebige Bytes fuer den Kanal
///
/// Jeder Aufruf zieht eine neue Nonce aus dem OS-Zufallsgenerator.
pub fn verschluesseln(
    schluessel: &KanalSchluessel,
    klartext: &[u8],
) -> CryptoResult<VerschluesselterPayload> {
    let nonce = SalsaBox::generate_nonce(&mut OsRng);
    let ciphertext = selbst_box(schluessel)
        .encrypt(&nonce, klartext)
        .map_err(|e| CryptoError::Verschluesselung(e.to_string()))?;

    let mut nonce_bytes = [0u8; NONCE_LAENGE];
    nonce_bytes.copy_from_slice(nonce.as_slice());

    Ok(VerschluesselterPayload {
        nonce: nonce_bytes,
        ciphertext,
    })
}

/// Verschluesselt eine Chat-Nachricht und verpackt sie als Umschlag
pub fn nachricht_verschluesseln(
    schluessel: &KanalSchluessel,
    klartext: &Klartext,
) -> CryptoResult<Umschlag> {
    let payload = verschluesseln(schluessel, &klartext.zu_bytes()?)?;
    Ok(payload.zu_umschlag())
}
