//! Kanal-Schluessel aus einer Passphrase
//!
//! ```text
//! seed       = PBKDF2-HMAC-SHA256(passphrase, "offrecord.ca", 100000, 32 Bytes)
//! secret_key = seed (X25519)
//! public_key = X25519(secret_key)
//! channel_id = base64url(public_key) ohne Padding
//! ```
//!
//! Wer die Passphrase kennt, kennt den Schluessel. Der Relay sieht nur die
//! Channel-ID und kann daraus weder Passphrase noch Secret Key ableiten.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use crypto_box::{PublicKey, SecretKey};
use offrecord_core::ChannelId;
use sha2::Sha256;

/// Festes Salz der Schluesselableitung
pub const SALZ: &[u8] = b"offrecord.ca";

/// PBKDF2-Iterationen
pub const ITERATIONEN: u32 = 100_000;

const SEED_LAENGE: usize = 32;

/// Schluesselpaar eines Kanals samt abgeleiteter Adresse
#[derive(Clone)]
pub struct KanalSchluessel {
    secret_key: SecretKey,
    public_key: PublicKey,
    channel_id: ChannelId,
}

impl KanalSchluessel {
    /// Leitet das Schluesselpaar deterministisch aus einer Passphrase ab
    ///
    /// Die leere Passphrase ist erlaubt und ergibt einen gueltigen Kanal.
    pub fn aus_passphrase(passphrase: &str) -> Self {
        let mut seed = [0u8; SEED_LAENGE];
        pbkdf2::pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), SALZ, ITERATIONEN, &mut seed);
        let schluessel = Self::aus_seed(seed);
        seed.fill(0);
        schluessel
    }

    /// Baut das Schluesselpaar aus 32 Seed-Bytes
    pub fn aus_seed(seed: [u8; SEED_LAENGE]) -> Self {
        let secret_key = SecretKey::from(seed);
        let public_key = secret_key.public_key();
        let channel_id = channel_id_aus_public_key(&public_key);
        Self {
            secret_key,
            public_key,
            channel_id,
        }
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Adresse unter der der Kanal beim Relay gefuehrt wird
    pub fn channel_id(&self) -> &ChannelId {
        &self.channel_id
    }
}

impl std::fmt::Debug for KanalSchluessel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KanalSchluessel")
            .field("channel_id", &self.channel_id)
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

/// Kodiert einen Public Key als Channel-ID (base64url, 43 Zeichen)
pub fn channel_id_aus_public_key(public_key: &PublicKey) -> ChannelId {
    ChannelId::new(URL_SAFE_NO_PAD.encode(public_key.as_bytes()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(text: &str) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&text[2 * i..2 * i + 2], 16).unwrap();
        }
        bytes
    }

    #[test]
    fn ableitung_ist_deterministisch() {
        let a = KanalSchluessel::aus_passphrase("p1");
        let b = KanalSchluessel::aus_passphrase("p1");
        assert_eq!(a.channel_id(), b.channel_id());
        assert_eq!(a.public_key().as_bytes(), b.public_key().as_bytes());
    }

    #[test]
    fn verschiedene_passphrasen_verschiedene_kanaele() {
        let a = KanalSchluessel::aus_passphrase("p1");
        let b = KanalSchluessel::aus_passphrase("p2");
        assert_ne!(a.channel_id(), b.channel_id());
    }

    #[test]
    fn leere_passphrase_ist_gueltig() {
        let schluessel = KanalSchluessel::aus_passphrase("");
        assert_eq!(schluessel.channel_id().as_str().len(), 43);
    }

    #[test]
    fn channel_id_ist_url_sicher_ohne_padding() {
        let schluessel = KanalSchluessel::aus_passphrase("lobby");
        let id = schluessel.channel_id().as_str();
        assert_eq!(id.len(), 43);
        assert!(id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_eq!(URL_SAFE_NO_PAD.decode(id).unwrap(), schluessel.public_key().as_bytes());
    }

    #[test]
    fn x25519_testvektor() {
        // RFC 7748, Abschnitt 6.1 (Alice)
        let schluessel = KanalSchluessel::aus_seed(hex(
            "77076d0a7318a57d3c16c17251b26645df4c2f87ebc0992ab177fba51db92c2a",
        ));
        assert_eq!(
            schluessel.public_key().as_bytes(),
            &hex("8520f0098930a754748b7ddcb43ef75a0dbf3a0d26381af4eba4a98eaa9b4e6a")
        );
    }

    #[test]
    fn debug_verraet_keinen_secret_key() {
        let schluessel = KanalSchluessel::aus_seed([7u8; 32]);
        let ausgabe = format!("{schluessel:?}");
        assert!(ausgabe.contains("REDACTED"));
        assert!(ausgabe.contains(schluessel.channel_id().as_str()));
    }
}
