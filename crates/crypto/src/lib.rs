//! # offrecord-crypto
//!
//! Client-seitige Kryptografie fuer offrecord. Der Relay benutzt dieses
//! Crate nicht; er sieht nur opake Payloads.
//!
//! ## Module
//! - `keys` - Passphrase -> Schluessel-Paar + Kanal-ID (PBKDF2, X25519)
//! - `e2e` - Selbst-adressierte NaCl-Box, Nachrichten-Pipeline
//! - `types` - Klartext-Konvention und Payload-Typen
//! - `error` - Fehlertypen

pub mod e2e;
pub mod error;
pub mod keys;
pub mod types;

// Bequeme Re-Exports
pub use error::{CryptoError, CryptoResult};
pub use keys::{channel_id_aus_public_key, KanalSchluessel, ITERATIONEN, SALZ};
pub use types::{Klartext, VerschluesselterPayload, NONCE_LAENGE};

pub use e2e::{
    entschluesseln, nachricht_entschluesseln, nachricht_verschluesseln, verschluesseln,
};
