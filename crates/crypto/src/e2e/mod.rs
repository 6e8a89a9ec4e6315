//! E2E Verschluesselung der Kanal-Nachrichten
//!
//! Alle Teilnehmer eines Kanals teilen dasselbe Schluesselpaar. Jede
//! Nachricht ist eine NaCl-Box (X25519 + XSalsa20-Poly1305), die an das
//! eigene Schluesselpaar adressiert ist: Sender und Empfaenger sind
//! identisch. Der Relay speichert nur den Base64-kodierten Umschlag.
//!
//! ## Ablauf
//! 1. Klartext `[nickname, text]` als JSON kodieren
//! 2. Box mit frischer 24-Byte-Nonce verschluesseln
//! 3. `CBOR[nonce, ciphertext]` als Binaer-Frame an den Relay senden
//! 4. Empfaenger: Base64 -> CBOR -> Box oeffnen -> JSON

pub mod decrypt;
pub mod encrypt;

pub use decrypt::{entschluesseln, nachricht_entschluesseln};
pub use encrypt::{nachricht_verschluesseln, verschluesseln};

use crypto_box::SalsaBox;

use crate::keys::KanalSchluessel;

/// Box mit dem eigenen Public Key als Gegenstelle
pub(crate) fn selbst_box(schluessel: &KanalSchluessel) -> SalsaBox {
    SalsaBox::new(schluessel.public_key(), schluessel.secret_key())
}
