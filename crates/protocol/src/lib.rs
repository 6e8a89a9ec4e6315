//! offrecord-protocol – Wire-Format zwischen Client und Relay
//!
//! - `messages` – Nachrichten Relay -> Client (Verlauf, Geleert, Anwesenheit)
//! - `frame` – Auswertung eingehender Client-Frames inkl. Close-Codes
//! - `envelope` – CBOR-Umschlag `[nonce, ciphertext]` (nur Client-seitig)
//!
//! Der Relay interpretiert Payloads nie. Er sieht nur JSON-Werte bzw.
//! Base64-Text, der fuer ihn bedeutungslos ist.

pub mod envelope;
pub mod frame;
pub mod messages;

pub use envelope::{Umschlag, UmschlagFehler};
pub use frame::{frame_auswerten, ClientAktion, EingehendesFrame, FrameFehler};
pub use messages::{Eintrag, ServerNachricht};
