//! # offrecord-client
//!
//! Client-Seite von offrecord: Einladungs-Links, Schluesselableitung pro
//! Kanal, verschluesseltes Senden und ein lokaler View des Kanals.
//!
//! ## Module
//! - `invite` - `<origin>/#<passphrase>` parsen und erzeugen, Zufallsnamen
//! - `view` - Anzeige-Zustand aus den Relay-Nachrichten
//! - `connection` - WebSocket-Verbindung (tokio-tungstenite)
//! - `session` - Kanalwechsel, Senden, Leeren, Empfangen
//! - `befehl` - Eingabezeilen des Terminal-Clients

pub mod befehl;
pub mod connection;
pub mod error;
pub mod invite;
pub mod session;
pub mod view;

pub use befehl::Befehl;
pub use connection::RelayVerbindung;
pub use error::{ClientError, ClientResult};
pub use invite::{zufaelliger_kanalname, zufaelliger_nickname, Einladung, LOBBY};
pub use session::{ChatSession, SessionEreignis};
pub use view::{AngezeigteNachricht, ChannelView, ViewAenderung};
