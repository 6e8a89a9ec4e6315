//! offrecord-relay - Ephemerer WebSocket-Relay
//!
//! Der Relay haelt pro Kanal die letzten Nachrichten im Speicher und
//! verteilt neue an alle verbundenen Listener. Payloads sind fuer ihn opak;
//! Schluessel oder Klartexte sieht er nie.
//!
//! ## Architektur
//!
//! ```text
//! axum Router (/ws/{*kanal}, /health, /metrics)
//!     |
//!     v
//! ClientConnection (pro Verbindung ein Task)
//!     |  State Machine: Verbindend -> Offen -> Geschlossen
//!     |
//!     v
//! ChannelRegistry (DashMap) --> Channel (Mutex: Verlauf + Listener)
//!                                   |
//!                                   v
//!                          ListenerSender (begrenzte Queue je Verbindung)
//!
//! Heartbeat - meldet alle 15 s die Anwesenheit in jedem Kanal
//! ```

pub mod broadcast;
pub mod channel;
pub mod connection;
pub mod error;
pub mod heartbeat;
pub mod registry;
pub mod server_state;
pub mod websocket;

// Bequeme Re-Exporte
pub use broadcast::{ListenerSender, Zustellung};
pub use channel::Channel;
pub use connection::{ClientConnection, VerbindungsZustand};
pub use error::{RelayError, RelayResult};
pub use heartbeat::{heartbeat_starten, heartbeat_tick};
pub use registry::ChannelRegistry;
pub use server_state::{RelayConfig, RelayState};
pub use websocket::{router, RelayServer};
