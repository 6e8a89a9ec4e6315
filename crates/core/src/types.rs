//! Gemeinsame Identifikationstypen fuer offrecord
//!
//! Beide IDs verwenden das Newtype-Pattern um Verwechslungen zwischen
//! Kanal-Adressen und Verbindungs-Handles zur Compilezeit auszuschliessen.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Adresse eines Kanals
///
/// Clients leiten sie aus dem oeffentlichen Schluessel ab, der Relay
/// behandelt sie als uninterpretierten Map-Schluessel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    /// Erstellt eine ChannelId aus einer beliebigen Zeichenkette
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Gibt die ID als &str zurueck
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Gibt die innere Zeichenkette zurueck
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ChannelId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ChannelId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Eindeutiges Handle einer Listener-Verbindung
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListenerId(pub Uuid);

impl ListenerId {
    /// Erstellt eine neue zufaellige ListenerId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Gibt die innere UUID zurueck
    pub fn inner(&self) -> Uuid {
        self.0
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "listener:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listener_id_eindeutig() {
        let a = ListenerId::new();
        let b = ListenerId::new();
        assert_ne!(a, b, "Zwei neue ListenerIds muessen verschieden sein");
    }

    #[test]
    fn channel_id_gleichheit_nach_inhalt() {
        let a = ChannelId::from("abc");
        let b = ChannelId::new(String::from("abc"));
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "abc");
    }

    #[test]
    fn channel_id_display_ist_roh() {
        let id = ChannelId::from("a/b+c");
        assert_eq!(id.to_string(), "a/b+c");
    }

    #[test]
    fn channel_id_serialisiert_als_string() {
        let id = ChannelId::from("kanal");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"kanal\"");
        let zurueck: ChannelId = serde_json::from_str(&json).unwrap();
        assert_eq!(zurueck, id);
    }

    #[test]
    fn listener_id_display() {
        let id = ListenerId(Uuid::nil());
        assert!(id.to_string().starts_with("listener:"));
    }
}
