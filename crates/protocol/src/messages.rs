//! Nachrichten vom Relay an die Clients
//!
//! Alle Server-Nachrichten sind JSON-Text-Frames in einer von drei Formen:
//!
//! ```text
//! [[ts, payload], ...]   Verlauf beim Beitritt bzw. einzelner neuer Eintrag
//! {"cl": true}           Kanal wurde geleert
//! {"ct": n}              Anzahl verbundener Listener
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Eintrag
// ---------------------------------------------------------------------------

/// Ein Log-Eintrag: `(Zeitstempel in ms, Payload)`
///
/// Serialisiert als 2-elementiges JSON-Array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Eintrag(pub i64, pub Value);

impl Eintrag {
    pub fn neu(zeitstempel_ms: i64, payload: Value) -> Self {
        Self(zeitstempel_ms, payload)
    }

    /// Unix-Zeit in Millisekunden zum Zeitpunkt des Postens
    pub fn zeitstempel(&self) -> i64 {
        self.0
    }

    /// Der vom Client gesendete, fuer den Relay opake Payload
    pub fn payload(&self) -> &Value {
        &self.1
    }
}

// ---------------------------------------------------------------------------
// ServerNachricht
// ---------------------------------------------------------------------------

/// Alle Nachrichten die der Relay an Listener sendet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServerNachricht {
    /// Kompletter Verlauf (beim Beitritt) oder ein einzelner neuer Eintrag
    Verlauf(Vec<Eintrag>),
    /// Der Kanal wurde geleert
    Geleert {
        #[serde(rename = "cl")]
        geleert: bool,
    },
    /// Aktuelle Anzahl der Listener im Kanal
    Anwesenheit {
        #[serde(rename = "ct")]
        anzahl: usize,
    },
}

impl ServerNachricht {
    pub fn verlauf(eintraege: Vec<Eintrag>) -> Self {
        Self::Verlauf(eintraege)
    }

    /// Inkrementelle Aktualisierung mit genau einem Eintrag
    pub fn neuer_eintrag(eintrag: Eintrag) -> Self {
        Self::Verlauf(vec![eintrag])
    }

    pub fn geleert() -> Self {
        Self::Geleert { geleert: true }
    }

    pub fn anwesenheit(anzahl: usize) -> Self {
        Self::Anwesenheit { anzahl }
    }

    /// Serialisiert die Nachricht als JSON-Text
    pub fn zu_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parst einen Text-Frame des Relays
    pub fn aus_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn verlauf_format() {
        let nachricht = ServerNachricht::verlauf(vec![
            Eintrag::neu(1000, json!("abc")),
            Eintrag::neu(2000, json!({"x": 1})),
        ]);
        assert_eq!(
            nachricht.zu_json().unwrap(),
            r#"[[1000,"abc"],[2000,{"x":1}]]"#
        );
    }

    #[test]
    fn leerer_verlauf_ist_leeres_array() {
        let nachricht = ServerNachricht::verlauf(Vec::new());
        assert_eq!(nachricht.zu_json().unwrap(), "[]");
    }

    #[test]
    fn geleert_format() {
        assert_eq!(ServerNachricht::geleert().zu_json().unwrap(), r#"{"cl":true}"#);
    }

    #[test]
    fn anwesenheit_format() {
        assert_eq!(
            ServerNachricht::anwesenheit(3).zu_json().unwrap(),
            r#"{"ct":3}"#
        );
    }

    #[test]
    fn parsen_erkennt_alle_formen() {
        assert_eq!(
            ServerNachricht::aus_json(r#"[[5,"p"]]"#).unwrap(),
            ServerNachricht::neuer_eintrag(Eintrag::neu(5, json!("p")))
        );
        assert_eq!(
            ServerNachricht::aus_json(r#"{"cl":true}"#).unwrap(),
            ServerNachricht::geleert()
        );
        assert_eq!(
            ServerNachricht::aus_json(r#"{"ct":0}"#).unwrap(),
            ServerNachricht::anwesenheit(0)
        );
    }

    #[test]
    fn unbekannte_form_schlaegt_fehl() {
        assert!(ServerNachricht::aus_json(r#"{"foo":1}"#).is_err());
        assert!(ServerNachricht::aus_json("kein json").is_err());
    }

    #[test]
    fn eintrag_accessoren() {
        let eintrag = Eintrag::neu(42, json!([1, 2]));
        assert_eq!(eintrag.zeitstempel(), 42);
        assert_eq!(eintrag.payload(), &json!([1, 2]));
    }
}
