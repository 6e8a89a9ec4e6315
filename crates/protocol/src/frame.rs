//! Auswertung eingehender Client-Frames
//!
//! Der Relay kennt genau zwei Aktionen: Kanal leeren oder einen opaken
//! Payload posten. Alles andere fuehrt zum Schliessen der Verbindung.
//!
//! ## Regeln
//! ```text
//! Frame > Maximum            -> Close 1009 "Message too long"
//! Text, JSON, `clear` wahr   -> Leeren
//! Text, JSON, sonst          -> Posten(JSON-Wert)
//! Binaer                     -> Posten(Base64-Text der Rohdaten)
//! Text, kein JSON            -> Close 1007 "Failure: <Fehler>"
//! ```

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Close-Codes (RFC 6455)
// ---------------------------------------------------------------------------

/// Server wird heruntergefahren
pub const CLOSE_GOING_AWAY: u16 = 1001;

/// Inhalt des Frames nicht verarbeitbar
pub const CLOSE_PROTOKOLL_FEHLER: u16 = 1007;

/// Frame ueberschreitet die Groessengrenze
pub const CLOSE_ZU_GROSS: u16 = 1009;

/// Listener kam mit dem Lesen nicht hinterher und soll neu verbinden
pub const CLOSE_UEBERLASTET: u16 = 1013;

/// Close-Grund bei zu grossen Frames
pub const GRUND_ZU_GROSS: &str = "Message too long";

/// Maximale Laenge eines Close-Grundes in Bytes
const MAX_CLOSE_GRUND_BYTES: usize = 123;

/// Text-Frame mit dem ein Client den Kanal leert
pub const LEEREN_FRAME: &str = r#"{"clear":true}"#;

// ---------------------------------------------------------------------------
// Typen
// ---------------------------------------------------------------------------

/// Ein vom Client empfangenes Daten-Frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EingehendesFrame<'a> {
    Text(&'a str),
    Binaer(&'a [u8]),
}

impl EingehendesFrame<'_> {
    /// Groesse des Frames in Bytes
    pub fn laenge(&self) -> usize {
        match self {
            Self::Text(text) => text.len(),
            Self::Binaer(bytes) => bytes.len(),
        }
    }
}

/// Aktion die ein gueltiges Frame auf dem Kanal ausloest
#[derive(Debug, Clone, PartialEq)]
pub enum ClientAktion {
    /// Verlauf des Kanals loeschen
    Leeren,
    /// Payload anhaengen und an alle Listener verteilen
    Posten(Value),
}

/// Grund fuer das Schliessen einer Verbindung
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameFehler {
    #[error("Frame zu gross: {groesse} Bytes (Maximum: {maximum} Bytes)")]
    ZuGross { groesse: usize, maximum: usize },

    #[error("Ungueltiges Frame: {0}")]
    Ungueltig(String),
}

impl FrameFehler {
    /// WebSocket Close-Code fuer diesen Fehler
    pub fn close_code(&self) -> u16 {
        match self {
            Self::ZuGross { .. } => CLOSE_ZU_GROSS,
            Self::Ungueltig(_) => CLOSE_PROTOKOLL_FEHLER,
        }
    }

    /// Close-Grund, gekuerzt auf die erlaubten 123 Bytes
    pub fn close_grund(&self) -> String {
        let grund = match self {
            Self::ZuGross { .. } => GRUND_ZU_GROSS.to_string(),
            Self::Ungueltig(fehler) => format!("Failure: {fehler}"),
        };
        auf_grenze_kuerzen(grund, MAX_CLOSE_GRUND_BYTES)
    }

    /// Kurzes Label fuer Metriken
    pub fn label(&self) -> &'static str {
        match self {
            Self::ZuGross { .. } => "zu_gross",
            Self::Ungueltig(_) => "ungueltig",
        }
    }
}

// ---------------------------------------------------------------------------
// Auswertung
// ---------------------------------------------------------------------------

/// Wertet ein eingehendes Frame aus
///
/// Die Groessenpruefung erfolgt vor jedem Parsen.
pub fn frame_auswerten(
    frame: EingehendesFrame<'_>,
    maximum: usize,
) -> Result<ClientAktion, FrameFehler> {
    let groesse = frame.laenge();
    if groesse > maximum {
        return Err(FrameFehler::ZuGross { groesse, maximum });
    }

    match frame {
        EingehendesFrame::Text(text) => {
            let wert: Value =
                serde_json::from_str(text).map_err(|e| FrameFehler::Ungueltig(e.to_string()))?;
            if wert.get("clear").is_some_and(ist_wahr) {
                Ok(ClientAktion::Leeren)
            } else {
                Ok(ClientAktion::Posten(wert))
            }
        }
        EingehendesFrame::Binaer(bytes) => Ok(ClientAktion::Posten(Value::String(
            STANDARD.encode(bytes),
        ))),
    }
}

/// JavaScript-Wahrheitswert eines JSON-Werts
fn ist_wahr(wert: &Value) -> bool {
    match wert {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn auf_grenze_kuerzen(mut text: String, maximum: usize) -> String {
    if text.len() <= maximum {
        return text;
    }
    let mut ende = maximum;
    while !text.is_char_boundary(ende) {
        ende -= 1;
    }
    text.truncate(ende);
    text
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
