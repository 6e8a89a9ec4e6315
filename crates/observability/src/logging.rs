//! Structured Logging Setup via tracing-subscriber
//!
//! Konfigurierbar per Umgebungsvariable (ueberschreibt die Konfigurationsdatei):
//! - `OFFRECORD_LOG_LEVEL`: Filter-Direktive (trace/debug/info/warn/error
//!   oder `offrecord_relay=debug,info`), Standard: info
//! - `OFFRECORD_LOG_FORMAT`: Format (text/json), Standard: text
//!
//! Ausgabe geht immer nach stderr, damit der Terminal-Client stdout fuer
//! den Chat behaelt.

use tracing_subscriber::{fmt, EnvFilter};

/// Umgebungsvariable fuer den Log-Filter
pub const LOG_LEVEL_VAR: &str = "OFFRECORD_LOG_LEVEL";

/// Umgebungsvariable fuer das Log-Format
pub const LOG_FORMAT_VAR: &str = "OFFRECORD_LOG_FORMAT";

/// Initialisiert das Logging-System.
///
/// Ein zweiter Aufruf im selben Prozess ist wirkungslos.
pub fn logging_initialisieren(level: &str, format: &str) {
    let filter = EnvFilter::try_from_env(LOG_LEVEL_VAR)
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let format = format_aufloesen(format);

    let ergebnis = match format.as_str() {
        "json" => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_current_span(true)
            .with_writer(std::io::stderr)
            .try_init(),
        _ => fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .try_init(),
    };

    if ergebnis.is_err() {
        tracing::debug!("Logging war bereits initialisiert");
    }
}

/// Waehlt das Format: Umgebung vor Konfiguration, unbekannt -> text
fn format_aufloesen(konfiguriert: &str) -> String {
    let format = std::env::var(LOG_FORMAT_VAR).unwrap_or_else(|_| konfiguriert.to_string());
    if log_format_gueltig(&format) {
        format
    } else {
        "text".to_string()
    }
}

/// Validiert ob ein Log-Format-String gueltig ist.
pub fn log_format_gueltig(format: &str) -> bool {
    matches!(format, "text" | "json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_werte() {
        assert!(log_format_gueltig("text"));
        assert!(log_format_gueltig("json"));
        assert!(!log_format_gueltig("xml"));
        assert!(!log_format_gueltig("JSON"));
    }

    #[test]
    fn format_aus_env_und_fallback() {
        // Ein Test fuer alle Faelle, da Umgebungsvariablen prozessweit sind
        std::env::remove_var(LOG_FORMAT_VAR);
        assert_eq!(format_aufloesen("json"), "json");
        assert_eq!(format_aufloesen("yaml"), "text");

        std::env::set_var(LOG_FORMAT_VAR, "json");
        assert_eq!(format_aufloesen("text"), "json");
        std::env::remove_var(LOG_FORMAT_VAR);
    }

    #[test]
    fn doppelte_initialisierung_paniced_nicht() {
        logging_initialisieren("info", "text");
        logging_initialisieren("debug", "json");
    }
}
