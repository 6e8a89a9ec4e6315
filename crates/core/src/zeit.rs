//! Zeitstempel fuer Log-Eintraege

/// Aktuelle Unix-Zeit in Millisekunden
pub fn jetzt_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
