//! Feste Protokoll-Grenzwerte
//!
//! Die Werte sind Teil des Protokolls: Clients verlassen sich darauf, dass
//! ein Kanal hoechstens zehn Eintraege zurueckspielt und dass Frames ueber
//! 1 MiB mit Close-Code 1009 abgewiesen werden.

/// Maximale Anzahl gespeicherter Eintraege pro Kanal
pub const MAX_VERLAUF: usize = 10;

/// Maximale Groesse eines eingehenden Frames (1 MiB)
pub const MAX_NACHRICHT_BYTES: usize = 1024 * 1024;

/// Intervall fuer die Anwesenheits-Meldung aller Kanaele
pub const HEARTBEAT_INTERVALL_SEK: u64 = 15;
