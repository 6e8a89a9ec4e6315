//! Eingabezeilen des Terminal-Clients

/// Eine interpretierte Eingabezeile
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Befehl {
    /// Normale Nachricht
    Senden(String),
    /// `/wipe`
    Leeren,
    /// `/join <passphrase>`
    Beitreten(String),
    /// `/lobby`
    Lobby,
    /// `/random`
    Zufall,
    /// `/link`
    Link,
    /// `/nick <name>`
    Nick(String),
    /// `/quit`
    Beenden,
    /// `/hilfe` oder `/help`
    Hilfe,
    Unbekannt(String),
}

impl Befehl {
    /// Interpretiert eine Zeile; leere Zeilen ergeben `None`
    ///
    /// `//text` sendet `/text` als Nachricht.
    pub fn parsen(zeile: &str) -> Option<Self> {
        let zeile = zeile.trim_end_matches(|c: char| c == '\r' || c == '\n');
        if zeile.trim().is_empty() {
            return None;
        }
        if let Some(text) = zeile.strip_prefix("//") {
            return Some(Self::Senden(format!("/{text}")));
        }
        let Some(befehl) = zeile.strip_prefix('/') else {
            return Some(Self::Senden(zeile.to_string()));
        };

        let (name, argument) = match befehl.split_once(' ') {
            Some((name, argument)) => (name, Some(argument)),
            None => (befehl, None),
        };

        Some(match (name, argument) {
            ("wipe", None) => Self::Leeren,
            // Die Passphrase wird exakt uebernommen, auch mit Leerzeichen
            ("join", Some(passphrase)) => Self::Beitreten(passphrase.to_string()),
            ("join", None) => Self::Beitreten(String::new()),
            ("lobby", None) => Self::Lobby,
            ("random", None) => Self::Zufall,
            ("link", None) => Self::Link,
            ("nick", Some(name)) if !name.trim().is_empty() => Self::Nick(name.trim().to_string()),
            ("quit", None) => Self::Beenden,
            ("help" | "hilfe", None) => Self::Hilfe,
            _ => Self::Unbekannt(zeile.to_string()),
        })
    }
}

/// Hilfetext fuer `/help`
pub const HILFE: &str = "\
/wipe            Kanal fuer alle leeren
/join <pass>     Kanal wechseln
/lobby           Oeffentlicher Kanal
/random          Neuer zufaelliger Kanal
/link            Link zum Teilen anzeigen
/nick <name>     Nickname aendern
/quit            Beenden";
