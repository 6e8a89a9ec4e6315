//! Anzeige-Zustand eines Kanals
//!
//! Der View spiegelt, was der Relay geschickt hat: Eintraege werden
//! angehaengt, `{"cl":true}` leert, `{"ct":n}` setzt die Anzahl. Beim
//! Neuverbinden wird alles verworfen, weil der Relay den Verlauf erneut
//! schickt.

use chrono::{Local, TimeZone};
use offrecord_crypto::{nachricht_entschluesseln, KanalSchluessel};
use offrecord_protocol::{Eintrag, ServerNachricht};

/// Auswirkung einer Server-Nachricht auf den View
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewAenderung {
    /// So viele Eintraege kamen hinzu
    Angehaengt(usize),
    Geleert,
    Anwesenheit(usize),
}

/// Ein Eintrag, wie er angezeigt wird
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AngezeigteNachricht {
    Lesbar {
        zeitstempel_ms: i64,
        nickname: String,
        text: String,
    },
    /// Nicht mit dem eigenen Schluessel lesbar
    Unlesbar { zeitstempel_ms: i64, grund: String },
}

impl AngezeigteNachricht {
    pub fn zeitstempel_ms(&self) -> i64 {
        match self {
            Self::Lesbar { zeitstempel_ms, .. } | Self::Unlesbar { zeitstempel_ms, .. } => {
                *zeitstempel_ms
            }
        }
    }
}

impl std::fmt::Display for AngezeigteNachricht {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let zeit = uhrzeit(self.zeitstempel_ms());
        match self {
            Self::Lesbar { nickname, text, .. } => write!(f, "[{zeit}] {nickname}: {text}"),
            Self::Unlesbar { grund, .. } => write!(f, "[{zeit}] <unlesbar: {grund}>"),
        }
    }
}

fn uhrzeit(zeitstempel_ms: i64) -> String {
    match Local.timestamp_millis_opt(zeitstempel_ms).single() {
        Some(zeit) => zeit.format("%H:%M:%S").to_string(),
        None => "--:--:--".to_string(),
    }
}

/// Lokaler Spiegel eines Kanals
#[derive(Debug, Default)]
pub struct ChannelView {
    eintraege: Vec<Eintrag>,
    anwesend: Option<usize>,
}

impl ChannelView {
    pub fn neu() -> Self {
        Self::default()
    }

    /// Wendet eine Server-Nachricht an
    pub fn anwenden(&mut self, nachricht: ServerNachricht) -> ViewAenderung {
        match nachricht {
            ServerNachricht::Verlauf(eintraege) => {
                let anzahl = eintraege.len();
                self.eintraege.extend(eintraege);
                ViewAenderung::Angehaengt(anzahl)
            }
            ServerNachricht::Geleert { .. } => {
                self.eintraege.clear();
                ViewAenderung::Geleert
            }
            ServerNachricht::Anwesenheit { anzahl } => {
                self.anwesend = Some(anzahl);
                ViewAenderung::Anwesenheit(anzahl)
            }
        }
    }

    /// Verwirft alles (Neuverbindung oder Kanalwechsel)
    pub fn zuruecksetzen(&mut self) {
        self.eintraege.clear();
        self.anwesend = None;
    }

    pub fn eintraege(&self) -> &[Eintrag] {
        &self.eintraege
    }

    /// Zuletzt gemeldete Listener-Anzahl, `None` vor der ersten Meldung
    pub fn anwesend(&self) -> Option<usize> {
        self.anwesend
    }

    /// Entschluesselt alle Eintraege fuer die Anzeige
    pub fn nachrichten(&self, schluessel: &KanalSchluessel) -> Vec<AngezeigteNachricht> {
        self.eintraege
            .iter()
            .map(|eintrag| eintrag_anzeigen(eintrag, schluessel))
            .collect()
    }
}

fn eintrag_anzeigen(eintrag: &Eintrag, schluessel: &KanalSchluessel) -> AngezeigteNachricht {
    let zeitstempel_ms = eintrag.zeitstempel();
    let Some(payload) = eintrag.payload().as_str() else {
        return AngezeigteNachricht::Unlesbar {
            zeitstempel_ms,
            grund: "kein Text-Payload".to_string(),
        };
    };

    match nachricht_entschluesseln(schluessel, payload) {
        Ok(klartext) => AngezeigteNachricht::Lesbar {
            zeitstempel_ms,
            nickname: klartext.nickname,
            text: klartext.text,
        },
        Err(e) => {
            tracing::debug!(fehler = %e, "Eintrag nicht lesbar");
            AngezeigteNachricht::Unlesbar {
                zeitstempel_ms,
                grund: e.to_string(),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use offrecord_crypto::{nachricht_verschluesseln, Klartext};
    use serde_json::json;

    fn verschluesselt(schluessel: &KanalSchluessel, nick: &str, text: &str) -> serde_json::Value {
        let umschlag = nachricht_verschluesseln(schluessel, &Klartext::neu(nick, text)).unwrap();
        json!(umschlag.zu_base64().unwrap())
    }

    #[test]
    fn verlauf_haengt_an_und_geleert_leert() {
        let mut view = ChannelView::neu();
        assert_eq!(
            view.anwenden(ServerNachricht::verlauf(vec![
                Eintrag::neu(1, json!("a")),
                Eintrag::neu(2, json!("b")),
            ])),
            ViewAenderung::Angehaengt(2)
        );
        view.anwenden(ServerNachricht::neuer_eintrag(Eintrag::neu(3, json!("c"))));
        assert_eq!(view.eintraege().len(), 3);

        assert_eq!(view.anwenden(ServerNachricht::geleert()), ViewAenderung::Geleert);
        assert!(view.eintraege().is_empty());
    }

    #[test]
    fn anwesenheit_und_zuruecksetzen() {
        let mut view = ChannelView::neu();
        assert_eq!(view.anwesend(), None);
        view.anwenden(ServerNachricht::anwesenheit(4));
        assert_eq!(view.anwesend(), Some(4));
        view.anwenden(ServerNachricht::neuer_eintrag(Eintrag::neu(1, json!("x"))));

        view.zuruecksetzen();
        assert_eq!(view.anwesend(), None);
        assert!(view.eintraege().is_empty());
    }

    #[test]
    fn lesbare_und_unlesbare_eintraege() {
        let eigener = KanalSchluessel::aus_seed([1u8; 32]);
        let fremder = KanalSchluessel::aus_seed([2u8; 32]);

        let mut view = ChannelView::neu();
        view.anwenden(ServerNachricht::verlauf(vec![
            Eintrag::neu(10, verschluesselt(&eigener, "anna", "hallo")),
            Eintrag::neu(20, verschluesselt(&fremder, "eve", "psst")),
            Eintrag::neu(30, json!({"kein": "text"})),
        ]));

        let nachrichten = view.nachrichten(&eigener);
        assert_eq!(
            nachrichten[0],
            AngezeigteNachricht::Lesbar {
                zeitstempel_ms: 10,
                nickname: "anna".to_string(),
                text: "hallo".to_string(),
            }
        );
        assert!(matches!(
            nachrichten[1],
            AngezeigteNachricht::Unlesbar { zeitstempel_ms: 20, .. }
        ));
        assert!(matches!(
            nachrichten[2],
            AngezeigteNachricht::Unlesbar { zeitstempel_ms: 30, .. }
        ));
    }

    #[test]
    fn anzeige_format() {
        let nachricht = AngezeigteNachricht::Lesbar {
            zeitstempel_ms: 0,
            nickname: "bob".to_string(),
            text: "hi".to_string(),
        };
        let text = nachricht.to_string();
        assert!(text.ends_with("] bob: hi"), "{text}");
        assert!(text.starts_with('['));
    }
}
