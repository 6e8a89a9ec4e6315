//! Chat-Session: Schluessel, View und Verbindung eines Kanals
//!
//! Die Session gehoert genau einem Kanal. Wechselt die Passphrase auf
//! einen anderen Kanal, wird zuerst die alte Verbindung geschlossen, dann
//! der View geleert und neu verbunden.

use offrecord_core::ChannelId;
use offrecord_crypto::{nachricht_verschluesseln, KanalSchluessel, Klartext};

use crate::connection::RelayVerbindung;
use crate::error::{ClientError, ClientResult};
use crate::invite::Einladung;
use crate::view::{AngezeigteNachricht, ChannelView, ViewAenderung};

/// Was beim Empfangen passiert ist
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEreignis {
    /// Neue Eintraege im View (Anzahl)
    Neu(usize),
    Geleert,
    Anwesenheit(usize),
    /// Verbindung beendet; `wiederverbinden` stellt sie wieder her
    Getrennt,
}

/// Eine laufende Chat-Session
pub struct ChatSession {
    einladung: Einladung,
    nickname: String,
    schluessel: KanalSchluessel,
    view: ChannelView,
    verbindung: Option<RelayVerbindung>,
}

impl ChatSession {
    /// Leitet den Schluessel aus der Einladung ab und verbindet
    pub async fn verbinden(einladung: Einladung, nickname: impl Into<String>) -> ClientResult<Self> {
        let passphrase = einladung.passphrase().ok_or(ClientError::KeinKanal)?;
        let schluessel = KanalSchluessel::aus_passphrase(passphrase);
        let verbindung =
            RelayVerbindung::verbinden(&einladung.websocket_url(schluessel.channel_id())).await?;

        tracing::info!(kanal = %schluessel.channel_id(), "Session gestartet");
        Ok(Self {
            einladung,
            nickname: nickname.into(),
            schluessel,
            view: ChannelView::neu(),
            verbindung: Some(verbindung),
        })
    }

    /// Wechselt die Passphrase
    ///
    /// Gibt `true` zurueck wenn dabei der Kanal gewechselt wurde.
    pub async fn passphrase_setzen(&mut self, passphrase: &str) -> ClientResult<bool> {
        let schluessel = KanalSchluessel::aus_passphrase(passphrase);
        self.einladung = self.einladung.mit_passphrase(passphrase);

        if schluessel.channel_id() == self.schluessel.channel_id() && self.verbindung.is_some() {
            return Ok(false);
        }

        self.trennen().await;
        self.schluessel = schluessel;
        self.view.zuruecksetzen();
        self.verbindung = Some(
            RelayVerbindung::verbinden(&self.einladung.websocket_url(self.schluessel.channel_id()))
                .await?,
        );
        tracing::info!(kanal = %self.schluessel.channel_id(), "Kanal gewechselt");
        Ok(true)
    }

    /// Baut die Verbindung zum selben Kanal neu auf
    pub async fn wiederverbinden(&mut self) -> ClientResult<()> {
        self.trennen().await;
        self.view.zuruecksetzen();
        self.verbindung = Some(
            RelayVerbindung::verbinden(&self.einladung.websocket_url(self.schluessel.channel_id()))
                .await?,
        );
        Ok(())
    }

    /// Verschluesselt und sendet eine Nachricht
    pub async fn senden(&mut self, text: &str) -> ClientResult<()> {
        let umschlag =
            nachricht_verschluesseln(&self.schluessel, &Klartext::neu(&self.nickname, text))?;
        self.verbindung_mut()?.umschlag_senden(&umschlag).await
    }

    /// Leert den Kanal fuer alle
    pub async fn leeren(&mut self) -> ClientResult<()> {
        self.verbindung_mut()?.leeren_senden().await
    }

    /// Wartet auf die naechste Nachricht des Relays und wendet sie an
    ///
    /// Abbrechen zwischen zwei Nachrichten ist unschaedlich.
    pub async fn naechstes_ereignis(&mut self) -> ClientResult<SessionEreignis> {
        let verbindung = self.verbindung_mut()?;
        let empfangen = verbindung.empfangen().await;

        let nachricht = match empfangen {
            Ok(Some(nachricht)) => nachricht,
            Ok(None) => {
                self.verbindung = None;
                return Ok(SessionEreignis::Getrennt);
            }
            Err(e) => {
                self.verbindung = None;
                return Err(e);
            }
        };

        Ok(match self.view.anwenden(nachricht) {
            ViewAenderung::Angehaengt(anzahl) => SessionEreignis::Neu(anzahl),
            ViewAenderung::Geleert => SessionEreignis::Geleert,
            ViewAenderung::Anwesenheit(anzahl) => SessionEreignis::Anwesenheit(anzahl),
        })
    }

    /// Schliesst die Verbindung, falls offen
    pub async fn trennen(&mut self) {
        if let Some(verbindung) = self.verbindung.take() {
            if let Err(e) = verbindung.schliessen().await {
                tracing::debug!(fehler = %e, "Schliessen fehlgeschlagen");
            }
        }
    }

    pub fn ist_verbunden(&self) -> bool {
        self.verbindung.is_some()
    }

    /// Alle Eintraege des Views, entschluesselt
    pub fn nachrichten(&self) -> Vec<AngezeigteNachricht> {
        self.view.nachrichten(&self.schluessel)
    }

    pub fn view(&self) -> &ChannelView {
        &self.view
    }

    pub fn channel_id(&self) -> &ChannelId {
        self.schluessel.channel_id()
    }

    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    pub fn nickname_setzen(&mut self, nickname: impl Into<String>) {
        self.nickname = nickname.into();
    }

    /// Teilbarer Link des aktuellen Kanals
    pub fn link(&self) -> String {
        self.einladung.link()
    }

    fn verbindung_mut(&mut self) -> ClientResult<&mut RelayVerbindung> {
        self.verbindung.as_mut().ok_or(ClientError::NichtVerbunden)
    }
}
