//! Ein Kanal: begrenzter Verlauf plus Listener-Menge
//!
//! Der gesamte veraenderliche Zustand liegt hinter einem Mutex. Verteilt
//! wird, waehrend der Lock gehalten wird. Dadurch sieht jeder Listener die
//! Eintraege in derselben Reihenfolge wie sie im Verlauf stehen, und ein
//! neuer Listener bekommt den Verlauf garantiert vor jedem Inkrement.
//!
//! Sendungen blockieren nie (`try_send`), der Lock wird also nur kurz gehalten.
//! Wer mit seiner Queue nicht hinterherkommt, wird entfernt statt Eintraege
//! zu verpassen.

use offrecord_core::{jetzt_ms, ChannelId, ListenerId};
use offrecord_protocol::{Eintrag, ServerNachricht};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;

use axum::extract::ws::Utf8Bytes;

use crate::broadcast::{an_alle_senden, frame_bauen, ListenerSender};

struct ChannelZustand {
    verlauf: VecDeque<Eintrag>,
    listeners: Vec<ListenerSender>,
}

impl ChannelZustand {
    /// Verteilt einen Frame; entfernte Listener aendern die Anzahl
    fn verteilen(&mut self, frame: &Utf8Bytes) {
        let entfernt = an_alle_senden(&mut self.listeners, frame);
        if entfernt > 0 && !self.listeners.is_empty() {
            // Weitere Ausfaelle in dieser Runde korrigiert der Heartbeat
            self.anwesenheit_senden();
        }
    }

    fn anwesenheit_senden(&mut self) {
        let nachricht = ServerNachricht::anwesenheit(self.listeners.len());
        if let Some(frame) = frame_bauen(&nachricht) {
            an_alle_senden(&mut self.listeners, &frame);
        }
    }
}

/// Ephemerer Kanal im Speicher des Relays
pub struct Channel {
    id: ChannelId,
    verlauf_groesse: usize,
    zustand: Mutex<ChannelZustand>,
}

impl Channel {
    pub fn neu(id: ChannelId, verlauf_groesse: usize) -> Self {
        Self {
            id,
            verlauf_groesse,
            zustand: Mutex::new(ChannelZustand {
                verlauf: VecDeque::with_capacity(verlauf_groesse + 1),
                listeners: Vec::new(),
            }),
        }
    }

    pub fn id(&self) -> &ChannelId {
        &self.id
    }

    /// Haengt einen Payload an und verteilt ihn an alle Listener
    ///
    /// Ist der Verlauf voll, faellt der aelteste Eintrag heraus.
    pub fn posten(&self, payload: Value) -> Eintrag {
        let eintrag = Eintrag::neu(jetzt_ms(), payload);
        let mut zustand = self.zustand.lock();

        zustand.verlauf.push_back(eintrag.clone());
        while zustand.verlauf.len() > self.verlauf_groesse {
            zustand.verlauf.pop_front();
        }

        if let Some(frame) = frame_bauen(&ServerNachricht::neuer_eintrag(eintrag.clone())) {
            zustand.verteilen(&frame);
        }
        eintrag
    }

    /// Leert den Verlauf und meldet das allen Listenern
    ///
    /// Wer verbunden ist, darf leeren.
    pub fn leeren(&self) {
        let mut zustand = self.zustand.lock();
        zustand.verlauf.clear();
        if let Some(frame) = frame_bauen(&ServerNachricht::geleert()) {
            zustand.verteilen(&frame);
        }
        tracing::debug!(kanal = %self.id, "Kanal geleert");
    }

    /// Nimmt einen Listener auf
    ///
    /// Der neue Listener bekommt den kompletten Verlauf, danach erfahren
    /// alle die neue Anzahl.
    pub fn beitreten(&self, listener: ListenerSender) {
        let mut zustand = self.zustand.lock();
        zustand
            .listeners
            .retain(|l| l.listener_id != listener.listener_id);

        let verlauf = ServerNachricht::verlauf(zustand.verlauf.iter().cloned().collect());
        if let Some(frame) = frame_bauen(&verlauf) {
            let _ = listener.senden(frame);
        }
        zustand.listeners.push(listener);

        zustand.anwesenheit_senden();
    }

    /// Entfernt einen Listener
    ///
    /// Gibt `true` zurueck wenn der Kanal danach leer ist. Sonst wird die
    /// neue Anzahl an die Verbleibenden gemeldet.
    pub fn verlassen(&self, listener_id: &ListenerId) -> bool {
        let mut zustand = self.zustand.lock();
        let vorher = zustand.listeners.len();
        zustand.listeners.retain(|l| &l.listener_id != listener_id);

        if zustand.listeners.is_empty() {
            return true;
        }
        if zustand.listeners.len() != vorher {
            zustand.anwesenheit_senden();
        }
        false
    }

    /// Meldet allen Listenern die aktuelle Anzahl
    pub fn anwesenheit_melden(&self) {
        self.zustand.lock().anwesenheit_senden();
    }

    pub fn listener_anzahl(&self) -> usize {
        self.zustand.lock().listeners.len()
    }

    pub fn ist_leer(&self) -> bool {
        self.zustand.lock().listeners.is_empty()
    }

    /// Kopie des aktuellen Verlaufs, aelteste zuerst
    pub fn verlauf(&self) -> Vec<Eintrag> {
        self.zustand.lock().verlauf.iter().cloned().collect()
    }
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let zustand = self.zustand.lock();
        f.debug_struct("Channel")
            .field("id", &self.id)
            .field("verlauf", &zustand.verlauf.len())
            .field("listeners", &zustand.listeners.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
