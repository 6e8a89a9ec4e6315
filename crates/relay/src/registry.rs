//! Registry aller aktiven Kanaele
//!
//! Kanaele entstehen beim ersten Beitritt und verschwinden, sobald der
//! letzte Listener gegangen ist. Es gibt keine Persistenz.
//!
//! ## Lock-Reihenfolge
//! Immer erst der DashMap-Shard, dann der Mutex des Kanals. Der Beitritt
//! passiert unter dem Shard-Lock, das Freigeben prueft unter demselben
//! Lock ob der Kanal noch leer ist. Ein Beitritt kann also nie in einem
//! Kanal landen, der gerade aus der Map entfernt wird.

use dashmap::DashMap;
use offrecord_core::{ChannelId, ListenerId, MAX_VERLAUF};
use std::sync::Arc;

use crate::broadcast::ListenerSender;
use crate::channel::Channel;

/// Nebenlaeufige Map von Kanal-ID auf Kanal
///
/// Wird einmal beim Start erzeugt und per `Arc` in den Accept-Pfad gegeben.
pub struct ChannelRegistry {
    kanaele: DashMap<ChannelId, Arc<Channel>>,
    verlauf_groesse: usize,
}

impl ChannelRegistry {
    pub fn neu(verlauf_groesse: usize) -> Self {
        Self {
            kanaele: DashMap::new(),
            verlauf_groesse,
        }
    }

    /// Liefert den Kanal zu `id`, legt ihn bei Bedarf an
    pub fn aufloesen(&self, id: &ChannelId) -> Arc<Channel> {
        let eintrag = self
            .kanaele
            .entry(id.clone())
            .or_insert_with(|| self.kanal_anlegen(id));
        Arc::clone(eintrag.value())
    }

    /// Loest den Kanal auf und tritt ihm atomar bei
    pub fn beitreten(&self, id: &ChannelId, listener: ListenerSender) -> Arc<Channel> {
        let eintrag = self
            .kanaele
            .entry(id.clone())
            .or_insert_with(|| self.kanal_anlegen(id));
        let kanal = Arc::clone(eintrag.value());
        kanal.beitreten(listener);
        drop(eintrag);
        kanal
    }

    /// Entfernt den Listener; gibt `true` zurueck wenn der Kanal dabei verschwand
    pub fn verlassen(&self, id: &ChannelId, listener_id: &ListenerId) -> bool {
        let Some(kanal) = self.kanal(id) else {
            return false;
        };
        if kanal.verlassen(listener_id) {
            self.freigeben(id)
        } else {
            false
        }
    }

    /// Entfernt den Kanal, falls er in diesem Moment leer ist
    pub fn freigeben(&self, id: &ChannelId) -> bool {
        let entfernt = self
            .kanaele
            .remove_if(id, |_, kanal| kanal.ist_leer())
            .is_some();
        if entfernt {
            tracing::debug!(kanal = %id, "Kanal freigegeben");
        }
        entfernt
    }

    pub fn kanal(&self, id: &ChannelId) -> Option<Arc<Channel>> {
        self.kanaele.get(id).map(|eintrag| Arc::clone(eintrag.value()))
    }

    pub fn kanal_anzahl(&self) -> usize {
        self.kanaele.len()
    }

    /// Momentaufnahme aller Kanaele
    ///
    /// Nach der Rueckgabe ist kein Shard mehr gesperrt.
    pub fn kanaele(&self) -> Vec<Arc<Channel>> {
        self.kanaele
            .iter()
            .map(|eintrag| Arc::clone(eintrag.value()))
            .collect()
    }

    /// Meldet in jedem Kanal die Listener-Anzahl; gibt die Anzahl Kanaele zurueck
    pub fn anwesenheit_an_alle_melden(&self) -> usize {
        let kanaele = self.kanaele();
        for kanal in &kanaele {
            kanal.anwesenheit_melden();
        }
        kanaele.len()
    }

    fn kanal_anlegen(&self, id: &ChannelId) -> Arc<Channel> {
        tracing::debug!(kanal = %id, "Neuer Kanal");
        Arc::new(Channel::neu(id.clone(), self.verlauf_groesse))
    }
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self::neu(MAX_VERLAUF)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
