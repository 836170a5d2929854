//! Voice-Praesenz – Wer ist in welchem Voice-Raum
//!
//! Der Server fuehrt die Voice-Mitgliedschaft selbst; Clients behaupten
//! sie nie. Ein Raum-Eintrag existiert nur, solange mindestens eine
//! Verbindung im Raum ist.

use dashmap::DashMap;
use funkraum_core::types::{ConnectionId, RoomId};
use std::collections::HashSet;
use std::sync::Arc;

/// Verwaltet die Voice-Raum-Praesenz aller Verbindungen
///
/// Thread-safe durch `Arc` + `DashMap`. Clone teilt den inneren Zustand.
#[derive(Clone)]
pub struct VoicePraesenz {
    inner: Arc<VoicePraesenzInner>,
}

struct VoicePraesenzInner {
    /// Voice-Raum -> Teilnehmer
    raeume: DashMap<RoomId, HashSet<ConnectionId>>,
}

impl VoicePraesenz {
    /// Erstellt eine neue, leere Praesenzverwaltung
    pub fn neu() -> Self {
        Self {
            inner: Arc::new(VoicePraesenzInner {
                raeume: DashMap::new(),
            }),
        }
    }

    /// Fuegt eine Verbindung einem Voice-Raum hinzu
    ///
    /// Gibt `false` zurueck, wenn die Verbindung bereits Teilnehmer war.
    pub fn beitreten(&self, verbindungs_id: ConnectionId, raum: &RoomId) -> bool {
        let neu = self
            .inner
            .raeume
            .entry(raum.clone())
            .or_default()
            .insert(verbindungs_id);
        if neu {
            tracing::debug!(connection_id = %verbindungs_id, raum = %raum, "Voice-Raum beigetreten");
        }
        neu
    }

    /// Entfernt eine Verbindung aus einem Voice-Raum
    ///
    /// Gibt `false` zurueck, wenn die Verbindung kein Teilnehmer war.
    /// Ein Raum ohne Teilnehmer wird unter dem Entry-Lock geloescht.
    pub fn verlassen(&self, verbindungs_id: &ConnectionId, raum: &RoomId) -> bool {
        let entfernt = match self.inner.raeume.get_mut(raum) {
            Some(mut menge) => menge.remove(verbindungs_id),
            None => false,
        };

        if entfernt {
            self.inner
                .raeume
                .remove_if(raum, |_, menge| menge.is_empty());
            tracing::debug!(connection_id = %verbindungs_id, raum = %raum, "Voice-Raum verlassen");
        }
        entfernt
    }

    /// Gibt alle Teilnehmer eines Voice-Raums zurueck
    pub fn teilnehmer(&self, raum: &RoomId) -> Vec<ConnectionId> {
        self.inner
            .raeume
            .get(raum)
            .map(|menge| menge.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Prueft, ob eine Verbindung Teilnehmer eines Voice-Raums ist
    pub fn ist_teilnehmer(&self, verbindungs_id: &ConnectionId, raum: &RoomId) -> bool {
        self.inner
            .raeume
            .get(raum)
            .map(|menge| menge.contains(verbindungs_id))
            .unwrap_or(false)
    }

    /// Gibt alle Voice-Raeume zurueck, in denen eine Verbindung steckt
    ///
    /// Grundlage der Bereinigung beim Trennen: jeder gefundene Raum
    /// durchlaeuft dort den regulaeren Austritts-Ablauf.
    pub fn raeume_von(&self, verbindungs_id: &ConnectionId) -> Vec<RoomId> {
        self.inner
            .raeume
            .iter()
            .filter(|eintrag| eintrag.value().contains(verbindungs_id))
            .map(|eintrag| eintrag.key().clone())
            .collect()
    }

    /// Gibt die Anzahl der Voice-Raeume mit Teilnehmern zurueck
    pub fn raum_anzahl(&self) -> usize {
        self.inner.raeume.len()
    }
}

impl Default for VoicePraesenz {
    fn default() -> Self {
        Self::neu()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn raum(id: &str) -> RoomId {
        RoomId::new(id)
    }

    #[test]
    fn beitreten_ist_idempotent() {
        let voice = VoicePraesenz::neu();
        let a = ConnectionId::new();

        assert!(voice.beitreten(a, &raum("funk")));
        assert!(!voice.beitreten(a, &raum("funk")));
        assert_eq!(voice.teilnehmer(&raum("funk")), vec![a]);
    }

    #[test]
    fn verlassen_ohne_teilnahme_ist_noop() {
        let voice = VoicePraesenz::neu();
        assert!(!voice.verlassen(&ConnectionId::new(), &raum("funk")));
        assert_eq!(voice.raum_anzahl(), 0);
    }

    #[test]
    fn letzter_teilnehmer_loescht_den_raum() {
        let voice = VoicePraesenz::neu();
        let a = ConnectionId::new();
        let b = ConnectionId::new();

        voice.beitreten(a, &raum("funk"));
        voice.beitreten(b, &raum("funk"));

        assert!(voice.verlassen(&a, &raum("funk")));
        assert_eq!(voice.raum_anzahl(), 1);

        assert!(voice.verlassen(&b, &raum("funk")));
        assert_eq!(voice.raum_anzahl(), 0);
    }

    #[test]
    fn raeume_von_findet_jede_teilnahme() {
        let voice = VoicePraesenz::neu();
        let a = ConnectionId::new();

        voice.beitreten(a, &raum("eins"));
        voice.beitreten(a, &raum("zwei"));
        voice.beitreten(ConnectionId::new(), &raum("drei"));

        let mut raeume = voice.raeume_von(&a);
        raeume.sort_by(|x, y| x.as_str().cmp(y.as_str()));
        assert_eq!(raeume, vec![raum("eins"), raum("zwei")]);
    }

    #[test]
    fn ist_teilnehmer() {
        let voice = VoicePraesenz::neu();
        let a = ConnectionId::new();

        voice.beitreten(a, &raum("funk"));
        assert!(voice.ist_teilnehmer(&a, &raum("funk")));
        assert!(!voice.ist_teilnehmer(&a, &raum("anders")));
        assert!(!voice.ist_teilnehmer(&ConnectionId::new(), &raum("funk")));
    }
}
