//! Sprech-Arbiter – Serverseitige Sprechvergabe pro Voice-Raum
//!
//! Pro Voice-Raum sendet hoechstens eine Verbindung gleichzeitig. Die
//! Entscheidung faellt atomar unter dem Entry-Lock des Raums: von zwei
//! zeitgleichen Starts gewinnt genau einer, der andere bekommt
//! `Besetzt`.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use funkraum_core::types::{ConnectionId, RoomId};
use std::sync::Arc;

/// Ausgang einer Sprechanfrage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sprechentscheidung {
    /// Sprechrecht vergeben, echter Uebergang
    Angenommen,
    /// Anfrage kam vom aktuellen Sprecher, kein Uebergang
    BereitsSprecher,
    /// Eine andere Verbindung spricht bereits
    Besetzt,
}

/// Vergibt das Sprechrecht pro Voice-Raum
///
/// Thread-safe durch `Arc` + `DashMap`. Clone teilt den inneren Zustand.
#[derive(Clone)]
pub struct SprechArbiter {
    inner: Arc<SprechArbiterInner>,
}

struct SprechArbiterInner {
    /// Voice-Raum -> aktueller Sprecher
    sprecher: DashMap<RoomId, ConnectionId>,
}

impl SprechArbiter {
    /// Erstellt einen neuen Arbiter ohne vergebene Sprechrechte
    pub fn neu() -> Self {
        Self {
            inner: Arc::new(SprechArbiterInner {
                sprecher: DashMap::new(),
            }),
        }
    }

    /// Beansprucht das Sprechrecht in einem Raum
    pub fn start(&self, verbindungs_id: ConnectionId, raum: &RoomId) -> Sprechentscheidung {
        match self.inner.sprecher.entry(raum.clone()) {
            Entry::Occupied(belegt) => {
                if *belegt.get() == verbindungs_id {
                    Sprechentscheidung::BereitsSprecher
                } else {
                    Sprechentscheidung::Besetzt
                }
            }
            Entry::Vacant(frei) => {
                frei.insert(verbindungs_id);
                tracing::debug!(
                    connection_id = %verbindungs_id,
                    raum = %raum,
                    "Sprechrecht vergeben"
                );
                Sprechentscheidung::Angenommen
            }
        }
    }

    /// Gibt das Sprechrecht zurueck
    ///
    /// Wirkt nur, wenn die Verbindung tatsaechlich Sprecher ist; `true`
    /// bedeutet einen echten Uebergang. Stop ohne Sprechrecht ist ein
    /// No-op.
    pub fn stop(&self, verbindungs_id: &ConnectionId, raum: &RoomId) -> bool {
        let entfernt = self
            .inner
            .sprecher
            .remove_if(raum, |_, sprecher| sprecher == verbindungs_id)
            .is_some();
        if entfernt {
            tracing::debug!(
                connection_id = %verbindungs_id,
                raum = %raum,
                "Sprechrecht zurueckgegeben"
            );
        }
        entfernt
    }

    /// Gibt den aktuellen Sprecher eines Raums zurueck
    pub fn sprecher(&self, raum: &RoomId) -> Option<ConnectionId> {
        self.inner.sprecher.get(raum).map(|eintrag| *eintrag.value())
    }
}

impl Default for SprechArbiter {
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
    fn erster_start_gewinnt() {
        let arbiter = SprechArbiter::neu();
        let a = ConnectionId::new();

        assert_eq!(arbiter.start(a, &raum("funk")), Sprechentscheidung::Angenommen);
        assert_eq!(arbiter.sprecher(&raum("funk")), Some(a));
    }

    #[test]
    fn zweiter_start_ist_besetzt() {
        let arbiter = SprechArbiter::neu();
        let a = ConnectionId::new();
        let b = ConnectionId::new();

        arbiter.start(a, &raum("funk"));
        assert_eq!(arbiter.start(b, &raum("funk")), Sprechentscheidung::Besetzt);

        // Der Sprecher bleibt unangetastet
        assert_eq!(arbiter.sprecher(&raum("funk")), Some(a));
    }

    #[test]
    fn wiederholter_start_ist_kein_uebergang() {
        let arbiter = SprechArbiter::neu();
        let a = ConnectionId::new();

        arbiter.start(a, &raum("funk"));
        assert_eq!(
            arbiter.start(a, &raum("funk")),
            Sprechentscheidung::BereitsSprecher
        );
    }

    #[test]
    fn stop_nur_durch_den_sprecher() {
        let arbiter = SprechArbiter::neu();
        let a = ConnectionId::new();
        let b = ConnectionId::new();

        arbiter.start(a, &raum("funk"));
        assert!(!arbiter.stop(&b, &raum("funk")));
        assert_eq!(arbiter.sprecher(&raum("funk")), Some(a));

        assert!(arbiter.stop(&a, &raum("funk")));
        assert_eq!(arbiter.sprecher(&raum("funk")), None);
        assert!(!arbiter.stop(&a, &raum("funk")));
    }

    #[test]
    fn nach_stop_kann_der_naechste_uebernehmen() {
        let arbiter = SprechArbiter::neu();
        let a = ConnectionId::new();
        let b = ConnectionId::new();

        arbiter.start(a, &raum("funk"));
        arbiter.stop(&a, &raum("funk"));
        assert_eq!(arbiter.start(b, &raum("funk")), Sprechentscheidung::Angenommen);
    }

    #[test]
    fn raeume_sind_unabhaengig() {
        let arbiter = SprechArbiter::neu();
        let a = ConnectionId::new();
        let b = ConnectionId::new();

        assert_eq!(arbiter.start(a, &raum("eins")), Sprechentscheidung::Angenommen);
        assert_eq!(arbiter.start(b, &raum("zwei")), Sprechentscheidung::Angenommen);
    }
}
