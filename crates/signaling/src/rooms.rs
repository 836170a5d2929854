//! Raum-Mitgliedschaft – Wer ist in welchem Chat-Raum
//!
//! Raeume entstehen implizit beim ersten Beitritt und verschwinden,
//! sobald das letzte Mitglied geht. Eine Raum-ID ohne Eintrag ist kein
//! Fehler, sondern ein leerer Geltungsbereich.

use dashmap::DashMap;
use funkraum_core::types::{ConnectionId, RoomId};
use std::collections::HashSet;
use std::sync::Arc;

/// Verwaltet die Chat-Raum-Mitgliedschaft aller Verbindungen
///
/// Thread-safe durch `Arc` + `DashMap`. Clone teilt den inneren Zustand.
#[derive(Clone)]
pub struct RaumMitgliedschaft {
    inner: Arc<RaumMitgliedschaftInner>,
}

struct RaumMitgliedschaftInner {
    /// Raum -> Mitglieder
    mitglieder: DashMap<RoomId, HashSet<ConnectionId>>,
}

impl RaumMitgliedschaft {
    /// Erstellt eine neue, leere Mitgliedschaftsverwaltung
    pub fn neu() -> Self {
        Self {
            inner: Arc::new(RaumMitgliedschaftInner {
                mitglieder: DashMap::new(),
            }),
        }
    }

    /// Fuegt eine Verbindung einem Raum hinzu
    ///
    /// Gibt `false` zurueck, wenn die Verbindung bereits Mitglied war.
    pub fn beitreten(&self, verbindungs_id: ConnectionId, raum: &RoomId) -> bool {
        let neu = self
            .inner
            .mitglieder
            .entry(raum.clone())
            .or_default()
            .insert(verbindungs_id);
        if neu {
            tracing::debug!(connection_id = %verbindungs_id, raum = %raum, "Raum beigetreten");
        }
        neu
    }

    /// Entfernt eine Verbindung aus einem Raum
    ///
    /// Verlassen ohne Mitgliedschaft ist ein No-op. Ein Raum ohne
    /// Mitglieder wird geloescht; die Pruefung laeuft unter dem
    /// Entry-Lock, ein zeitgleicher Beitritt geht nicht verloren.
    pub fn verlassen(&self, verbindungs_id: &ConnectionId, raum: &RoomId) -> bool {
        let entfernt = match self.inner.mitglieder.get_mut(raum) {
            Some(mut menge) => menge.remove(verbindungs_id),
            None => false,
        };

        if entfernt {
            self.inner
                .mitglieder
                .remove_if(raum, |_, menge| menge.is_empty());
            tracing::debug!(connection_id = %verbindungs_id, raum = %raum, "Raum verlassen");
        }
        entfernt
    }

    /// Gibt alle Mitglieder eines Raums zurueck
    pub fn mitglieder(&self, raum: &RoomId) -> Vec<ConnectionId> {
        self.inner
            .mitglieder
            .get(raum)
            .map(|menge| menge.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Prueft, ob eine Verbindung Mitglied eines Raums ist
    pub fn ist_mitglied(&self, verbindungs_id: &ConnectionId, raum: &RoomId) -> bool {
        self.inner
            .mitglieder
            .get(raum)
            .map(|menge| menge.contains(verbindungs_id))
            .unwrap_or(false)
    }

    /// Entfernt eine Verbindung aus allen Raeumen
    ///
    /// Gibt die betroffenen Raeume zurueck. Keine Mitgliedschaft
    /// ueberlebt die Verbindung.
    pub fn verbindung_entfernen(&self, verbindungs_id: &ConnectionId) -> Vec<RoomId> {
        let betroffen: Vec<RoomId> = self
            .inner
            .mitglieder
            .iter()
            .filter(|eintrag| eintrag.value().contains(verbindungs_id))
            .map(|eintrag| eintrag.key().clone())
            .collect();

        for raum in &betroffen {
            self.verlassen(verbindungs_id, raum);
        }
        betroffen
    }

    /// Gibt die Anzahl der Raeume mit mindestens einem Mitglied zurueck
    pub fn raum_anzahl(&self) -> usize {
        self.inner.mitglieder.len()
    }
}

impl Default for RaumMitgliedschaft {
    fn default() -> Self {
        Self::neu()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
