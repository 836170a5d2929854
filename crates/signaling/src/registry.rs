//! Verbindungs-Register – Identitaeten aller registrierten Verbindungen
//!
//! Eine Verbindung erhaelt ihre Identitaet bei `register` und behaelt
//! sie bis zum Trennen. Der Name wird serverseitig geprueft; eine
//! bestehende Identitaet wird nie stillschweigend ueberschrieben.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use funkraum_core::error::FunkraumError;
use funkraum_core::types::{ConnectionId, Identitaet};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Namensregeln
// ---------------------------------------------------------------------------

/// Minimale Namenslaenge in Zeichen
pub const NAME_MIN_LAENGE: usize = 4;

/// Maximale Namenslaenge in Zeichen
pub const NAME_MAX_LAENGE: usize = 16;

/// Prueft einen rohen Namen gegen Laengen- und Zeichensatzregeln
///
/// Erlaubt sind ASCII-Buchstaben, Ziffern, Leerzeichen, Binde- und
/// Unterstrich. Die Laenge zaehlt Zeichen, nicht Bytes.
fn name_pruefen(roh: &str) -> Result<(), FunkraumError> {
    let laenge = roh.chars().count();
    if !(NAME_MIN_LAENGE..=NAME_MAX_LAENGE).contains(&laenge) {
        return Err(FunkraumError::UngueltigerName(format!(
            "Laenge {} liegt nicht in {}..={}",
            laenge, NAME_MIN_LAENGE, NAME_MAX_LAENGE
        )));
    }

    if !roh
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == ' ' || c == '_' || c == '-')
    {
        return Err(FunkraumError::UngueltigerName(
            "erlaubt sind nur Buchstaben, Ziffern, Leerzeichen, '-' und '_'".to_string(),
        ));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// VerbindungsRegister
// ---------------------------------------------------------------------------

/// Verwaltet die Identitaeten aller registrierten Verbindungen
///
/// Thread-safe durch `Arc` + `DashMap`. Clone teilt den inneren Zustand.
#[derive(Clone)]
pub struct VerbindungsRegister {
    inner: Arc<VerbindungsRegisterInner>,
}

struct VerbindungsRegisterInner {
    /// Identitaeten, indiziert nach Verbindungs-ID
    identitaeten: DashMap<ConnectionId, Identitaet>,
}

impl VerbindungsRegister {
    /// Erstellt ein neues, leeres Register
    pub fn neu() -> Self {
        Self {
            inner: Arc::new(VerbindungsRegisterInner {
                identitaeten: DashMap::new(),
            }),
        }
    }

    /// Registriert eine Verbindung unter einem geprueften Namen
    ///
    /// Schlaegt fehl, wenn der Name ungueltig ist oder die Verbindung
    /// bereits eine Identitaet traegt. Die Entscheidung faellt unter
    /// dem Entry-Lock, ein paralleles zweites `register` derselben
    /// Verbindung kann die Identitaet nicht ueberschreiben.
    pub fn registrieren(
        &self,
        verbindungs_id: ConnectionId,
        roh_name: &str,
    ) -> Result<Identitaet, FunkraumError> {
        name_pruefen(roh_name)?;

        match self.inner.identitaeten.entry(verbindungs_id) {
            Entry::Occupied(bestehend) => Err(FunkraumError::BereitsRegistriert(
                bestehend.get().name.clone(),
            )),
            Entry::Vacant(frei) => {
                let identitaet = Identitaet::new(verbindungs_id, roh_name);
                frei.insert(identitaet.clone());
                tracing::info!(
                    connection_id = %verbindungs_id,
                    name = %identitaet.name,
                    "Verbindung registriert"
                );
                Ok(identitaet)
            }
        }
    }

    /// Gibt die Identitaet einer Verbindung zurueck
    pub fn identitaet(&self, verbindungs_id: &ConnectionId) -> Option<Identitaet> {
        self.inner
            .identitaeten
            .get(verbindungs_id)
            .map(|eintrag| eintrag.clone())
    }

    /// Prueft, ob eine Verbindung registriert ist
    pub fn ist_registriert(&self, verbindungs_id: &ConnectionId) -> bool {
        self.inner.identitaeten.contains_key(verbindungs_id)
    }

    /// Entfernt die Identitaet einer Verbindung
    pub fn entfernen(&self, verbindungs_id: &ConnectionId) -> Option<Identitaet> {
        let entfernt = self
            .inner
            .identitaeten
            .remove(verbindungs_id)
            .map(|(_, identitaet)| identitaet);
        if let Some(identitaet) = &entfernt {
            tracing::info!(
                connection_id = %verbindungs_id,
                name = %identitaet.name,
                "Identitaet entfernt"
            );
        }
        entfernt
    }

    /// Gibt alle registrierten Identitaeten zurueck
    pub fn alle_identitaeten(&self) -> Vec<Identitaet> {
        self.inner
            .identitaeten
            .iter()
            .map(|eintrag| eintrag.value().clone())
            .collect()
    }

    /// Gibt die Anzahl registrierter Verbindungen zurueck
    pub fn anzahl(&self) -> usize {
        self.inner.identitaeten.len()
    }
}

impl Default for VerbindungsRegister {
    fn default() -> Self {
        Self::neu()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
