//! Event-Broadcaster – Stellt Ereignisse an verbundene Clients zu
//!
//! Der EventBroadcaster verwaltet die Send-Queues aller Verbindungen und
//! stellt Methoden bereit, um Ereignisse gezielt, an Gruppen oder an alle
//! zu senden. Die Queue einer Verbindung entsteht beim Annehmen, nicht
//! erst bei der Registrierung – ein `user_list` erreicht damit auch noch
//! unregistrierte Verbindungen.
//!
//! Welche Verbindungen ein Ereignis bekommen, entscheiden die Handler
//! anhand der Mitgliedschafts-Manager; der Broadcaster kennt nur
//! Verbindungs-IDs und Queues.

use dashmap::DashMap;
use funkraum_core::types::ConnectionId;
use funkraum_protocol::events::ServerEvent;
use std::sync::Arc;
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// Konfiguration
// ---------------------------------------------------------------------------

/// Groesse der Send-Queue pro Verbindung
const SEND_QUEUE_GROESSE: usize = 64;

// ---------------------------------------------------------------------------
// ClientSender
// ---------------------------------------------------------------------------

/// Handle auf die Send-Queue einer Verbindung
#[derive(Clone, Debug)]
pub struct ClientSender {
    pub verbindungs_id: ConnectionId,
    pub tx: mpsc::Sender<ServerEvent>,
}

impl ClientSender {
    /// Reiht ein Ereignis nicht-blockierend ein
    ///
    /// Gibt `false` zurueck wenn die Queue voll oder geschlossen ist.
    /// Ein langsamer Empfaenger verliert Ereignisse, blockiert aber nie
    /// die Verarbeitung.
    pub fn senden(&self, ereignis: ServerEvent) -> bool {
        match self.tx.try_send(ereignis) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(
                    connection_id = %self.verbindungs_id,
                    "Send-Queue voll – Ereignis verworfen"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(
                    connection_id = %self.verbindungs_id,
                    "Send-Queue geschlossen (Verbindung getrennt)"
                );
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// EventBroadcaster
// ---------------------------------------------------------------------------

/// Zentraler Event-Broadcaster fuer alle Verbindungen
///
/// Thread-safe via Arc + DashMap. Clone teilt den inneren Zustand.
#[derive(Clone)]
pub struct EventBroadcaster {
    inner: Arc<EventBroadcasterInner>,
}

struct EventBroadcasterInner {
    /// Send-Queues, indiziert nach Verbindungs-ID
    verbindungen: DashMap<ConnectionId, ClientSender>,
}

impl EventBroadcaster {
    /// Erstellt einen neuen EventBroadcaster
    pub fn neu() -> Self {
        Self {
            inner: Arc::new(EventBroadcasterInner {
                verbindungen: DashMap::new(),
            }),
        }
    }

    /// Registriert eine Verbindung und gibt ihre Empfangs-Queue zurueck
    ///
    /// Die `ClientVerbindung` liest aus dieser Queue und sendet via TCP.
    pub fn verbindung_registrieren(
        &self,
        verbindungs_id: ConnectionId,
    ) -> mpsc::Receiver<ServerEvent> {
        let (tx, rx) = mpsc::channel(SEND_QUEUE_GROESSE);
        let sender = ClientSender { verbindungs_id, tx };
        self.inner.verbindungen.insert(verbindungs_id, sender);
        tracing::debug!(connection_id = %verbindungs_id, "Send-Queue angelegt");
        rx
    }

    /// Entfernt die Send-Queue einer Verbindung
    pub fn verbindung_entfernen(&self, verbindungs_id: &ConnectionId) {
        if self.inner.verbindungen.remove(verbindungs_id).is_some() {
            tracing::debug!(connection_id = %verbindungs_id, "Send-Queue entfernt");
        }
    }

    /// Sendet ein Ereignis an eine einzelne Verbindung
    ///
    /// Gibt `true` zurueck wenn die Verbindung gefunden und das Ereignis
    /// eingereiht wurde.
    pub fn an_verbindung_senden(
        &self,
        verbindungs_id: &ConnectionId,
        ereignis: ServerEvent,
    ) -> bool {
        match self.inner.verbindungen.get(verbindungs_id) {
            Some(sender) => sender.senden(ereignis),
            None => {
                tracing::debug!(
                    connection_id = %verbindungs_id,
                    "Senden an unbekannte Verbindung"
                );
                false
            }
        }
    }

    /// Sendet ein Ereignis an eine Menge von Verbindungen
    ///
    /// Gibt die Anzahl der erfolgreichen Zustellungen zurueck.
    pub fn an_mehrere_senden(&self, empfaenger: &[ConnectionId], ereignis: ServerEvent) -> usize {
        let mut gesendet = 0;
        for verbindungs_id in empfaenger {
            if let Some(sender) = self.inner.verbindungen.get(verbindungs_id) {
                if sender.senden(ereignis.clone()) {
                    gesendet += 1;
                }
            }
        }
        gesendet
    }

    /// Sendet ein Ereignis an eine Menge von Verbindungen ausser einer
    ///
    /// Nuetzlich um Join-Events zu verteilen ohne den Ausloeser zu
    /// informieren.
    pub fn an_mehrere_ausser_senden(
        &self,
        empfaenger: &[ConnectionId],
        ausgeschlossen: &ConnectionId,
        ereignis: ServerEvent,
    ) -> usize {
        let mut gesendet = 0;
        for verbindungs_id in empfaenger {
            if verbindungs_id == ausgeschlossen {
                continue;
            }
            if let Some(sender) = self.inner.verbindungen.get(verbindungs_id) {
                if sender.senden(ereignis.clone()) {
                    gesendet += 1;
                }
            }
        }
        gesendet
    }

    /// Sendet ein Ereignis an alle Verbindungen
    ///
    /// Gibt die Anzahl der erfolgreichen Zustellungen zurueck.
    pub fn an_alle_senden(&self, ereignis: ServerEvent) -> usize {
        let mut gesendet = 0;
        self.inner.verbindungen.iter().for_each(|entry| {
            if entry.value().senden(ereignis.clone()) {
                gesendet += 1;
            }
        });
        gesendet
    }

    /// Gibt die Anzahl der registrierten Send-Queues zurueck
    pub fn verbindungs_anzahl(&self) -> usize {
        self.inner.verbindungen.len()
    }

    /// Prueft ob eine Verbindung eine Send-Queue hat
    pub fn ist_registriert(&self, verbindungs_id: &ConnectionId) -> bool {
        self.inner.verbindungen.contains_key(verbindungs_id)
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::neu()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
