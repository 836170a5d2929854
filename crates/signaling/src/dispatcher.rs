//! Ereignis-Dispatcher – Routet ClientEvents an die richtigen Handler
//!
//! Der Dispatcher empfaengt dekodierte Ereignisse einer ClientVerbindung,
//! prueft die Registrierungs-Voraussetzung und ruft den passenden Handler
//! auf. Alle Antworten und Broadcasts laufen ueber die Send-Queues des
//! Broadcasters; fachliche Fehler gehen als `error`-Ereignis nur an den
//! Absender und lassen den geteilten Zustand unveraendert.
//!
//! ## Registrierungs-Gate
//! Alles ausser `register`, `ping` und `pong` erfordert eine registrierte
//! Identitaet. Die Identitaet wird genau einmal pro Ereignis aufgeloest
//! und an den Handler durchgereicht.

use funkraum_core::error::FunkraumError;
use funkraum_core::types::{ConnectionId, Identitaet};
use funkraum_protocol::events::{ClientEvent, ServerEvent};
use std::sync::Arc;

use crate::handlers::{
    register_handler, relay_handler, room_handler, talk_handler, voice_handler,
};
use crate::server_state::SignalingZustand;

/// Zentraler Ereignis-Dispatcher
///
/// Die Verarbeitung eines Ereignisses hat keinen await-Punkt: sie laeuft
/// vollstaendig durch, bevor der Verbindungs-Task das naechste Ereignis
/// liest. Zusammen mit dem Single-Thread-Scheduling der Verbindungs-Tasks
/// verschraenken sich Ereignisse dadurch nie.
pub struct EventDispatcher {
    zustand: Arc<SignalingZustand>,
}

impl EventDispatcher {
    /// Erstellt einen neuen Dispatcher
    pub fn neu(zustand: Arc<SignalingZustand>) -> Self {
        Self { zustand }
    }

    /// Verarbeitet ein eingehendes Ereignis einer Verbindung
    pub fn dispatch(&self, verbindungs_id: ConnectionId, ereignis: ClientEvent) {
        match ereignis {
            // -------------------------------------------------------------------
            // Ohne Registrierung erlaubt
            // -------------------------------------------------------------------
            ClientEvent::Register { name } => {
                let ergebnis =
                    register_handler::handle_register(&self.zustand, verbindungs_id, &name);
                self.fehler_melden(&verbindungs_id, ergebnis);
            }

            ClientEvent::Ping { timestamp_ms } => {
                let server_ts = std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_millis() as u64;
                self.zustand.broadcaster.an_verbindung_senden(
                    &verbindungs_id,
                    ServerEvent::pong(timestamp_ms, server_ts),
                );
            }

            ClientEvent::Pong { .. } => {
                // Antwort auf den Keepalive-Ping, nur fuer die RTT-Messung
                tracing::trace!(connection_id = %verbindungs_id, "Pong empfangen");
            }

            // -------------------------------------------------------------------
            // Registrierung erfordernde Ereignisse
            // -------------------------------------------------------------------
            ereignis => {
                let identitaet = match self.zustand.register.identitaet(&verbindungs_id) {
                    Some(identitaet) => identitaet,
                    None => {
                        tracing::debug!(
                            connection_id = %verbindungs_id,
                            "Ereignis ohne Registrierung abgelehnt"
                        );
                        self.zustand.broadcaster.an_verbindung_senden(
                            &verbindungs_id,
                            ServerEvent::fehler_von(&FunkraumError::NichtRegistriert),
                        );
                        return;
                    }
                };

                self.dispatch_registriert(identitaet, ereignis);
            }
        }
    }

    /// Routet Ereignisse die eine Registrierung erfordern
    fn dispatch_registriert(&self, identitaet: Identitaet, ereignis: ClientEvent) {
        let verbindungs_id = identitaet.connection_id;

        match ereignis {
            // -------------------------------------------------------------------
            // Chat-Raeume
            // -------------------------------------------------------------------
            ClientEvent::JoinRoom { room_id } => {
                room_handler::handle_join_room(&self.zustand, verbindungs_id, room_id);
            }

            ClientEvent::LeaveRoom { room_id } => {
                room_handler::handle_leave_room(&self.zustand, &verbindungs_id, &room_id);
            }

            // -------------------------------------------------------------------
            // Voice-Praesenz
            // -------------------------------------------------------------------
            ClientEvent::JoinVoice { room_id } => {
                voice_handler::handle_join_voice(&self.zustand, &identitaet, room_id);
            }

            ClientEvent::LeaveVoice { room_id } => {
                voice_handler::handle_leave_voice(&self.zustand, &identitaet, &room_id);
            }

            // -------------------------------------------------------------------
            // Push-to-Talk
            // -------------------------------------------------------------------
            ClientEvent::VoiceTalking { room_id, talking } => {
                let ergebnis = talk_handler::handle_voice_talking(
                    &self.zustand,
                    &identitaet,
                    &room_id,
                    talking,
                );
                self.fehler_melden(&verbindungs_id, ergebnis);
            }

            // -------------------------------------------------------------------
            // WebRTC-Verhandlung (Relay)
            // -------------------------------------------------------------------
            ClientEvent::VoiceOffer { to, payload } => {
                relay_handler::handle_weiterleitung(
                    &self.zustand,
                    &to,
                    ServerEvent::VoiceOffer {
                        from: verbindungs_id,
                        payload,
                    },
                );
            }

            ClientEvent::VoiceAnswer { to, payload } => {
                relay_handler::handle_weiterleitung(
                    &self.zustand,
                    &to,
                    ServerEvent::VoiceAnswer {
                        from: verbindungs_id,
                        payload,
                    },
                );
            }

            ClientEvent::VoiceIceCandidate { to, payload } => {
                relay_handler::handle_weiterleitung(
                    &self.zustand,
                    &to,
                    ServerEvent::VoiceIceCandidate {
                        from: verbindungs_id,
                        payload,
                    },
                );
            }

            // Oben bereits behandelt
            ClientEvent::Register { .. } | ClientEvent::Ping { .. } | ClientEvent::Pong { .. } => {}
        }
    }

    /// Bereinigt alle Ressourcen einer Verbindung beim Trennen
    ///
    /// Reihenfolge: Voice-Raeume (inklusive Sprechrecht) -> Chat-Raeume ->
    /// Identitaet -> Nutzerliste an alle -> Send-Queue. Die Identitaet
    /// faellt erst nach den Voice-Austritten, damit `voice_user_left`
    /// den Namen noch traegt.
    pub fn verbindung_bereinigen(&self, verbindungs_id: &ConnectionId) {
        if let Some(identitaet) = self.zustand.register.identitaet(verbindungs_id) {
            for raum in self.zustand.voice.raeume_von(verbindungs_id) {
                voice_handler::voice_raum_verlassen(&self.zustand, &identitaet, &raum);
            }
        }

        let raeume = self.zustand.raeume.verbindung_entfernen(verbindungs_id);
        if !raeume.is_empty() {
            tracing::debug!(
                connection_id = %verbindungs_id,
                raeume = raeume.len(),
                "Raum-Mitgliedschaften entfernt"
            );
        }

        if self.zustand.register.entfernen(verbindungs_id).is_some() {
            register_handler::nutzerliste_verteilen(&self.zustand);
        }

        self.zustand.broadcaster.verbindung_entfernen(verbindungs_id);
        tracing::debug!(connection_id = %verbindungs_id, "Verbindungs-Ressourcen bereinigt");
    }

    /// Meldet einen Handler-Fehler als `error`-Ereignis an den Absender
    fn fehler_melden(
        &self,
        verbindungs_id: &ConnectionId,
        ergebnis: Result<(), FunkraumError>,
    ) {
        if let Err(fehler) = ergebnis {
            tracing::debug!(
                connection_id = %verbindungs_id,
                fehler = %fehler,
                "Ereignis abgelehnt"
            );
            self.zustand
                .broadcaster
                .an_verbindung_senden(verbindungs_id, ServerEvent::fehler_von(&fehler));
        }
    }
}
