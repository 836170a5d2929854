//! Voice-Handler – Voice-Raum-Praesenz und Teilnehmerlisten
//!
//! Beitritt und Austritt verteilen personalisierte Teilnehmerlisten:
//! jede Liste ist aus Sicht ihres Empfaengers berechnet und enthaelt
//! ihn selbst nie. Der gemeinsame Austritts-Ablauf bedient sowohl
//! `leave_voice` als auch die Bereinigung beim Trennen.

use funkraum_core::types::{ConnectionId, Identitaet, RoomId};
use funkraum_protocol::events::{ServerEvent, Teilnehmer};

use crate::server_state::SignalingZustand;

/// Verarbeitet eine `join_voice`-Anfrage
///
/// Reihenfolge: erst erfahren die bestehenden Teilnehmer vom Neuzugang
/// (loest dort den Peer-Aufbau aus), dann bekommt jeder Teilnehmer
/// seine neue Liste. Ein doppelter Beitritt ist ein No-op.
pub fn handle_join_voice(zustand: &SignalingZustand, identitaet: &Identitaet, raum: RoomId) {
    if !zustand.voice.beitreten(identitaet.connection_id, &raum) {
        tracing::debug!(
            connection_id = %identitaet.connection_id,
            raum = %raum,
            "Doppelter Voice-Beitritt ignoriert"
        );
        return;
    }

    let teilnehmer = zustand.voice.teilnehmer(&raum);

    zustand.broadcaster.an_mehrere_ausser_senden(
        &teilnehmer,
        &identitaet.connection_id,
        ServerEvent::VoiceUserJoined {
            room_id: raum.clone(),
            connection_id: identitaet.connection_id,
            name: identitaet.name.clone(),
        },
    );

    teilnehmerlisten_verteilen(zustand, &raum, &teilnehmer);

    tracing::info!(
        connection_id = %identitaet.connection_id,
        raum = %raum,
        teilnehmer = teilnehmer.len(),
        "Voice-Raum beigetreten"
    );
}

/// Verarbeitet eine `leave_voice`-Anfrage
///
/// Austritt aus einem Raum ohne Teilnahme ist ein vollstaendiger No-op:
/// keine Zustandsaenderung, kein Ereignis.
pub fn handle_leave_voice(zustand: &SignalingZustand, identitaet: &Identitaet, raum: &RoomId) {
    if !zustand.voice.ist_teilnehmer(&identitaet.connection_id, raum) {
        return;
    }
    voice_raum_verlassen(zustand, identitaet, raum);
}

/// Gemeinsamer Austritts-Ablauf fuer `leave_voice` und die Bereinigung
/// beim Trennen
///
/// Reihenfolge pro Raum: Sprechrecht zurueckgeben (mit Broadcast bei
/// echtem Uebergang), dann entfernen, dann den verbleibenden
/// Teilnehmern neue Listen und `voice_user_left` zustellen.
pub fn voice_raum_verlassen(zustand: &SignalingZustand, identitaet: &Identitaet, raum: &RoomId) {
    // Implizites Stop-Talking vor dem Austritt; der Broadcast geht an
    // den Teilnehmerstand VOR dem Entfernen
    if zustand.arbiter.stop(&identitaet.connection_id, raum) {
        let teilnehmer = zustand.voice.teilnehmer(raum);
        zustand.broadcaster.an_mehrere_senden(
            &teilnehmer,
            ServerEvent::VoiceTalkingUpdate {
                room_id: raum.clone(),
                connection_id: identitaet.connection_id,
                talking: false,
            },
        );
    }

    if !zustand.voice.verlassen(&identitaet.connection_id, raum) {
        return;
    }

    let verbleibende = zustand.voice.teilnehmer(raum);
    teilnehmerlisten_verteilen(zustand, raum, &verbleibende);
    zustand.broadcaster.an_mehrere_senden(
        &verbleibende,
        ServerEvent::VoiceUserLeft {
            room_id: raum.clone(),
            connection_id: identitaet.connection_id,
            name: identitaet.name.clone(),
        },
    );

    tracing::info!(
        connection_id = %identitaet.connection_id,
        raum = %raum,
        verbleibend = verbleibende.len(),
        "Voice-Raum verlassen"
    );
}

/// Sendet jedem Teilnehmer seine personalisierte Teilnehmerliste
///
/// Jede Liste enthaelt alle ANDEREN Teilnehmer; der Empfaenger selbst
/// taucht nie auf. Der `talking`-Status kommt aus der Sprechvergabe.
pub fn teilnehmerlisten_verteilen(
    zustand: &SignalingZustand,
    raum: &RoomId,
    teilnehmer: &[ConnectionId],
) {
    let sprecher = zustand.arbiter.sprecher(raum);
    let eintraege: Vec<Teilnehmer> = teilnehmer
        .iter()
        .filter_map(|id| {
            zustand.register.identitaet(id).map(|identitaet| Teilnehmer {
                connection_id: *id,
                name: identitaet.name,
                talking: sprecher == Some(*id),
            })
        })
        .collect();

    for empfaenger in teilnehmer {
        let persoenlich: Vec<Teilnehmer> = eintraege
            .iter()
            .filter(|eintrag| eintrag.connection_id != *empfaenger)
            .cloned()
            .collect();
        zustand.broadcaster.an_verbindung_senden(
            empfaenger,
            ServerEvent::VoiceParticipants {
                room_id: raum.clone(),
                participants: persoenlich,
            },
        );
    }
}
