//! Talk-Handler – Push-to-Talk-Vergabe
//!
//! Der Server entscheidet, wer spricht; Clients melden nur ihre
//! Absicht. Ein Talk-Ereignis ohne Voice-Mitgliedschaft wird verworfen,
//! ein Start in einem besetzten Raum mit `BUSY` beantwortet.

use funkraum_core::error::FunkraumError;
use funkraum_core::types::{Identitaet, RoomId};
use funkraum_protocol::events::ServerEvent;

use crate::server_state::SignalingZustand;
use crate::talk::Sprechentscheidung;

/// Verarbeitet ein `voice_talking`-Ereignis
///
/// Nur echte Uebergaenge erzeugen einen Broadcast; der Sprecher selbst
/// ist unter den Empfaengern. Wiederholte Starts des Sprechers und
/// Stops ohne Sprechrecht sind No-ops.
pub fn handle_voice_talking(
    zustand: &SignalingZustand,
    identitaet: &Identitaet,
    raum: &RoomId,
    talking: bool,
) -> Result<(), FunkraumError> {
    if !zustand.voice.ist_teilnehmer(&identitaet.connection_id, raum) {
        tracing::warn!(
            connection_id = %identitaet.connection_id,
            raum = %raum,
            "Talk-Ereignis ohne Voice-Mitgliedschaft verworfen"
        );
        return Ok(());
    }

    if talking {
        match zustand.arbiter.start(identitaet.connection_id, raum) {
            Sprechentscheidung::Angenommen => {
                talking_update_verteilen(zustand, raum, identitaet, true);
            }
            Sprechentscheidung::BereitsSprecher => {
                tracing::debug!(
                    connection_id = %identitaet.connection_id,
                    raum = %raum,
                    "Wiederholter Talk-Start ohne Uebergang"
                );
            }
            Sprechentscheidung::Besetzt => {
                return Err(FunkraumError::Besetzt(raum.as_str().to_string()));
            }
        }
    } else if zustand.arbiter.stop(&identitaet.connection_id, raum) {
        talking_update_verteilen(zustand, raum, identitaet, false);
    }

    Ok(())
}

/// Sendet den Sprechzustand an alle Teilnehmer des Voice-Raums
fn talking_update_verteilen(
    zustand: &SignalingZustand,
    raum: &RoomId,
    identitaet: &Identitaet,
    talking: bool,
) {
    let teilnehmer = zustand.voice.teilnehmer(raum);
    zustand.broadcaster.an_mehrere_senden(
        &teilnehmer,
        ServerEvent::VoiceTalkingUpdate {
            room_id: raum.clone(),
            connection_id: identitaet.connection_id,
            talking,
        },
    );
}
