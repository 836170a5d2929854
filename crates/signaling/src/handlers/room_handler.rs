//! Raum-Handler – Chat-Raum-Mitgliedschaft

use funkraum_core::types::{ConnectionId, RoomId};
use funkraum_protocol::events::ServerEvent;

use crate::server_state::SignalingZustand;

/// Verarbeitet eine `join_room`-Anfrage
///
/// Beitritt ist idempotent; die Bestaetigung geht in jedem Fall an den
/// Absender.
pub fn handle_join_room(
    zustand: &SignalingZustand,
    verbindungs_id: ConnectionId,
    raum: RoomId,
) {
    zustand.raeume.beitreten(verbindungs_id, &raum);
    zustand
        .broadcaster
        .an_verbindung_senden(&verbindungs_id, ServerEvent::JoinedRoom { room_id: raum });
}

/// Verarbeitet eine `leave_room`-Anfrage
///
/// Verlassen ohne Mitgliedschaft ist ein No-op ohne Antwort.
pub fn handle_leave_room(
    zustand: &SignalingZustand,
    verbindungs_id: &ConnectionId,
    raum: &RoomId,
) {
    zustand.raeume.verlassen(verbindungs_id, raum);
}
