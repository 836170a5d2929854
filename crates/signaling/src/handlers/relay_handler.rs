//! Relay-Handler – WebRTC-Verhandlung zwischen Peers weiterreichen
//!
//! Der Server haelt keinen Verhandlungszustand: Offer, Answer und
//! ICE-Kandidaten werden unveraendert an die Zielverbindung
//! weitergereicht. Ein totes Ziel ist kein Fehler; Races zwischen
//! Verhandlung und Trennen korrigieren sich beim Neuaufbau selbst.

use funkraum_core::types::ConnectionId;
use funkraum_protocol::events::ServerEvent;

use crate::server_state::SignalingZustand;

/// Reicht ein Verhandlungs-Ereignis an die Zielverbindung weiter
///
/// `ereignis` traegt den Absender bereits im `from`-Feld. Ist das Ziel
/// nicht (mehr) verbunden, wird still verworfen.
pub fn handle_weiterleitung(
    zustand: &SignalingZustand,
    ziel: &ConnectionId,
    ereignis: ServerEvent,
) {
    if !zustand.broadcaster.an_verbindung_senden(ziel, ereignis) {
        tracing::debug!(ziel = %ziel, "Verhandlungs-Ereignis an totes Ziel verworfen");
    }
}
