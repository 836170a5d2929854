//! Register-Handler – Identitaet anlegen und Nutzerliste verteilen

use funkraum_core::error::FunkraumError;
use funkraum_core::types::ConnectionId;
use funkraum_protocol::events::ServerEvent;

use crate::server_state::SignalingZustand;

/// Verarbeitet eine `register`-Anfrage
///
/// Bei Erfolg geht die Bestaetigung an den Absender, danach die
/// aktualisierte Nutzerliste an alle Verbindungen. Bei ungueltigem
/// Namen oder doppelter Registrierung bleibt der Zustand unveraendert.
pub fn handle_register(
    zustand: &SignalingZustand,
    verbindungs_id: ConnectionId,
    name: &str,
) -> Result<(), FunkraumError> {
    let identitaet = zustand.register.registrieren(verbindungs_id, name)?;

    zustand.broadcaster.an_verbindung_senden(
        &verbindungs_id,
        ServerEvent::Registered {
            connection_id: identitaet.connection_id,
            name: identitaet.name.clone(),
        },
    );
    nutzerliste_verteilen(zustand);

    tracing::info!(
        connection_id = %verbindungs_id,
        name = %identitaet.name,
        online = zustand.register.anzahl(),
        "Registrierung abgeschlossen"
    );
    Ok(())
}

/// Sendet die aktuelle Nutzerliste an alle Verbindungen
///
/// Auch unregistrierte Verbindungen bekommen die Liste; ihre Queue
/// existiert ab dem Annehmen.
pub fn nutzerliste_verteilen(zustand: &SignalingZustand) {
    let ereignis = ServerEvent::nutzerliste(zustand.register.alle_identitaeten());
    let empfaenger = zustand.broadcaster.an_alle_senden(ereignis);
    tracing::debug!(empfaenger, "Nutzerliste verteilt");
}
