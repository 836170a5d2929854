//! Fehlertypen fuer den Signaling-Service

use thiserror::Error;

/// Fehlertyp fuer den Signaling-Service
///
/// Beschreibt, warum eine Verbindungsschleife endet. Fachliche Fehler
/// (ungueltiger Name, besetzter Raum) laufen als `error`-Ereignis zum
/// Client zurueck und tauchen hier nicht auf.
#[derive(Debug, Error)]
pub enum SignalingError {
    /// IO-Fehler (TCP, Socket)
    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),

    /// Verbindung wurde von der Gegenseite geschlossen
    #[error("Verbindung getrennt")]
    VerbindungGetrennt,

    /// Keine eingehenden Frames innerhalb des Timeouts
    #[error("Zeitlimit ueberschritten: {0} Sekunden ohne Daten")]
    Zeitlimit(u64),
}

/// Result-Typ fuer den Signaling-Service
pub type SignalingResult<T> = Result<T, SignalingError>;
