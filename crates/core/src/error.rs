//! Fehlertypen fuer Funkraum
//!
//! Zentraler Fehler-Enum fuer alle Zustaende, die dem Client als
//! Fehlerereignis gemeldet werden. Transportfehler definieren die
//! jeweiligen Crates selbst und konvertieren via `#[from]`.

use thiserror::Error;

/// Globaler Result-Alias fuer Funkraum
pub type Result<T> = std::result::Result<T, FunkraumError>;

/// Alle Fehlerzustaende, die aus Client-Ereignissen entstehen koennen
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FunkraumError {
    // --- Registrierung ---
    #[error("Ungueltiger Name: {0}")]
    UngueltigerName(String),

    #[error("Verbindung ist bereits als '{0}' registriert")]
    BereitsRegistriert(String),

    #[error("Verbindung ist nicht registriert")]
    NichtRegistriert,

    // --- Sprechvergabe ---
    #[error("In Raum '{0}' spricht bereits jemand")]
    Besetzt(String),
}
