//! funkraum-signaling – TCP-Praesenz- und Voice-Signaling-Service
//!
//! Dieser Crate implementiert den Kern von Funkraum: Verbindungs-
//! Identitaeten, Chat- und Voice-Raum-Mitgliedschaft, serverseitige
//! Sprechvergabe (Push-to-Talk) und das Weiterreichen der WebRTC-
//! Verhandlung zwischen Peers.
//!
//! ## Architektur
//!
//! ```text
//! TCP Listener (SignalingServer)
//!     |
//!     v
//! ClientVerbindung (pro Verbindung ein Task)
//!     |  Frames <-> Send-Queue, Keepalive
//!     |
//!     v
//! EventDispatcher
//!     |
//!     +-- RegisterHandler  (Identitaet, Nutzerliste)
//!     +-- RoomHandler      (Chat-Raeume)
//!     +-- VoiceHandler     (Voice-Praesenz, Teilnehmerlisten)
//!     +-- TalkHandler      (Push-to-Talk-Vergabe)
//!     +-- RelayHandler     (Offer/Answer/ICE weiterreichen)
//!
//! VerbindungsRegister – Wer ist registriert
//! RaumMitgliedschaft  – Wer ist in welchem Chat-Raum
//! VoicePraesenz       – Wer ist in welchem Voice-Raum
//! SprechArbiter       – Wer spricht gerade wo
//! EventBroadcaster    – Ereignisse an Verbindungen zustellen
//! ```

pub mod broadcast;
pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod registry;
pub mod rooms;
pub mod server_state;
pub mod talk;
pub mod tcp;
pub mod voice;

// Bequeme Re-Exporte
pub use broadcast::EventBroadcaster;
pub use connection::ClientVerbindung;
pub use dispatcher::EventDispatcher;
pub use error::{SignalingError, SignalingResult};
pub use registry::VerbindungsRegister;
pub use rooms::RaumMitgliedschaft;
pub use server_state::{SignalingConfig, SignalingZustand};
pub use talk::{SprechArbiter, Sprechentscheidung};
pub use tcp::SignalingServer;
pub use voice::VoicePraesenz;
