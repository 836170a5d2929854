//! Handler fuer alle Client-Ereignisse
//!
//! Jeder Handler ist fuer eine Ereignisgruppe zustaendig und hat
//! Zugriff auf den gemeinsamen SignalingZustand. Kein Handler hat einen
//! await-Punkt: jede Ereignisverarbeitung laeuft vollstaendig durch,
//! bevor die naechste beginnt.

pub mod register_handler;
pub mod relay_handler;
pub mod room_handler;
pub mod talk_handler;
pub mod voice_handler;
