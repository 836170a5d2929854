//! funkraum-protocol – Netzwerkprotokoll-Definitionen
//!
//! Dieses Crate definiert alle Ereignistypen und das Frame-basierte
//! Wire-Format, die zwischen Client und Server ausgetauscht werden.

pub mod events;
pub mod wire;

pub use events::{ClientEvent, ErrorKind, NutzerEintrag, ServerEvent, Teilnehmer};
pub use wire::{ClientCodec, FrameCodec, ServerCodec};
