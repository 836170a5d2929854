//! Ereignis-Protokoll (TCP)
//!
//! Definiert alle Ereignisse, die zwischen Client und Server ausgetauscht
//! werden. Beide Richtungen sind geschlossene Enums – unbekannte
//! Ereignistypen scheitern bereits beim Deserialisieren.
//!
//! ## Design
//! - Zwei getrennte Enums: `ClientEvent` (eingehend) und `ServerEvent`
//!   (ausgehend), keine freie String-Adressierung von Handlern
//! - JSON-Serialisierung via serde, Variante im `type`-Feld
//! - WebRTC-Verhandlungsdaten (`payload`) werden als opakes
//!   `serde_json::Value` unveraendert durchgereicht

use chrono::{DateTime, Utc};
use funkraum_core::error::FunkraumError;
use funkraum_core::types::{ConnectionId, Identitaet, RoomId};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Fehler-Arten
// ---------------------------------------------------------------------------

/// Standardisierte Fehler-Arten fuer `error`-Ereignisse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Aktion erfordert eine registrierte Identitaet
    Unregistered,
    /// Name verletzt Laenge oder Zeichensatz
    InvalidName,
    /// Verbindung hat bereits eine Identitaet
    AlreadyRegistered,
    /// In diesem Raum spricht bereits jemand
    Busy,
}

impl From<&FunkraumError> for ErrorKind {
    fn from(fehler: &FunkraumError) -> Self {
        match fehler {
            FunkraumError::UngueltigerName(_) => ErrorKind::InvalidName,
            FunkraumError::BereitsRegistriert(_) => ErrorKind::AlreadyRegistered,
            FunkraumError::NichtRegistriert => ErrorKind::Unregistered,
            FunkraumError::Besetzt(_) => ErrorKind::Busy,
        }
    }
}

// ---------------------------------------------------------------------------
// Listen-Eintraege
// ---------------------------------------------------------------------------

/// Eintrag in der globalen Nutzerliste (`user_list`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutzerEintrag {
    pub connection_id: ConnectionId,
    pub name: String,
    pub verbunden_seit: DateTime<Utc>,
}

impl From<Identitaet> for NutzerEintrag {
    fn from(ident: Identitaet) -> Self {
        Self {
            connection_id: ident.connection_id,
            name: ident.name,
            verbunden_seit: ident.verbunden_seit,
        }
    }
}

/// Eintrag in einer personalisierten Voice-Teilnehmerliste
///
/// `talking` traegt den echten Sprechzustand aus der serverseitigen
/// Sprechvergabe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teilnehmer {
    pub connection_id: ConnectionId,
    pub name: String,
    pub talking: bool,
}

// ---------------------------------------------------------------------------
// Eingehende Ereignisse (Client -> Server)
// ---------------------------------------------------------------------------

/// Alle Ereignisse, die ein Client senden darf
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    // Registrierung
    Register { name: String },

    // Raeume
    JoinRoom { room_id: RoomId },
    LeaveRoom { room_id: RoomId },

    // Voice-Praesenz
    JoinVoice { room_id: RoomId },
    LeaveVoice { room_id: RoomId },

    // Sprechvergabe (Push-to-Talk)
    VoiceTalking { room_id: RoomId, talking: bool },

    // WebRTC-Verhandlung (Peer-zu-Peer, vom Server nur weitergereicht)
    VoiceOffer {
        to: ConnectionId,
        payload: serde_json::Value,
    },
    VoiceAnswer {
        to: ConnectionId,
        payload: serde_json::Value,
    },
    VoiceIceCandidate {
        to: ConnectionId,
        payload: serde_json::Value,
    },

    // Keepalive
    Ping { timestamp_ms: u64 },
    Pong { echo_timestamp_ms: u64 },
}

// ---------------------------------------------------------------------------
// Ausgehende Ereignisse (Server -> Client)
// ---------------------------------------------------------------------------

/// Alle Ereignisse, die der Server sendet
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    // Registrierung
    Registered {
        connection_id: ConnectionId,
        name: String,
    },
    Error {
        kind: ErrorKind,
        message: String,
    },
    UserList {
        users: Vec<NutzerEintrag>,
    },

    // Raeume
    JoinedRoom {
        room_id: RoomId,
    },

    // Voice-Praesenz
    VoiceUserJoined {
        room_id: RoomId,
        connection_id: ConnectionId,
        name: String,
    },
    VoiceUserLeft {
        room_id: RoomId,
        connection_id: ConnectionId,
        name: String,
    },
    VoiceParticipants {
        room_id: RoomId,
        participants: Vec<Teilnehmer>,
    },

    // Sprechvergabe
    VoiceTalkingUpdate {
        room_id: RoomId,
        connection_id: ConnectionId,
        talking: bool,
    },

    // WebRTC-Verhandlung
    VoiceOffer {
        from: ConnectionId,
        payload: serde_json::Value,
    },
    VoiceAnswer {
        from: ConnectionId,
        payload: serde_json::Value,
    },
    VoiceIceCandidate {
        from: ConnectionId,
        payload: serde_json::Value,
    },

    // Keepalive
    Ping {
        timestamp_ms: u64,
    },
    Pong {
        echo_timestamp_ms: u64,
        server_timestamp_ms: u64,
    },
}

impl ServerEvent {
    /// Erstellt ein Fehler-Ereignis
    pub fn fehler(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Error {
            kind,
            message: message.into(),
        }
    }

    /// Erstellt ein Fehler-Ereignis aus einem Domaenenfehler
    ///
    /// Die Fehler-Art wird gemappt, die Display-Darstellung wird zur
    /// Fehlermeldung.
    pub fn fehler_von(fehler: &FunkraumError) -> Self {
        Self::Error {
            kind: ErrorKind::from(fehler),
            message: fehler.to_string(),
        }
    }

    /// Erstellt ein Keepalive-Ping-Ereignis
    pub fn ping(timestamp_ms: u64) -> Self {
        Self::Ping { timestamp_ms }
    }

    /// Erstellt eine Pong-Antwort
    pub fn pong(echo_timestamp_ms: u64, server_timestamp_ms: u64) -> Self {
        Self::Pong {
            echo_timestamp_ms,
            server_timestamp_ms,
        }
    }

    /// Erstellt ein `user_list`-Ereignis aus allen bekannten Identitaeten
    pub fn nutzerliste(identitaeten: Vec<Identitaet>) -> Self {
        Self::UserList {
            users: identitaeten.into_iter().map(NutzerEintrag::from).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
