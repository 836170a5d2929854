//! Gemeinsame Identifikations- und Identitaetstypen fuer Funkraum
//!
//! Verbindungs-IDs verwenden das Newtype-Pattern um Verwechslungen mit
//! anderen String- oder UUID-Werten zur Compilezeit auszuschliessen.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Eindeutige Verbindungs-ID
///
/// Wird beim Annehmen einer TCP-Verbindung serverseitig vergeben und
/// bleibt fuer die Lebensdauer der Verbindung stabil.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Erstellt eine neue zufaellige ConnectionId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Gibt die innere UUID zurueck
    pub fn inner(&self) -> Uuid {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn:{}", self.0)
    }
}

/// Kennung eines Chat- oder Voice-Raums
///
/// Raum-IDs sind freie Strings, die der Client waehlt. Numerische
/// JSON-Werte werden beim Deserialisieren in ihre Dezimaldarstellung
/// normalisiert, damit `1` und `"1"` denselben Raum bezeichnen.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RoomId(pub String);

impl RoomId {
    /// Erstellt eine RoomId aus einem beliebigen String-Wert
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Gibt die Kennung als String-Slice zurueck
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for RoomId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct RoomIdVisitor;

        impl serde::de::Visitor<'_> for RoomIdVisitor {
            type Value = RoomId;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("Raum-ID als String oder Ganzzahl")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<RoomId, E> {
                Ok(RoomId(v.to_owned()))
            }

            fn visit_string<E: serde::de::Error>(self, v: String) -> Result<RoomId, E> {
                Ok(RoomId(v))
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<RoomId, E> {
                Ok(RoomId(v.to_string()))
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<RoomId, E> {
                Ok(RoomId(v.to_string()))
            }
        }

        deserializer.deserialize_any(RoomIdVisitor)
    }
}

/// Identitaet einer registrierten Verbindung
///
/// Entsteht beim erfolgreichen `register` und lebt bis zum Trennen
/// der Verbindung.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identitaet {
    pub connection_id: ConnectionId,
    pub name: String,
    pub verbunden_seit: DateTime<Utc>,
}

impl Identitaet {
    /// Erstellt eine neue Identitaet mit aktuellem Zeitstempel
    pub fn new(connection_id: ConnectionId, name: impl Into<String>) -> Self {
        Self {
            connection_id,
            name: name.into(),
            verbunden_seit: Utc::now(),
        }
    }
}
