//! Gemeinsamer Server-Zustand fuer den Signaling-Service
//!
//! Haelt die Konfiguration und alle Zustands-Manager als geteilte
//! Referenzen, die sicher zwischen tokio-Tasks geteilt werden koennen.

use std::sync::Arc;
use std::time::Instant;

use crate::broadcast::EventBroadcaster;
use crate::registry::VerbindungsRegister;
use crate::rooms::RaumMitgliedschaft;
use crate::talk::SprechArbiter;
use crate::voice::VoicePraesenz;

/// Konfiguration fuer den Signaling-Service
#[derive(Debug, Clone)]
pub struct SignalingConfig {
    /// Anzeigename des Servers
    pub server_name: String,
    /// Maximale gleichzeitige Verbindungen
    pub max_clients: u32,
    /// Keepalive-Intervall in Sekunden
    pub keepalive_sek: u64,
    /// Timeout fuer inaktive Verbindungen in Sekunden
    pub verbindungs_timeout_sek: u64,
}

impl Default for SignalingConfig {
    fn default() -> Self {
        Self {
            server_name: "Funkraum".to_string(),
            max_clients: 512,
            keepalive_sek: 30,
            verbindungs_timeout_sek: 90,
        }
    }
}

/// Gemeinsamer Server-Zustand (thread-safe, Arc-geteilt)
///
/// Alle Manager teilen ihren inneren Zustand ueber Arc; Clone einer
/// Manager-Referenz gibt eine Sicht auf denselben Zustand.
pub struct SignalingZustand {
    /// Server-Konfiguration
    pub config: Arc<SignalingConfig>,
    /// Identitaeten aller registrierten Verbindungen
    pub register: VerbindungsRegister,
    /// Chat-Raum-Mitgliedschaft
    pub raeume: RaumMitgliedschaft,
    /// Voice-Raum-Praesenz
    pub voice: VoicePraesenz,
    /// Sprechvergabe pro Voice-Raum
    pub arbiter: SprechArbiter,
    /// Send-Queues aller Verbindungen
    pub broadcaster: EventBroadcaster,
    /// Startzeitpunkt des Servers (fuer Uptime-Berechnung)
    pub start_time: Instant,
}

impl SignalingZustand {
    /// Erstellt einen neuen SignalingZustand
    pub fn neu(config: SignalingConfig) -> Arc<Self> {
        Arc::new(Self {
            config: Arc::new(config),
            register: VerbindungsRegister::neu(),
            raeume: RaumMitgliedschaft::neu(),
            voice: VoicePraesenz::neu(),
            arbiter: SprechArbiter::neu(),
            broadcaster: EventBroadcaster::neu(),
            start_time: Instant::now(),
        })
    }

    /// Gibt die Uptime in Sekunden zurueck
    pub fn uptime_sek(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = SignalingConfig::default();
        assert_eq!(config.max_clients, 512);
        assert_eq!(config.keepalive_sek, 30);
        assert_eq!(config.verbindungs_timeout_sek, 90);
    }

    #[test]
    fn zustand_startet_leer() {
        let zustand = SignalingZustand::neu(SignalingConfig::default());
        assert_eq!(zustand.register.anzahl(), 0);
        assert_eq!(zustand.raeume.raum_anzahl(), 0);
        assert_eq!(zustand.voice.raum_anzahl(), 0);
        assert_eq!(zustand.broadcaster.verbindungs_anzahl(), 0);
    }
}
