//! funkraum-server – Bibliotheks-Root
//!
//! Deklariert alle Server-Module und stellt den oeffentlichen Einstiegspunkt
//! fuer Integrationstests bereit.

pub mod config;

use std::net::SocketAddr;

use anyhow::Result;
use config::ServerConfig;
use funkraum_signaling::{SignalingConfig, SignalingServer, SignalingZustand};
use tokio::sync::watch;

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet den Signaling-Listener und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. Gemeinsamen Signaling-Zustand aufbauen
    /// 2. TCP-Listener starten (Signalisierungs-Protokoll)
    /// 3. Auf Ctrl-C warten und den Shutdown an alle Verbindungen melden
    pub async fn starten(self) -> Result<()> {
        let bind_addr: SocketAddr = self.config.tcp_bind_adresse().parse()?;

        let signaling_config = SignalingConfig {
            server_name: self.config.server.name.clone(),
            max_clients: self.config.server.max_clients,
            keepalive_sek: self.config.netzwerk.keepalive_sek,
            verbindungs_timeout_sek: self.config.netzwerk.verbindungs_timeout_sek,
        };
        let zustand = SignalingZustand::neu(signaling_config);
        let server = SignalingServer::neu(zustand, bind_addr);

        tracing::info!(
            server_name = %self.config.server.name,
            tcp = %server.bind_addr(),
            max_clients = self.config.server.max_clients,
            "Server startet"
        );

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutdown-Signal empfangen, Server wird beendet");
                let _ = shutdown_tx.send(true);
            }
        });

        server.starten(shutdown_rx).await?;
        Ok(())
    }
}
