//! Client-Verbindung – Verwaltet eine einzelne TCP-Verbindung
//!
//! Jede TCP-Verbindung bekommt eine `ClientVerbindung` in einem eigenen
//! tokio-Task. Die Verbindungs-ID entsteht beim Annehmen; ab diesem
//! Moment existiert auch die Send-Queue im Broadcaster, Broadcasts wie
//! `user_list` erreichen die Verbindung also schon vor `register`.
//!
//! ## Keepalive
//! - Server sendet alle `keepalive_sek` einen Ping
//! - Kommt innerhalb von `verbindungs_timeout_sek` kein Frame an,
//!   wird die Verbindung getrennt

use futures_util::{SinkExt, StreamExt};
use funkraum_core::types::ConnectionId;
use funkraum_protocol::events::ServerEvent;
use funkraum_protocol::wire::ServerCodec;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;

use crate::dispatcher::EventDispatcher;
use crate::error::{SignalingError, SignalingResult};
use crate::server_state::SignalingZustand;

/// Verarbeitet eine einzelne TCP-Verbindung
///
/// Liest Frames via `ServerCodec`, dispatcht an den `EventDispatcher`
/// und schreibt Ereignisse aus der Send-Queue zurueck. Laeuft in einem
/// eigenen tokio-Task.
pub struct ClientVerbindung {
    zustand: Arc<SignalingZustand>,
    verbindungs_id: ConnectionId,
    peer_addr: SocketAddr,
}

impl ClientVerbindung {
    /// Erstellt eine neue ClientVerbindung mit frischer Verbindungs-ID
    pub fn neu(zustand: Arc<SignalingZustand>, peer_addr: SocketAddr) -> Self {
        Self {
            zustand,
            verbindungs_id: ConnectionId::new(),
            peer_addr,
        }
    }

    /// Gibt die Verbindungs-ID zurueck
    pub fn verbindungs_id(&self) -> ConnectionId {
        self.verbindungs_id
    }

    /// Startet die Verbindungs-Verarbeitungsschleife
    ///
    /// Laeuft bis die Verbindung getrennt wird, das Timeout zuschlaegt
    /// oder ein Shutdown-Signal eingeht. Die Bereinigung laeuft in jedem
    /// Fall vor dem Task-Ende.
    pub async fn verarbeiten(
        self,
        stream: TcpStream,
        shutdown_rx: tokio::sync::watch::Receiver<bool>,
    ) {
        let verbindungs_id = self.verbindungs_id;
        let peer_addr = self.peer_addr;

        tracing::info!(peer = %peer_addr, connection_id = %verbindungs_id, "Neue Verbindung");

        let dispatcher = EventDispatcher::neu(Arc::clone(&self.zustand));
        let ergebnis = self.ereignis_schleife(stream, shutdown_rx, &dispatcher).await;

        match ergebnis {
            Ok(()) => {
                tracing::info!(peer = %peer_addr, "Verbindung geschlossen");
            }
            Err(SignalingError::VerbindungGetrennt) => {
                tracing::info!(peer = %peer_addr, "Verbindung vom Client getrennt");
            }
            Err(SignalingError::Zeitlimit(sekunden)) => {
                tracing::warn!(peer = %peer_addr, timeout_sek = sekunden, "Verbindungs-Timeout");
            }
            Err(fehler) => {
                tracing::warn!(peer = %peer_addr, fehler = %fehler, "Verbindung mit Fehler beendet");
            }
        }

        // Cleanup beim Verbindungsende: Voice, Raeume, Identitaet, Queue
        dispatcher.verbindung_bereinigen(&verbindungs_id);

        tracing::info!(peer = %peer_addr, connection_id = %verbindungs_id, "Verbindungs-Task beendet");
    }

    /// Ereignisschleife einer Verbindung
    ///
    /// Das Ergebnis benennt den Grund fuer das Verbindungsende; die
    /// Bereinigung uebernimmt der Aufrufer.
    async fn ereignis_schleife(
        &self,
        stream: TcpStream,
        mut shutdown_rx: tokio::sync::watch::Receiver<bool>,
        dispatcher: &EventDispatcher,
    ) -> SignalingResult<()> {
        let keepalive_intervall = Duration::from_secs(self.zustand.config.keepalive_sek);
        let timeout_dauer = Duration::from_secs(self.zustand.config.verbindungs_timeout_sek);

        // Framed-Stream mit Laengenpraefix-Codec einrichten
        let mut framed = Framed::new(stream, ServerCodec::new());

        // Send-Queue ab Annahme der Verbindung
        let mut sende_rx = self
            .zustand
            .broadcaster
            .verbindung_registrieren(self.verbindungs_id);

        // Zeitpunkt des letzten empfangenen Frames
        let mut letzter_empfang = Instant::now();
        // Zeitpunkt des naechsten Ping
        let mut naechster_ping = Instant::now() + keepalive_intervall;

        loop {
            let jetzt = Instant::now();

            // Timeout-Pruefung
            if jetzt.duration_since(letzter_empfang) > timeout_dauer {
                return Err(SignalingError::Zeitlimit(
                    self.zustand.config.verbindungs_timeout_sek,
                ));
            }

            // Naechsten Ping-Zeitpunkt berechnen
            let ping_verzoegerung = if jetzt < naechster_ping {
                naechster_ping.duration_since(jetzt)
            } else {
                Duration::from_millis(1)
            };

            tokio::select! {
                // Eingehendes Ereignis vom Client
                frame = framed.next() => {
                    match frame {
                        Some(Ok(ereignis)) => {
                            letzter_empfang = Instant::now();
                            tracing::trace!(peer = %self.peer_addr, "Ereignis empfangen");
                            dispatcher.dispatch(self.verbindungs_id, ereignis);
                        }
                        Some(Err(fehler)) => {
                            tracing::warn!(
                                peer = %self.peer_addr,
                                fehler = %fehler,
                                "Frame-Lesefehler"
                            );
                            return Err(SignalingError::Io(fehler));
                        }
                        None => {
                            return Err(SignalingError::VerbindungGetrennt);
                        }
                    }
                }

                // Ausgehendes Ereignis aus der Send-Queue
                Some(ausgehend) = sende_rx.recv() => {
                    framed.send(ausgehend).await?;
                }

                // Keepalive-Ping
                _ = tokio::time::sleep(ping_verzoegerung) => {
                    if jetzt >= naechster_ping {
                        let ts = std::time::SystemTime::now()
                            .duration_since(std::time::UNIX_EPOCH)
                            .unwrap_or_default()
                            .as_millis() as u64;
                        framed.send(ServerEvent::ping(ts)).await?;
                        naechster_ping = Instant::now() + keepalive_intervall;
                    }
                }

                // Shutdown-Signal
                Ok(()) = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::info!(
                            peer = %self.peer_addr,
                            "Shutdown-Signal – Verbindung wird getrennt"
                        );
                        return Ok(());
                    }
                }
            }
        }
    }
}
