//! # Gateway Runtime
//!
//! Wires the engine to real sockets: reads YSF network frames from the
//! repeater, feeds DataFR traffic to [`WiresX`], and drives every timer from a
//! single millisecond tick.
//!
//! ```text
//! repeater ──UDP──► Gateway::handle_frame ──► WiresX::process
//!                                             │
//! tick (10 ms) ───► WiresX::clock ◄───────────┘
//!                        │
//!                        └─► UdpNetwork ──UDP──► repeater
//! ```
//!
//! Everything runs on one task; the engine is never shared.

use std::future::Future;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use log::{debug, info, warn};
use tokio::net::UdpSocket;
use tokio::time::Instant;

use crate::config::Config;
use crate::network::{UdpNetwork, UdpStatusSocket};
use crate::reflectors::Reflectors;
use crate::validation::{field_str, validate_callsign};
use crate::wiresx::{Identity, Outcome, WiresX};
use crate::ysf::{FrameCodec, PlainCodec, NETWORK_FRAME_LEN, NETWORK_HEADER_LEN};

/// Network frames from the repeater start with this tag.
pub const FRAME_TAG: &[u8; 4] = b"YSFD";
const TICK: Duration = Duration::from_millis(10);

pub type Engine = WiresX<UdpNetwork, UdpStatusSocket, PlainCodec>;

pub struct Gateway {
    socket: Arc<UdpSocket>,
    engine: Engine,
    linked: Option<String>,
}

impl Gateway {
    /// Validate the configuration, bind both sockets and load the directory.
    pub async fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        let callsign = validate_callsign(&config.gateway.callsign)?;
        let identity = Identity::configure(
            &callsign,
            &config.wiresx.name,
            config.wiresx.uplink_hz,
            config.wiresx.downlink_hz,
        )?;

        let local = config.network.local()?;
        let repeater = config.network.repeater()?;
        let socket = Arc::new(
            UdpSocket::bind(local)
                .await
                .map_err(|e| anyhow!("Failed to bind {}: {}", local, e))?,
        );

        let status_addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.reflectors.status_port));
        let status = UdpStatusSocket::bind(status_addr)
            .await
            .map_err(|e| anyhow!("Failed to bind status socket {}: {}", status_addr, e))?;

        let reflectors = Reflectors::new(
            &config.reflectors.hosts_file,
            status,
            config.reflectors.settings(),
        );
        let network = UdpNetwork::new(Arc::clone(&socket), repeater);
        let mut engine = WiresX::new(identity, reflectors, network, PlainCodec)
            .with_reply_delay(config.wiresx.reply_delay_ms);
        engine.start()?;

        info!(
            "Gateway {} listening on {}, repeater at {}",
            callsign,
            socket.local_addr()?,
            repeater
        );

        Ok(Self {
            socket,
            engine,
            linked: None,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Identifier of the reflector the last Connect request selected.
    pub fn linked(&self) -> Option<&str> {
        self.linked.as_deref()
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Run until Ctrl-C.
    pub async fn run(&mut self) -> Result<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Unable to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Run until `shutdown` completes.
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let mut tick = tokio::time::interval(TICK);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut last = Instant::now();
        let mut buf = [0u8; 512];

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    let now = Instant::now();
                    let ms = now.duration_since(last).as_millis() as u64;
                    if ms > 0 {
                        self.engine.clock(ms);
                        last = now;
                    }
                }

                received = self.socket.recv_from(&mut buf) => {
                    match received {
                        Ok((len, from)) => {
                            self.handle_frame(&buf[..len], from);
                        }
                        Err(e) => warn!("Error reading repeater socket: {}", e),
                    }
                }

                _ = &mut shutdown => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Route one datagram from the repeater into the engine.
    pub fn handle_frame(&mut self, data: &[u8], from: SocketAddr) -> Outcome {
        if data.len() < NETWORK_FRAME_LEN || &data[..FRAME_TAG.len()] != FRAME_TAG {
            debug!("Ignoring {} byte datagram from {}", data.len(), from);
            return Outcome::None;
        }

        if from != self.engine.network().peer() {
            warn!("Ignoring frame from {}; not the configured repeater", from);
            return Outcome::None;
        }

        let frame = &data[NETWORK_HEADER_LEN..NETWORK_FRAME_LEN];
        let fich = match PlainCodec.decode_fich(frame) {
            Some(f) => f,
            None => return Outcome::None,
        };

        let outcome = self.engine.process(
            frame,
            fich.frame_indicator(),
            fich.data_type(),
            fich.frame_number(),
        );

        match outcome {
            Outcome::Connect => {
                if let Some(reflector) = self.engine.selected_reflector() {
                    info!(
                        "Linking to reflector {} ({}) at {}",
                        reflector.id_str(),
                        reflector.name_str(),
                        reflector.address()
                    );
                    self.linked = Some(field_str(reflector.id()));
                }
            }
            Outcome::Disconnect => {
                match self.linked.take() {
                    Some(id) => info!("Unlinking from reflector {}", id),
                    None => debug!("Disconnect requested while not linked"),
                }
            }
            Outcome::Handled | Outcome::None => {}
        }

        outcome
    }
}
