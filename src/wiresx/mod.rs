//! # Wires-X Control-Request Engine
//!
//! Recognises Wires-X commands carried in DataFR frames from the repeater and
//! answers them with multi-frame replies.
//!
//! ## Components
//!
//! - [`identity`] - station identity (callsign, label, id, descriptors)
//! - [`reply`] - byte-exact reply payload layouts
//! - [`frames`] - fragmentation of a payload into network frames
//!
//! ## Request Flow
//!
//! ```text
//! Header frame          ──► capture source descriptor (slot one)
//! Comms FN 0            ──► capture source descriptor if still blank
//! Comms FN 1            ──► decode slot two, match command tag
//!                            │
//!                            ├─ DX / ALL        → arm reply timer
//!                            ├─ Connect <id>    → resolve, select, arm
//!                            └─ Disconnect      → arm, signal caller now
//! clock() on expiry     ──► build reply ─► frames ─► Network::write
//! ```
//!
//! Replies are deferred by a short fixed delay so that a burst of redundant
//! request fragments yields exactly one reply. A new request before expiry
//! replaces the pending one.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use wiresx::network::UdpStatusSocket;
//! use wiresx::reflectors::{DirectorySettings, Reflectors};
//! use wiresx::wiresx::{Identity, WiresX};
//! use wiresx::ysf::PlainCodec;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let identity = Identity::configure("G4KLX", "My Gateway", 438_000_000, 430_000_000)?;
//!     let socket = UdpStatusSocket::bind("0.0.0.0:0".parse()?).await?;
//!     let reflectors = Reflectors::new("YSFHosts.txt", socket, DirectorySettings::default());
//!     let frames: Vec<Vec<u8>> = Vec::new();
//!
//!     let mut engine = WiresX::new(identity, reflectors, frames, PlainCodec);
//!     engine.start()?;
//!     engine.clock(10);
//!     Ok(())
//! }
//! ```

pub mod frames;
pub mod identity;
pub mod reply;

use log::{debug, info, trace, warn};

use crate::logutil::{escape_field, hex_dump};
use crate::network::Network;
use crate::reflectors::{DirectoryError, Reflector, Reflectors, StatusSocket, ID_LEN};
use crate::validation::is_blank;
use crate::ysf::{DataType, FrameCodec, FrameIndicator, Timer, SLOT_LEN};

pub use identity::{station_id, Identity, IdentityError};

pub const DX_REQ: [u8; 3] = [0x5D, 0x71, 0x5F];
pub const CONN_REQ: [u8; 3] = [0x5D, 0x23, 0x5F];
pub const DISC_REQ: [u8; 3] = [0x5D, 0x2A, 0x5F];
pub const ALL_REQ: [u8; 3] = [0x5D, 0x66, 0x5F];

/// Delay between a recognised request and its reply.
pub const DEFAULT_REPLY_DELAY_MS: u64 = 1000;

const BLANK_SOURCE: [u8; SLOT_LEN] = [b' '; SLOT_LEN];
const COMMAND_OFFSET: usize = 1;
const CONNECT_ID_OFFSET: usize = 5;
const SOURCE_CALLSIGN: std::ops::Range<usize> = 10..20;

/// What the caller should do after [`WiresX::process`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing recognised.
    None,
    /// A reply was scheduled; no change to the uplink.
    Handled,
    /// Switch the uplink to [`WiresX::selected_reflector`].
    Connect,
    /// Drop the current uplink now.
    Disconnect,
}

/// Reply waiting for the timer. `Connect` carries the identifier of the
/// reflector to report; it is looked up again when the reply is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PendingReply {
    #[default]
    None,
    Dx,
    All,
    Connect([u8; ID_LEN]),
    Disconnect,
}

pub struct WiresX<N, S, C> {
    identity: Identity,
    reflectors: Reflectors<S>,
    network: N,
    codec: C,
    source: [u8; SLOT_LEN],
    pending: PendingReply,
    timer: Timer,
    selected: Option<[u8; ID_LEN]>,
    seq: u8,
}

impl<N, S, C> WiresX<N, S, C>
where
    N: Network,
    S: StatusSocket,
    C: FrameCodec,
{
    pub fn new(identity: Identity, reflectors: Reflectors<S>, network: N, codec: C) -> Self {
        Self {
            identity,
            reflectors,
            network,
            codec,
            source: BLANK_SOURCE,
            pending: PendingReply::None,
            timer: Timer::new(DEFAULT_REPLY_DELAY_MS),
            selected: None,
            seq: 0,
        }
    }

    pub fn with_reply_delay(mut self, delay_ms: u64) -> Self {
        self.timer = Timer::new(delay_ms);
        self
    }

    /// Load the reflector directory.
    pub fn start(&mut self) -> Result<(), DirectoryError> {
        self.reflectors.load()
    }

    /// Feed one decoded YSF frame (starting at the sync pattern).
    pub fn process(
        &mut self,
        frame: &[u8],
        fi: FrameIndicator,
        dt: DataType,
        fn_: u8,
    ) -> Outcome {
        if dt != DataType::DataFrMode {
            return Outcome::None;
        }

        match (fi, fn_) {
            (FrameIndicator::Header, _) => {
                self.source = self.codec.read_slot_one(frame).unwrap_or(BLANK_SOURCE);
                Outcome::None
            }
            (FrameIndicator::Communications, 0) => {
                if is_blank(&self.source) {
                    if let Some(block) = self.codec.read_slot_one(frame) {
                        self.source = block;
                    }
                }
                Outcome::None
            }
            (FrameIndicator::Communications, 1) => match self.codec.read_slot_two(frame) {
                Some(block) => self.dispatch(&block),
                None => {
                    trace!("Discarding Wires-X fragment with bad integrity");
                    self.source = BLANK_SOURCE;
                    Outcome::None
                }
            },
            _ => Outcome::None,
        }
    }

    fn dispatch(&mut self, block: &[u8; SLOT_LEN]) -> Outcome {
        let command = &block[COMMAND_OFFSET..COMMAND_OFFSET + 3];
        if command == DX_REQ {
            debug!("Received DX from {}", self.source_callsign());
            self.arm(PendingReply::Dx);
            Outcome::Handled
        } else if command == ALL_REQ {
            debug!("Received ALL from {}", self.source_callsign());
            self.arm(PendingReply::All);
            Outcome::Handled
        } else if command == CONN_REQ {
            let mut id = [0u8; ID_LEN];
            id.copy_from_slice(&block[CONNECT_ID_OFFSET..CONNECT_ID_OFFSET + ID_LEN]);
            self.process_connect(&id)
        } else if command == DISC_REQ {
            debug!("Received Disconnect from {}", self.source_callsign());
            self.arm(PendingReply::Disconnect);
            Outcome::Disconnect
        } else {
            trace!("Unknown Wires-X command {:02X?}", command);
            self.source = BLANK_SOURCE;
            Outcome::None
        }
    }

    fn process_connect(&mut self, id: &[u8; ID_LEN]) -> Outcome {
        debug!(
            "Received Connect to {} from {}",
            escape_field(id),
            self.source_callsign()
        );

        match self.reflectors.find_id(id) {
            Some(_) => {
                self.selected = Some(*id);
                self.arm(PendingReply::Connect(*id));
                Outcome::Connect
            }
            None => {
                debug!("Connect target {} is not in the directory", escape_field(id));
                Outcome::None
            }
        }
    }

    fn arm(&mut self, pending: PendingReply) {
        self.pending = pending;
        self.timer.start();
    }

    fn source_callsign(&self) -> String {
        escape_field(&self.source[SOURCE_CALLSIGN])
    }

    /// Advance the directory, then send the pending reply if its delay lapsed.
    pub fn clock(&mut self, ms: u64) {
        self.reflectors.clock(ms);

        self.timer.clock(ms);
        if self.timer.has_expired() {
            match std::mem::take(&mut self.pending) {
                PendingReply::Dx => self.send_dx_reply(),
                PendingReply::All => self.send_all_reply(),
                PendingReply::Connect(id) => self.send_connect_reply(&id),
                PendingReply::Disconnect => self.send_disconnect_reply(),
                PendingReply::None => {}
            }
            self.timer.stop();
        }
    }

    fn send(&mut self, title: &str, data: &[u8]) {
        trace!("{}", hex_dump(title, data));
        frames::write_reply(&self.codec, &mut self.network, &self.identity, data);
        self.seq = self.seq.wrapping_add(1);
    }

    fn send_dx_reply(&mut self) {
        let data = reply::dx_reply(&self.identity, self.seq);
        self.send("DX Reply", &data);
    }

    fn send_all_reply(&mut self) {
        let data = {
            let current = self.reflectors.current();
            reply::all_reply(&self.identity, self.seq, &current, self.reflectors.len())
        };
        self.send("ALL Reply", &data);
    }

    fn send_connect_reply(&mut self, id: &[u8; ID_LEN]) {
        let data = match self.reflectors.find_id(id) {
            Some(reflector) => {
                info!("Connect reply for reflector {}", reflector.id_str());
                reply::connect_reply(&self.identity, self.seq, reflector)
            }
            None => {
                warn!(
                    "Reflector {} left the directory before the Connect reply; no reply sent",
                    escape_field(id)
                );
                return;
            }
        };
        self.send("CONNECT Reply", &data);
    }

    fn send_disconnect_reply(&mut self) {
        let data = reply::disconnect_reply(&self.identity, self.seq);
        self.send("DISCONNECT Reply", &data);
    }

    /// Reflector chosen by the most recent successful Connect request, or
    /// `None` once a reload dropped it from the directory.
    pub fn selected_reflector(&self) -> Option<&Reflector> {
        self.selected.as_ref().and_then(|id| self.reflectors.find_id(id))
    }

    pub fn pending(&self) -> PendingReply {
        self.pending
    }

    /// Sequence number the next reply will carry.
    pub fn sequence(&self) -> u8 {
        self.seq
    }

    /// Descriptor block of the station behind the request in flight.
    pub fn source(&self) -> &[u8; SLOT_LEN] {
        &self.source
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn reflectors(&self) -> &Reflectors<S> {
        &self.reflectors
    }

    pub fn reflectors_mut(&mut self) -> &mut Reflectors<S> {
        &mut self.reflectors
    }

    pub fn network(&self) -> &N {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut N {
        &mut self.network
    }
}
