//! # YSF Frame Primitives
//!
//! Narrow, stateless helpers for the System Fusion (YSF) frames that carry the
//! Wires-X control channel. Nothing in here knows about commands or reflectors.
//!
//! ## Components
//!
//! - [`fich`] - the Frame Information Channel header field model
//! - [`codec`] - the [`FrameCodec`] seam for FICH and DataFR sub-payload coding
//! - [`timer`] - a millisecond tick timer used by the engine and the directory
//!
//! ## Frame Geometry
//!
//! Every frame exchanged with the repeater is a 35-byte network header followed
//! by a 120-byte YSF frame:
//!
//! ```text
//! 0        35   40                 65                                155
//! ├────────┼────┼──────────────────┼──────────────────────────────────┤
//! │ header │sync│       FICH       │             payload              │
//! └────────┴────┴──────────────────┴──────────────────────────────────┘
//! ```
//!
//! Offsets in [`codec`] and [`fich`] are relative to the start of the YSF frame
//! (the sync pattern), not the network header.

pub mod codec;
pub mod fich;
pub mod timer;

pub use codec::{FrameCodec, PlainCodec};
pub use fich::Fich;
pub use timer::Timer;

/// Length of the network header that precedes every YSF frame.
pub const NETWORK_HEADER_LEN: usize = 35;
/// Length of a YSF frame (sync + FICH + payload).
pub const FRAME_LEN: usize = 120;
/// Length of a complete network frame.
pub const NETWORK_FRAME_LEN: usize = NETWORK_HEADER_LEN + FRAME_LEN;

pub const SYNC_LEN: usize = 5;
pub const FICH_LEN: usize = 25;
pub const PAYLOAD_LEN: usize = 90;

/// Offset of the FICH region inside a YSF frame.
pub const FICH_OFFSET: usize = SYNC_LEN;
/// Offset of the payload region inside a YSF frame.
pub const PAYLOAD_OFFSET: usize = SYNC_LEN + FICH_LEN;

const _: () = assert!(PAYLOAD_OFFSET + PAYLOAD_LEN == FRAME_LEN);

/// Size of one DataFR sub-payload slot.
pub const SLOT_LEN: usize = 20;

pub const SYNC_BYTES: [u8; SYNC_LEN] = [0xD4, 0x71, 0xC9, 0x63, 0x4D];

/// Role of a frame inside a transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameIndicator {
    Header,
    Communications,
    Terminator,
    Test,
}

impl FrameIndicator {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => FrameIndicator::Header,
            1 => FrameIndicator::Communications,
            2 => FrameIndicator::Terminator,
            _ => FrameIndicator::Test,
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            FrameIndicator::Header => 0,
            FrameIndicator::Communications => 1,
            FrameIndicator::Terminator => 2,
            FrameIndicator::Test => 3,
        }
    }
}

/// Data type carried in the payload region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Voice/data mode 1 (half rate voice with data).
    VdMode1,
    /// Data full-rate mode, the only mode that carries Wires-X commands.
    DataFrMode,
    /// Voice/data mode 2.
    VdMode2,
    /// Voice full-rate mode.
    VoiceFrMode,
}

impl DataType {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => DataType::VdMode1,
            1 => DataType::DataFrMode,
            2 => DataType::VdMode2,
            _ => DataType::VoiceFrMode,
        }
    }
}

/// 8-bit additive checksum used as the last byte of every Wires-X payload.
pub fn checksum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

/// Write the YSF sync pattern at the start of `frame`.
pub fn add_sync(frame: &mut [u8]) {
    frame[..SYNC_LEN].copy_from_slice(&SYNC_BYTES);
}
