//! Frame Information Channel (FICH) field model.
//!
//! The FICH is four bytes of packed bit fields. This type only knows the bit
//! layout; protecting the bytes on air is the job of a [`FrameCodec`].
//!
//! ```text
//! byte 0: FI(7..6) CS(5..4) CM(3..2) BN(1..0)
//! byte 1: BT(7..6) FN(5..3) FT(2..0)
//! byte 2: DEV(6)   MR(4..3) VoIP(2)  DT(1..0)
//! byte 3: SQL(7)   SQ(6..0)
//! ```
//!
//! [`FrameCodec`]: super::FrameCodec

use super::{DataType, FrameIndicator};

/// Default FICH used for every frame the gateway originates: CS=2, DT=DataFR.
pub const DEFAULT_FICH: [u8; 4] = [0x20, 0x00, 0x01, 0x00];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fich {
    bytes: [u8; 4],
}

impl Default for Fich {
    fn default() -> Self {
        Self::load(DEFAULT_FICH)
    }
}

impl Fich {
    pub fn load(bytes: [u8; 4]) -> Self {
        Self { bytes }
    }

    pub fn bytes(&self) -> [u8; 4] {
        self.bytes
    }

    pub fn frame_indicator(&self) -> FrameIndicator {
        FrameIndicator::from_bits(self.bytes[0] >> 6)
    }

    pub fn block_number(&self) -> u8 {
        self.bytes[0] & 0x03
    }

    pub fn block_total(&self) -> u8 {
        (self.bytes[1] >> 6) & 0x03
    }

    pub fn frame_number(&self) -> u8 {
        (self.bytes[1] >> 3) & 0x07
    }

    pub fn frame_total(&self) -> u8 {
        self.bytes[1] & 0x07
    }

    pub fn data_type(&self) -> DataType {
        DataType::from_bits(self.bytes[2])
    }

    pub fn set_frame_indicator(&mut self, fi: FrameIndicator) {
        self.bytes[0] = (self.bytes[0] & 0x3F) | ((fi.bits() << 6) & 0xC0);
    }

    /// Block number; only the low two bits fit the field.
    pub fn set_block_number(&mut self, bn: u8) {
        self.bytes[0] = (self.bytes[0] & 0xFC) | (bn & 0x03);
    }

    /// Block total; only the low two bits fit the field.
    pub fn set_block_total(&mut self, bt: u8) {
        self.bytes[1] = (self.bytes[1] & 0x3F) | ((bt << 6) & 0xC0);
    }

    pub fn set_frame_number(&mut self, fn_: u8) {
        self.bytes[1] = (self.bytes[1] & 0xC7) | ((fn_ << 3) & 0x38);
    }

    /// Frame total, which Wires-X replies use as the step code.
    pub fn set_frame_total(&mut self, ft: u8) {
        self.bytes[1] = (self.bytes[1] & 0xF8) | (ft & 0x07);
    }
}
