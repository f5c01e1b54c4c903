//! FICH and DataFR sub-payload coding.
//!
//! On air both the FICH and the two 20-byte DataFR slots are protected by
//! Golay/convolutional FEC, interleaving and whitening. The Wires-X engine does
//! not care how that is done, only that it can pack and unpack the fields, so
//! the coding sits behind [`FrameCodec`].
//!
//! [`PlainCodec`] is the clear-text implementation shipped with the crate. It
//! keeps the same slot semantics (CRC-checked 20-byte blocks) and is what the
//! tests and the loopback tooling use.

use crc::{Crc, CRC_16_IBM_SDLC};

use super::{Fich, FICH_OFFSET, PAYLOAD_OFFSET, SLOT_LEN};

const CRC_CALCULATOR: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_SDLC);

/// Coding of the FICH region and the two DataFR slots of a YSF frame.
///
/// All `frame` arguments start at the sync pattern and span a whole YSF frame.
pub trait FrameCodec {
    fn encode_fich(&self, fich: &Fich, frame: &mut [u8]);

    /// Returns `None` when the FICH fails its integrity check.
    fn decode_fich(&self, frame: &[u8]) -> Option<Fich>;

    fn write_slot_one(&self, data: &[u8; SLOT_LEN], frame: &mut [u8]);

    fn write_slot_two(&self, data: &[u8; SLOT_LEN], frame: &mut [u8]);

    /// Returns `None` when the slot fails its integrity check.
    fn read_slot_one(&self, frame: &[u8]) -> Option<[u8; SLOT_LEN]>;

    /// Returns `None` when the slot fails its integrity check.
    fn read_slot_two(&self, frame: &[u8]) -> Option<[u8; SLOT_LEN]>;
}

/// Clear-text codec: fields are stored verbatim, each followed by a
/// big-endian CRC-16.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainCodec;

impl PlainCodec {
    /// Slot one occupies the first half of the payload region.
    pub const SLOT_ONE_OFFSET: usize = PAYLOAD_OFFSET;
    /// Slot two occupies the second half of the payload region.
    pub const SLOT_TWO_OFFSET: usize = PAYLOAD_OFFSET + 45;

    fn write_checked(data: &[u8], region: &mut [u8]) {
        let crc = CRC_CALCULATOR.checksum(data);
        region[..data.len()].copy_from_slice(data);
        region[data.len()..data.len() + 2].copy_from_slice(&crc.to_be_bytes());
    }

    fn read_checked(region: &[u8], len: usize) -> Option<&[u8]> {
        let data = region.get(..len)?;
        let stored = region.get(len..len + 2)?;
        let crc = CRC_CALCULATOR.checksum(data);
        if crc.to_be_bytes() == stored {
            Some(data)
        } else {
            None
        }
    }

    fn read_slot(frame: &[u8], offset: usize) -> Option<[u8; SLOT_LEN]> {
        let region = frame.get(offset..)?;
        let data = Self::read_checked(region, SLOT_LEN)?;
        let mut out = [0u8; SLOT_LEN];
        out.copy_from_slice(data);
        Some(out)
    }
}

impl FrameCodec for PlainCodec {
    fn encode_fich(&self, fich: &Fich, frame: &mut [u8]) {
        Self::write_checked(&fich.bytes(), &mut frame[FICH_OFFSET..]);
    }

    fn decode_fich(&self, frame: &[u8]) -> Option<Fich> {
        let region = frame.get(FICH_OFFSET..)?;
        let data = Self::read_checked(region, 4)?;
        Some(Fich::load([data[0], data[1], data[2], data[3]]))
    }

    fn write_slot_one(&self, data: &[u8; SLOT_LEN], frame: &mut [u8]) {
        Self::write_checked(data, &mut frame[Self::SLOT_ONE_OFFSET..]);
    }

    fn write_slot_two(&self, data: &[u8; SLOT_LEN], frame: &mut [u8]) {
        Self::write_checked(data, &mut frame[Self::SLOT_TWO_OFFSET..]);
    }

    fn read_slot_one(&self, frame: &[u8]) -> Option<[u8; SLOT_LEN]> {
        Self::read_slot(frame, Self::SLOT_ONE_OFFSET)
    }

    fn read_slot_two(&self, frame: &[u8]) -> Option<[u8; SLOT_LEN]> {
        Self::read_slot(frame, Self::SLOT_TWO_OFFSET)
    }
}
