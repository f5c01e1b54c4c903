//! Fragmentation of a reply payload into Header, Communications and
//! Terminator frames.
//!
//! Communications frames walk the payload 20 bytes per slot:
//!
//! - FN 0 of each block carries the CSD1/CSD2 descriptors and no payload
//! - FN 1 carries CSD3 and the next 20 payload bytes
//! - FN 2..7 carry 40 payload bytes
//!
//! FN wraps after 7 and the block number advances.

use crate::network::Network;
use crate::ysf::{
    add_sync, FrameCodec, FrameIndicator, Fich, NETWORK_FRAME_LEN, NETWORK_HEADER_LEN, SLOT_LEN,
};

use super::identity::{Identity, HEADER_TEMPLATE_LEN};
use super::reply::step_code;

/// Byte after the header template: 0 for data frames, 1 on the terminator.
const END_FLAG_OFFSET: usize = HEADER_TEMPLATE_LEN;
const BLOCK_TOTAL_DIVISOR: usize = 260;
const FRAMES_PER_BLOCK: u8 = 8;

/// Next 20 payload bytes from `offset`, zero filled past the end.
fn chunk(data: &[u8], offset: usize) -> [u8; SLOT_LEN] {
    let mut out = [0u8; SLOT_LEN];
    if offset < data.len() {
        let end = (offset + SLOT_LEN).min(data.len());
        out[..end - offset].copy_from_slice(&data[offset..end]);
    }
    out
}

/// Emit `data` as one complete reply transmission. Returns the number of
/// frames written.
pub fn write_reply<C, N>(codec: &C, network: &mut N, identity: &Identity, data: &[u8]) -> usize
where
    C: FrameCodec,
    N: Network,
{
    let length = data.len();
    let mut ft = step_code(length);
    let bt = (length / BLOCK_TOTAL_DIVISOR) as u8;
    let mut written = 0;

    let mut buffer = [0u8; NETWORK_FRAME_LEN];
    buffer[..HEADER_TEMPLATE_LEN].copy_from_slice(identity.header());
    buffer[END_FLAG_OFFSET] = 0x00;

    add_sync(&mut buffer[NETWORK_HEADER_LEN..]);

    let mut fich = Fich::default();
    fich.set_frame_indicator(FrameIndicator::Header);
    fich.set_block_total(bt);
    fich.set_frame_total(ft);
    {
        let frame = &mut buffer[NETWORK_HEADER_LEN..];
        codec.encode_fich(&fich, frame);
        codec.write_slot_one(identity.csd1(), frame);
        codec.write_slot_two(identity.csd2(), frame);
    }
    network.write(&buffer);
    written += 1;

    fich.set_frame_indicator(FrameIndicator::Communications);

    let mut fn_: u8 = 0;
    let mut bn: u8 = 0;
    let mut offset = 0;
    while offset < length {
        let frame = &mut buffer[NETWORK_HEADER_LEN..];
        match fn_ {
            0 => {
                ft = step_code(length - offset);
                codec.write_slot_one(identity.csd1(), frame);
                codec.write_slot_two(identity.csd2(), frame);
            }
            1 => {
                codec.write_slot_one(identity.csd3(), frame);
                codec.write_slot_two(&chunk(data, offset), frame);
                offset += SLOT_LEN;
            }
            _ => {
                codec.write_slot_one(&chunk(data, offset), frame);
                offset += SLOT_LEN;
                codec.write_slot_two(&chunk(data, offset), frame);
                offset += SLOT_LEN;
            }
        }

        fich.set_frame_total(ft);
        fich.set_frame_number(fn_);
        fich.set_block_total(bt);
        fich.set_block_number(bn);
        codec.encode_fich(&fich, frame);

        network.write(&buffer);
        written += 1;

        fn_ += 1;
        if fn_ >= FRAMES_PER_BLOCK {
            fn_ = 0;
            bn = bn.wrapping_add(1);
        }
    }

    buffer[END_FLAG_OFFSET] = 0x01;
    fich.set_frame_indicator(FrameIndicator::Terminator);
    fich.set_frame_number(fn_);
    fich.set_block_number(bn);
    {
        let frame = &mut buffer[NETWORK_HEADER_LEN..];
        codec.encode_fich(&fich, frame);
        codec.write_slot_one(identity.csd1(), frame);
        codec.write_slot_two(identity.csd2(), frame);
    }
    network.write(&buffer);
    written += 1;

    written
}
