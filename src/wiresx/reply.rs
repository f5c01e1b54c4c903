//! Reply payload layouts.
//!
//! Each builder is a pure function of the station identity, the sequence
//! number and (for Connect/All) directory data. Fragmenting the payload into
//! frames is done separately by [`write_reply`](super::frames::write_reply).
//!
//! Common prefix of every reply:
//!
//! | Offset | Field | Width |
//! |---|---|---|
//! | 0 | sequence byte | 1 |
//! | 1 | response tag | 4 |
//! | 5 | station id (DX/Connect/Disconnect) | 5 |
//! | 10 | callsign | 10 |
//! | 20 | label | 14 |
//!
//! Every payload ends its content with [`END_MARKER`] followed by the 8-bit
//! checksum of all preceding bytes.

use crate::reflectors::{Reflector, COUNT_LEN, DESCRIPTION_LEN, ID_LEN, NAME_LEN};
use crate::ysf::checksum;

use super::identity::{Identity, CALLSIGN_LEN, LABEL_LEN, STATION_ID_LEN};

pub const DX_RESP: [u8; 4] = [0x5D, 0x51, 0x5F, 0x26];
pub const CONN_RESP: [u8; 4] = [0x5D, 0x41, 0x5F, 0x26];
/// Identical to [`CONN_RESP`]; radios in the field expect this exact sequence.
pub const DISC_RESP: [u8; 4] = [0x5D, 0x41, 0x5F, 0x26];
pub const ALL_RESP: [u8; 4] = [0x5D, 0x46, 0x5F, 0x26];

pub const END_MARKER: u8 = 0x03;
/// Record delimiter inside the ALL listing.
pub const RECORD_END: u8 = 0x0D;

pub const DX_REPLY_LEN: usize = 140;
pub const CONNECT_REPLY_LEN: usize = 100;
pub const DISCONNECT_REPLY_LEN: usize = 100;
pub const ALL_REPLY_MAX_LEN: usize = 1100;

/// Most records one ALL reply carries.
pub const ALL_MAX_RECORDS: usize = 20;
/// Largest advertised directory size.
pub const ALL_MAX_TOTAL: usize = 999;
pub const ALL_RECORD_LEN: usize = 50;

const SEQ_OFFSET: usize = 0;
const TAG_OFFSET: usize = 1;
const ID_OFFSET: usize = 5;
const CALLSIGN_OFFSET: usize = 10;
const LABEL_OFFSET: usize = 20;
const STATUS_OFFSET: usize = 34;

// DX
const DX_CONTENT_LEN: usize = 128;
const DX_ZEROS_OFFSET: usize = 57;
const DX_FREQUENCY_OFFSET: usize = 84;
const DX_FREQUENCY_LEN: usize = 23;

// Connect / Disconnect
const LINK_CONTENT_LEN: usize = 90;
const LINK_REFLECTOR_ID_OFFSET: usize = 36;
const LINK_REFLECTOR_NAME_OFFSET: usize = 41;
const LINK_REFLECTOR_COUNT_OFFSET: usize = 57;
const LINK_REFLECTOR_DESC_OFFSET: usize = 70;
const LINK_ZEROS_OFFSET: usize = 84;

// ALL
const ALL_KIND_OFFSET: usize = 5;
const ALL_ID_OFFSET: usize = 7;
const ALL_CALLSIGN_OFFSET: usize = 12;
const ALL_COUNTS_OFFSET: usize = 22;
const ALL_HEADER_END_OFFSET: usize = 28;
const ALL_RECORDS_OFFSET: usize = 29;

/// Coarse length class written into the FICH frame-total field.
pub fn step_code(length: usize) -> u8 {
    match length {
        l if l > 220 => 7,
        l if l > 180 => 6,
        l if l > 140 => 5,
        l if l > 100 => 4,
        l if l > 60 => 3,
        l if l > 20 => 2,
        _ => 1,
    }
}

fn put(buf: &mut [u8], offset: usize, field: &[u8]) {
    buf[offset..offset + field.len()].copy_from_slice(field);
}

/// Sequence, tag, station id, callsign, label.
fn put_station(buf: &mut [u8], identity: &Identity, seq: u8, tag: &[u8; 4]) {
    buf[SEQ_OFFSET] = seq;
    put(buf, TAG_OFFSET, tag);
    put(buf, ID_OFFSET, identity.station_id());
    put(buf, CALLSIGN_OFFSET, identity.callsign());
    put(buf, LABEL_OFFSET, identity.label());
}

/// End marker at `content_len - 1`, checksum right after it.
fn seal(buf: &mut [u8], content_len: usize) {
    buf[content_len - 1] = END_MARKER;
    buf[content_len] = checksum(&buf[..content_len]);
}

pub fn dx_reply(identity: &Identity, seq: u8) -> [u8; DX_REPLY_LEN] {
    let mut data = [0u8; DX_REPLY_LEN];
    data[..DX_CONTENT_LEN].fill(b' ');

    put_station(&mut data, identity, seq, &DX_RESP);
    put(&mut data, STATUS_OFFSET, b"12");
    put(&mut data, DX_ZEROS_OFFSET, b"000");

    let freq = identity.frequency_field();
    let freq = &freq.as_bytes()[..freq.len().min(DX_FREQUENCY_LEN)];
    put(&mut data, DX_FREQUENCY_OFFSET, freq);

    seal(&mut data, DX_CONTENT_LEN);
    data
}

pub fn connect_reply(identity: &Identity, seq: u8, reflector: &Reflector) -> [u8; CONNECT_REPLY_LEN] {
    let mut data = [0u8; CONNECT_REPLY_LEN];
    data[..LINK_CONTENT_LEN].fill(b' ');

    put_station(&mut data, identity, seq, &CONN_RESP);
    put(&mut data, STATUS_OFFSET, b"15");
    put(&mut data, LINK_REFLECTOR_ID_OFFSET, reflector.id());
    put(&mut data, LINK_REFLECTOR_NAME_OFFSET, reflector.name());
    put(&mut data, LINK_REFLECTOR_COUNT_OFFSET, reflector.count());
    put(&mut data, LINK_REFLECTOR_DESC_OFFSET, reflector.description());
    put(&mut data, LINK_ZEROS_OFFSET, b"00000");

    seal(&mut data, LINK_CONTENT_LEN);
    data
}

pub fn disconnect_reply(identity: &Identity, seq: u8) -> [u8; DISCONNECT_REPLY_LEN] {
    let mut data = [0u8; DISCONNECT_REPLY_LEN];
    data[..LINK_CONTENT_LEN].fill(b' ');

    put_station(&mut data, identity, seq, &DISC_RESP);
    put(&mut data, STATUS_OFFSET, b"12");
    put(&mut data, DX_ZEROS_OFFSET, b"000");

    seal(&mut data, LINK_CONTENT_LEN);
    data
}

/// ALL listing of `current` reflectors (first 20) out of `known` in total.
///
/// The result is zero padded to a multiple of 20 bytes.
pub fn all_reply(identity: &Identity, seq: u8, current: &[&Reflector], known: usize) -> Vec<u8> {
    let mut data = vec![0u8; ALL_REPLY_MAX_LEN];

    data[SEQ_OFFSET] = seq;
    put(&mut data, TAG_OFFSET, &ALL_RESP);
    put(&mut data, ALL_KIND_OFFSET, b"21");
    put(&mut data, ALL_ID_OFFSET, identity.station_id());
    put(&mut data, ALL_CALLSIGN_OFFSET, identity.callsign());

    let returned = current.len().min(ALL_MAX_RECORDS);
    let total = known.min(ALL_MAX_TOTAL);
    put(
        &mut data,
        ALL_COUNTS_OFFSET,
        format!("{:03}{:03}", returned, total).as_bytes(),
    );
    data[ALL_HEADER_END_OFFSET] = RECORD_END;

    let mut offset = ALL_RECORDS_OFFSET;
    for reflector in current.iter().take(returned) {
        let record = &mut data[offset..offset + ALL_RECORD_LEN];
        record[0] = b'5';
        put(record, 1, reflector.id());
        put(record, 1 + ID_LEN, reflector.name());
        put(record, 1 + ID_LEN + NAME_LEN, reflector.count());
        record[25..35].fill(b' ');
        put(record, 35, reflector.description());
        record[ALL_RECORD_LEN - 1] = RECORD_END;
        offset += ALL_RECORD_LEN;
    }

    seal(&mut data, offset + 1);

    let padded = (offset + 2).div_ceil(20) * 20;
    data.truncate(padded);
    data
}

// Field widths the record layout above depends on.
const _: () = assert!(1 + ID_LEN + NAME_LEN + COUNT_LEN == 25);
const _: () = assert!(35 + DESCRIPTION_LEN == ALL_RECORD_LEN - 1);
const _: () = assert!(LABEL_OFFSET + LABEL_LEN == STATUS_OFFSET);
const _: () = assert!(CALLSIGN_OFFSET + CALLSIGN_LEN == LABEL_OFFSET);
const _: () = assert!(ID_OFFSET + STATION_ID_LEN == CALLSIGN_OFFSET);
