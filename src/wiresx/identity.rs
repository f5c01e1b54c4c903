//! Station identity: everything the gateway says about itself in replies.
//!
//! Built once from configuration and read-only afterwards. Remote radios key
//! on the five-digit station id, so [`station_id`] must stay bit-exact.

use log::info;
use thiserror::Error;

use crate::validation::fixed_field;
use crate::ysf::SLOT_LEN;

pub const CALLSIGN_LEN: usize = 10;
pub const LABEL_LEN: usize = 14;
pub const STATION_ID_LEN: usize = 5;
pub const HEADER_TEMPLATE_LEN: usize = 34;

/// Network header banner; the callsign is spliced in at offset 14.
const NET_HEADER: &[u8; HEADER_TEMPLATE_LEN] = b"YSFDGATEWAY             ALL      \0";
const HEADER_CALLSIGN_OFFSET: usize = 14;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("{which} frequency must be greater than zero")]
    ZeroFrequency { which: &'static str },
}

/// Derive the five-digit station id from the gateway's display name.
///
/// Jenkins one-at-a-time over the name bytes, reduced modulo 100000. Bytes
/// are added as unsigned values; names outside ASCII are rejected by
/// `Config::validate`, since radios only ever see the ASCII form.
pub fn station_id(label: &str) -> [u8; STATION_ID_LEN] {
    let mut hash: u32 = 0;
    for b in label.bytes() {
        hash = hash.wrapping_add(u32::from(b));
        hash = hash.wrapping_add(hash << 10);
        hash ^= hash >> 6;
    }

    hash = hash.wrapping_add(hash << 3);
    hash ^= hash >> 11;
    hash = hash.wrapping_add(hash << 15);

    let digits = format!("{:05}", hash % 100_000);
    let mut out = [b'0'; STATION_ID_LEN];
    out.copy_from_slice(digits.as_bytes());
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    callsign: [u8; CALLSIGN_LEN],
    label: [u8; LABEL_LEN],
    uplink_hz: u32,
    downlink_hz: u32,
    station_id: [u8; STATION_ID_LEN],
    header: [u8; HEADER_TEMPLATE_LEN],
    csd1: [u8; SLOT_LEN],
    csd2: [u8; SLOT_LEN],
    csd3: [u8; SLOT_LEN],
}

impl Identity {
    /// `uplink_hz` is reported as the transmit frequency in DX replies and
    /// `downlink_hz` as the receive frequency the offset is measured against.
    pub fn configure(
        callsign: &str,
        label: &str,
        uplink_hz: u32,
        downlink_hz: u32,
    ) -> Result<Self, IdentityError> {
        if uplink_hz == 0 {
            return Err(IdentityError::ZeroFrequency { which: "uplink" });
        }
        if downlink_hz == 0 {
            return Err(IdentityError::ZeroFrequency { which: "downlink" });
        }

        let callsign: [u8; CALLSIGN_LEN] = fixed_field(callsign);
        let station_id = station_id(label);
        info!(
            "The ID of this gateway is {}",
            String::from_utf8_lossy(&station_id)
        );

        let mut header = *NET_HEADER;
        header[HEADER_CALLSIGN_OFFSET..HEADER_CALLSIGN_OFFSET + CALLSIGN_LEN]
            .copy_from_slice(&callsign);

        let mut csd1 = [b'*'; SLOT_LEN];
        csd1[10..].copy_from_slice(&callsign);

        let mut csd2 = [b' '; SLOT_LEN];
        csd2[..CALLSIGN_LEN].copy_from_slice(&callsign);

        let mut csd3 = [b' '; SLOT_LEN];
        csd3[..STATION_ID_LEN].copy_from_slice(&station_id);
        csd3[15..].copy_from_slice(&station_id);

        Ok(Self {
            callsign,
            label: fixed_field(label),
            uplink_hz,
            downlink_hz,
            station_id,
            header,
            csd1,
            csd2,
            csd3,
        })
    }

    pub fn callsign(&self) -> &[u8; CALLSIGN_LEN] {
        &self.callsign
    }

    pub fn label(&self) -> &[u8; LABEL_LEN] {
        &self.label
    }

    pub fn station_id(&self) -> &[u8; STATION_ID_LEN] {
        &self.station_id
    }

    pub fn uplink_hz(&self) -> u32 {
        self.uplink_hz
    }

    pub fn downlink_hz(&self) -> u32 {
        self.downlink_hz
    }

    /// Header field of every reply's network frames.
    pub fn header(&self) -> &[u8; HEADER_TEMPLATE_LEN] {
        &self.header
    }

    /// `**********` followed by the callsign.
    pub fn csd1(&self) -> &[u8; SLOT_LEN] {
        &self.csd1
    }

    /// Callsign followed by blanks.
    pub fn csd2(&self) -> &[u8; SLOT_LEN] {
        &self.csd2
    }

    /// Station id, blanks, station id.
    pub fn csd3(&self) -> &[u8; SLOT_LEN] {
        &self.csd3
    }

    /// `TTTTT.TTTTTT±OOO.OOOOOO`: transmit frequency in MHz and the offset to
    /// the receive frequency. `+` when receive is above transmit.
    pub fn frequency_field(&self) -> String {
        let tx = self.uplink_hz;
        let rx = self.downlink_hz;
        let (offset, sign) = if tx >= rx {
            (tx - rx, '-')
        } else {
            (rx - tx, '+')
        };

        format!(
            "{:05}.{:06}{}{:03}.{:06}",
            tx / 1_000_000,
            tx % 1_000_000,
            sign,
            offset / 1_000_000,
            offset % 1_000_000
        )
    }
}
