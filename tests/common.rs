//! Test utilities & fixtures shared by the integration tests.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::net::SocketAddr;

use wiresx::reflectors::StatusSocket;
use wiresx::validation::fixed_field;
use wiresx::ysf::{
    add_sync, Fich, FrameCodec, FrameIndicator, PlainCodec, NETWORK_FRAME_LEN,
    NETWORK_HEADER_LEN, SLOT_LEN,
};

/// Status socket that records probes and replays queued datagrams.
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingSocket {
    pub sent: Vec<(Vec<u8>, SocketAddr)>,
    pub inbox: VecDeque<(Vec<u8>, SocketAddr)>,
}

impl StatusSocket for RecordingSocket {
    fn send_to(&mut self, buf: &[u8], target: SocketAddr) -> io::Result<()> {
        self.sent.push((buf.to_vec(), target));
        Ok(())
    }

    fn recv_from(&mut self, buf: &mut [u8]) -> io::Result<Option<(usize, SocketAddr)>> {
        Ok(self.inbox.pop_front().map(|(data, from)| {
            buf[..data.len()].copy_from_slice(&data);
            (data.len(), from)
        }))
    }
}

#[allow(dead_code)]
pub fn loopback(port: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], port))
}

/// A 42-byte `YSFS` status reply as a reflector would send it.
#[allow(dead_code)]
pub fn status_reply(id: &str, count: &str) -> Vec<u8> {
    let mut reply = b"YSFS".to_vec();
    reply.extend_from_slice(&fixed_field::<5>(id));
    reply.extend_from_slice(&fixed_field::<16>("Reflector"));
    reply.extend_from_slice(&fixed_field::<14>("Status"));
    reply.extend_from_slice(&fixed_field::<3>(count));
    reply
}

/// Write a hosts list to a temp file.
#[allow(dead_code)]
pub fn hosts_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    file.write_all(contents.as_bytes()).expect("write hosts");
    file
}

/// Second DataFR block of a request: command tag at 1, argument at 5.
#[allow(dead_code)]
pub fn command_block(tag: [u8; 3], argument: &[u8]) -> [u8; SLOT_LEN] {
    let mut block = [b' '; SLOT_LEN];
    block[0] = 0x00;
    block[1..4].copy_from_slice(&tag);
    block[5..5 + argument.len()].copy_from_slice(argument);
    block
}

/// Complete network frame as the repeater sends it.
#[allow(dead_code)]
pub fn network_frame(
    fi: FrameIndicator,
    fn_: u8,
    slot_one: Option<&[u8; SLOT_LEN]>,
    slot_two: Option<&[u8; SLOT_LEN]>,
) -> Vec<u8> {
    let mut buf = vec![0u8; NETWORK_FRAME_LEN];
    buf[..4].copy_from_slice(b"YSFD");
    buf[4..14].copy_from_slice(&fixed_field::<10>("M0ABC"));

    let frame = &mut buf[NETWORK_HEADER_LEN..];
    add_sync(frame);
    let mut fich = Fich::default();
    fich.set_frame_indicator(fi);
    fich.set_frame_number(fn_);
    PlainCodec.encode_fich(&fich, frame);
    if let Some(block) = slot_one {
        PlainCodec.write_slot_one(block, frame);
    }
    if let Some(block) = slot_two {
        PlainCodec.write_slot_two(block, frame);
    }
    buf
}

/// The header, FN 0 and FN 1 frames a radio sends for one command.
#[allow(dead_code)]
pub fn request_frames(tag: [u8; 3], argument: &[u8]) -> Vec<Vec<u8>> {
    let source = b"**********M0ABC     ";
    vec![
        network_frame(FrameIndicator::Header, 0, Some(source), None),
        network_frame(FrameIndicator::Communications, 0, Some(source), None),
        network_frame(
            FrameIndicator::Communications,
            1,
            None,
            Some(&command_block(tag, argument)),
        ),
    ]
}

#[allow(dead_code)]
pub fn fich_of(frame: &[u8]) -> Fich {
    PlainCodec
        .decode_fich(&frame[NETWORK_HEADER_LEN..])
        .expect("valid fich")
}

/// Reassemble the reply payload carried by the Communications frames of one
/// transmission. The result is zero padded to a whole slot.
#[allow(dead_code)]
pub fn reply_payload(frames: &[Vec<u8>]) -> Vec<u8> {
    let mut payload = Vec::new();
    for frame in frames {
        let fich = fich_of(frame);
        if fich.frame_indicator() != FrameIndicator::Communications {
            continue;
        }
        let ysf = &frame[NETWORK_HEADER_LEN..];
        match fich.frame_number() {
            0 => {}
            1 => payload.extend_from_slice(&PlainCodec.read_slot_two(ysf).expect("slot two")),
            _ => {
                payload.extend_from_slice(&PlainCodec.read_slot_one(ysf).expect("slot one"));
                payload.extend_from_slice(&PlainCodec.read_slot_two(ysf).expect("slot two"));
            }
        }
    }
    payload
}

/// Number of complete transmissions (header frames) in `frames`.
#[allow(dead_code)]
pub fn transmissions(frames: &[Vec<u8>]) -> usize {
    frames
        .iter()
        .filter(|f| fich_of(f).frame_indicator() == FrameIndicator::Header)
        .count()
}
