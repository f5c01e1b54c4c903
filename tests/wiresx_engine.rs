use wiresx::reflectors::{DirectorySettings, Reflectors};
use wiresx::wiresx::{
    Identity, Outcome, PendingReply, WiresX, ALL_REQ, CONN_REQ, DISC_REQ, DX_REQ,
};
use wiresx::ysf::{checksum, FrameIndicator, PlainCodec, NETWORK_HEADER_LEN};
mod common;
use common::{fich_of, loopback, reply_payload, status_reply, transmissions, RecordingSocket};

type Engine = WiresX<Vec<Vec<u8>>, RecordingSocket, PlainCodec>;

fn engine_with_hosts(hosts: &str) -> Engine {
    let identity =
        Identity::configure("G4KLX", "TestRepeater12", 438_000_000, 430_000_000).expect("identity");
    let settings = DirectorySettings {
        probe_interval_ms: 60_000,
        liveness_ms: 600_000,
    };
    let mut reflectors = Reflectors::new("unused", RecordingSocket::default(), settings);
    reflectors.load_from_str(hosts);
    WiresX::new(identity, reflectors, Vec::new(), PlainCodec)
}

fn engine() -> Engine {
    engine_with_hosts(
        "12345;Alpha;First reflector;127.0.0.1;42001\n\
         67890;Bravo;Second;127.0.0.1;42002\n",
    )
}

/// Push the radio's request frames through the engine; returns the last outcome.
fn request(engine: &mut Engine, tag: [u8; 3], argument: &[u8]) -> Outcome {
    let mut outcome = Outcome::None;
    for frame in common::request_frames(tag, argument) {
        let ysf = &frame[NETWORK_HEADER_LEN..];
        let fich = fich_of(&frame);
        outcome = engine.process(ysf, fich.frame_indicator(), fich.data_type(), fich.frame_number());
    }
    outcome
}

fn mark_alive(engine: &mut Engine, id: &str, port: u16, count: &str) {
    engine
        .reflectors_mut()
        .socket_mut()
        .inbox
        .push_back((status_reply(id, count), loopback(port)));
}

#[test]
fn dx_request_gets_station_reply() {
    let mut e = engine();
    assert_eq!(request(&mut e, DX_REQ, &[]), Outcome::Handled);
    e.clock(1000);

    let frames = e.network();
    assert_eq!(frames.len(), 7);
    assert_eq!(&frames[0][..34], b"YSFDGATEWAY   G4KLX     ALL      \0");
    assert_eq!(fich_of(&frames[0]).frame_indicator(), FrameIndicator::Header);
    assert_eq!(fich_of(&frames[6]).frame_indicator(), FrameIndicator::Terminator);

    let payload = reply_payload(frames);
    assert_eq!(payload.len(), 140);
    assert_eq!(payload[0], 0);
    assert_eq!(&payload[1..5], &[0x5D, 0x51, 0x5F, 0x26]);
    assert_eq!(&payload[5..10], b"48248");
    assert_eq!(&payload[10..20], b"G4KLX     ");
    assert_eq!(&payload[20..34], b"TestRepeater12");
    assert_eq!(&payload[34..36], b"12");
    assert_eq!(&payload[57..60], b"000");
    assert_eq!(&payload[84..107], b"00438.000000-008.000000");
    assert_eq!(payload[127], 0x03);
    assert_eq!(payload[128], checksum(&payload[..128]));
}

#[test]
fn no_reply_before_delay_elapses() {
    let mut e = engine();
    request(&mut e, DX_REQ, &[]);
    e.clock(999);
    assert!(e.network().is_empty());
    assert_eq!(e.pending(), PendingReply::Dx);
    e.clock(1);
    assert_eq!(transmissions(e.network()), 1);
}

#[test]
fn repeated_request_fragments_produce_one_reply() {
    let mut e = engine();
    for _ in 0..5 {
        request(&mut e, DX_REQ, &[]);
        e.clock(200);
    }
    e.clock(1000);
    e.clock(5000);
    assert_eq!(transmissions(e.network()), 1);
}

#[test]
fn last_command_wins() {
    let mut e = engine();
    request(&mut e, DX_REQ, &[]);
    e.clock(500);
    request(&mut e, ALL_REQ, &[]);
    e.clock(1000);

    assert_eq!(transmissions(e.network()), 1);
    let payload = reply_payload(e.network());
    assert_eq!(&payload[1..5], &[0x5D, 0x46, 0x5F, 0x26]);
}

#[test]
fn all_with_no_live_reflectors_lists_nothing() {
    let mut e = engine_with_hosts("");
    request(&mut e, ALL_REQ, &[]);
    e.clock(1000);

    // header, FN 0..2, terminator
    assert_eq!(e.network().len(), 5);
    let payload = reply_payload(e.network());
    assert_eq!(&payload[5..7], b"21");
    assert_eq!(&payload[7..12], b"48248");
    assert_eq!(&payload[12..22], b"G4KLX     ");
    assert_eq!(&payload[22..28], b"000000");
    assert_eq!(payload[28], 0x0D);
    assert_eq!(payload[29], 0x03);
    assert_eq!(payload[30], checksum(&payload[..30]));
}

#[test]
fn all_lists_only_live_reflectors_against_known_total() {
    let mut e = engine();
    mark_alive(&mut e, "67890", 42002, "004");
    e.clock(10);

    request(&mut e, ALL_REQ, &[]);
    e.clock(1000);

    let payload = reply_payload(e.network());
    assert_eq!(&payload[22..28], b"001002");
    let record = &payload[29..79];
    assert_eq!(record[0], b'5');
    assert_eq!(&record[1..6], b"67890");
    assert_eq!(&record[6..22], b"Bravo           ");
    assert_eq!(&record[22..25], b"004");
    assert_eq!(&record[25..35], b"          ");
    assert_eq!(&record[35..49], b"Second        ");
    assert_eq!(record[49], 0x0D);
    assert_eq!(payload[79], 0x03);
    assert_eq!(payload[80], checksum(&payload[..80]));
}

#[test]
fn all_reply_sees_status_received_on_the_same_tick() {
    let mut e = engine_with_hosts("67890;Bravo;Second;127.0.0.1;42002\n");
    request(&mut e, ALL_REQ, &[]);
    mark_alive(&mut e, "67890", 42002, "003");
    assert!(e.reflectors().current().is_empty());

    e.clock(1000);

    let payload = reply_payload(e.network());
    assert_eq!(&payload[22..28], b"001001");
    assert_eq!(&payload[30..35], b"67890");
    assert_eq!(&payload[51..54], b"003");
}

#[test]
fn all_caps_records_and_total() {
    let hosts: String = (0..1005)
        .map(|i| format!("{:05};Ref{};Desc;127.0.0.1;{}\n", i, i, 20000 + i))
        .collect();
    let mut e = engine_with_hosts(&hosts);
    assert_eq!(e.reflectors().len(), 1005);
    for i in 0..25u16 {
        mark_alive(&mut e, &format!("{:05}", i), 20000 + i, "001");
    }
    e.clock(10);
    assert_eq!(e.reflectors().current().len(), 25);

    request(&mut e, ALL_REQ, &[]);
    e.clock(1000);

    let payload = reply_payload(e.network());
    assert_eq!(&payload[22..28], b"020999");
    // 29 header bytes, 20 records, end marker, checksum, zero padding
    assert_eq!(payload[1029], 0x03);
    assert_eq!(payload[1030], checksum(&payload[..1030]));
    assert!(payload[1031..].iter().all(|b| *b == 0));
}

#[test]
fn connect_to_known_reflector() {
    let mut e = engine();
    mark_alive(&mut e, "12345", 42001, "017");
    e.clock(10);

    assert_eq!(request(&mut e, CONN_REQ, b"12345"), Outcome::Connect);
    assert_eq!(e.selected_reflector().expect("selected").id(), b"12345");
    e.clock(1000);

    let payload = reply_payload(e.network());
    assert_eq!(&payload[1..5], &[0x5D, 0x41, 0x5F, 0x26]);
    assert_eq!(&payload[5..10], b"48248");
    assert_eq!(&payload[34..36], b"15");
    assert_eq!(&payload[36..41], b"12345");
    assert_eq!(&payload[41..57], b"Alpha           ");
    assert_eq!(&payload[57..60], b"017");
    assert_eq!(&payload[70..84], b"First reflecto");
    assert_eq!(&payload[84..89], b"00000");
    assert_eq!(payload[89], 0x03);
    assert_eq!(payload[90], checksum(&payload[..90]));
}

#[test]
fn connect_to_offline_reflector_is_still_accepted() {
    let mut e = engine();
    assert!(e.reflectors().current().is_empty());
    assert_eq!(request(&mut e, CONN_REQ, b"67890"), Outcome::Connect);
    assert_eq!(e.selected_reflector().expect("selected").id(), b"67890");
}

#[test]
fn connect_to_unknown_reflector_changes_nothing() {
    let mut e = engine();
    request(&mut e, CONN_REQ, b"12345");
    e.clock(1000);
    let sent = e.network().len();

    assert_eq!(request(&mut e, CONN_REQ, b"00001"), Outcome::None);
    assert_eq!(e.selected_reflector().expect("selected").id(), b"12345");
    assert_eq!(e.pending(), PendingReply::None);
    e.clock(5000);
    assert_eq!(e.network().len(), sent);
}

#[test]
fn disconnect_is_reported_before_the_reply() {
    let mut e = engine();
    assert_eq!(request(&mut e, DISC_REQ, &[]), Outcome::Disconnect);
    assert!(e.network().is_empty());

    e.clock(1000);
    let payload = reply_payload(e.network());
    assert_eq!(payload.len(), 100);
    assert_eq!(&payload[1..5], &[0x5D, 0x41, 0x5F, 0x26]);
    assert_eq!(&payload[34..36], b"12");
    assert_eq!(&payload[57..60], b"000");
    assert_eq!(payload[89], 0x03);
}

#[test]
fn sequence_number_advances_per_reply() {
    let mut e = engine();
    request(&mut e, DX_REQ, &[]);
    e.clock(1000);
    let first = reply_payload(e.network());
    e.network_mut().clear();

    request(&mut e, DX_REQ, &[]);
    e.clock(1000);
    let second = reply_payload(e.network());

    assert_eq!(first[0], 0);
    assert_eq!(second[0], 1);
    assert_eq!(e.sequence(), 2);
}

#[test]
fn source_descriptor_is_captured_from_header() {
    let mut e = engine();
    request(&mut e, DX_REQ, &[]);
    assert_eq!(e.source(), b"**********M0ABC     ");
}
