//! # Reflector Directory
//!
//! Owns the list of known reflectors (loaded once from the hosts list) and the
//! *current* subset: reflectors that answered a status probe recently enough.
//!
//! ## Known vs. current
//!
//! - A Connect request may name any known reflector, reachable or not.
//! - The ALL listing only advertises current reflectors.
//!
//! Entries are never removed after a load; only their membership in the
//! current subset changes.
//!
//! ## Probing
//!
//! Every probe cycle a 4-byte `YSFS` status request goes to each entry. A
//! reflector answers from the same address with:
//!
//! ```text
//! 0    4       9                25            39    42
//! YSFS <id:5>  <name:16>        <desc:14>     <cnt:3>
//! ```
//!
//! A reply refreshes the entry's connected-station count and restarts its
//! liveness timer.

pub mod hosts;

use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};

use log::{debug, info, trace, warn};
use thiserror::Error;

use crate::validation::{field_str, fixed_field};
use crate::ysf::Timer;

pub use hosts::{parse_hosts, HostEntry};

pub const ID_LEN: usize = 5;
pub const NAME_LEN: usize = 16;
pub const DESCRIPTION_LEN: usize = 14;
pub const COUNT_LEN: usize = 3;

/// Status request sent to every reflector each probe cycle.
pub const STATUS_PROBE: &[u8; 4] = b"YSFS";
/// Minimum length of a status reply.
pub const STATUS_REPLY_LEN: usize = 42;
const STATUS_COUNT_OFFSET: usize = 39;

/// Non-blocking datagram socket used for status probes.
pub trait StatusSocket {
    fn send_to(&mut self, buf: &[u8], target: SocketAddr) -> io::Result<()>;

    /// Returns `Ok(None)` when nothing is waiting.
    fn recv_from(&mut self, buf: &mut [u8]) -> io::Result<Option<(usize, SocketAddr)>>;
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("failed to read hosts file {path}: {source}")]
    HostsFile {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Timing knobs for probing and liveness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectorySettings {
    pub probe_interval_ms: u64,
    pub liveness_ms: u64,
}

impl Default for DirectorySettings {
    fn default() -> Self {
        Self {
            probe_interval_ms: 30_000,
            liveness_ms: 700_000,
        }
    }
}

/// One directory entry. Text fields are fixed width and space padded.
#[derive(Debug, Clone)]
pub struct Reflector {
    id: [u8; ID_LEN],
    name: [u8; NAME_LEN],
    description: [u8; DESCRIPTION_LEN],
    count: [u8; COUNT_LEN],
    address: SocketAddr,
    liveness: Timer,
    refreshed: u64,
}

impl Reflector {
    pub fn new(id: &str, name: &str, description: &str, address: SocketAddr, liveness_ms: u64) -> Self {
        Self {
            id: fixed_field(id),
            name: fixed_field(name),
            description: fixed_field(description),
            count: *b"000",
            address,
            liveness: Timer::new(liveness_ms),
            refreshed: 0,
        }
    }

    pub fn id(&self) -> &[u8; ID_LEN] {
        &self.id
    }

    pub fn name(&self) -> &[u8; NAME_LEN] {
        &self.name
    }

    pub fn description(&self) -> &[u8; DESCRIPTION_LEN] {
        &self.description
    }

    pub fn count(&self) -> &[u8; COUNT_LEN] {
        &self.count
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    pub fn id_str(&self) -> String {
        field_str(&self.id)
    }

    pub fn name_str(&self) -> String {
        field_str(&self.name)
    }

    /// True while the liveness timer runs and has not lapsed.
    pub fn is_alive(&self) -> bool {
        self.liveness.is_running() && !self.liveness.has_expired()
    }
}

pub struct Reflectors<S> {
    hosts_file: PathBuf,
    socket: S,
    settings: DirectorySettings,
    reflectors: Vec<Reflector>,
    current: Vec<usize>,
    probe_timer: Timer,
    refresh_seq: u64,
}

impl<S: StatusSocket> Reflectors<S> {
    pub fn new<P: AsRef<Path>>(hosts_file: P, socket: S, settings: DirectorySettings) -> Self {
        Self {
            hosts_file: hosts_file.as_ref().to_path_buf(),
            socket,
            settings,
            reflectors: Vec::new(),
            current: Vec::new(),
            probe_timer: Timer::new(settings.probe_interval_ms),
            refresh_seq: 0,
        }
    }

    /// Load the configured hosts file, replacing any previous list.
    pub fn load(&mut self) -> Result<(), DirectoryError> {
        let text = std::fs::read_to_string(&self.hosts_file).map_err(|source| {
            DirectoryError::HostsFile {
                path: self.hosts_file.display().to_string(),
                source,
            }
        })?;

        let loaded = self.load_from_str(&text);
        info!(
            "Loaded {} reflectors from {}",
            loaded,
            self.hosts_file.display()
        );
        Ok(())
    }

    /// Parse and resolve an in-memory hosts list. Returns the number of entries
    /// loaded; hosts that do not resolve are skipped.
    pub fn load_from_str(&mut self, text: &str) -> usize {
        let mut reflectors = Vec::new();
        for entry in parse_hosts(text) {
            let address = match resolve(&entry.host, entry.port) {
                Some(a) => a,
                None => {
                    warn!(
                        "No IPv4 address for {} (reflector {}); skipping",
                        entry.host, entry.id
                    );
                    continue;
                }
            };
            reflectors.push(Reflector::new(
                &entry.id,
                &entry.name,
                &entry.description,
                address,
                self.settings.liveness_ms,
            ));
        }

        if reflectors.is_empty() {
            warn!("Reflector directory is empty");
        }

        self.reflectors = reflectors;
        self.current.clear();
        self.probe_timer.start();
        self.reflectors.len()
    }

    /// Exact lookup by identifier; shorter identifiers are space padded.
    pub fn find(&self, id: &str) -> Option<&Reflector> {
        let key: [u8; ID_LEN] = fixed_field(id);
        self.reflectors.iter().find(|r| r.id == key)
    }

    /// Lookup by the raw identifier field as it arrives in a request.
    pub fn find_id(&self, id: &[u8; ID_LEN]) -> Option<&Reflector> {
        self.reflectors.iter().find(|r| &r.id == id)
    }

    /// Reachable reflectors, most recently refreshed first.
    pub fn current(&self) -> Vec<&Reflector> {
        self.current.iter().map(|i| &self.reflectors[*i]).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reflector> {
        self.reflectors.iter()
    }

    pub fn len(&self) -> usize {
        self.reflectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reflectors.is_empty()
    }

    pub fn socket(&self) -> &S {
        &self.socket
    }

    pub fn socket_mut(&mut self) -> &mut S {
        &mut self.socket
    }

    /// Advance liveness and probe timers, handle status replies, then rebuild
    /// the current subset.
    pub fn clock(&mut self, ms: u64) {
        for reflector in self.reflectors.iter_mut() {
            reflector.liveness.clock(ms);
        }

        self.probe_timer.clock(ms);
        if self.probe_timer.has_expired() {
            self.probe_all();
            self.probe_timer.start();
        }

        self.receive_replies();
        self.rebuild_current();
    }

    fn probe_all(&mut self) {
        trace!("Probing {} reflectors", self.reflectors.len());
        for reflector in &self.reflectors {
            if let Err(e) = self.socket.send_to(STATUS_PROBE, reflector.address) {
                debug!(
                    "Status probe to {} ({}) failed: {}",
                    reflector.id_str(),
                    reflector.address,
                    e
                );
            }
        }
    }

    fn receive_replies(&mut self) {
        let mut buf = [0u8; 200];
        loop {
            match self.socket.recv_from(&mut buf) {
                Ok(Some((len, from))) => self.handle_reply(&buf[..len], from),
                Ok(None) => break,
                Err(e) => {
                    warn!("Error reading status socket: {}", e);
                    break;
                }
            }
        }
    }

    fn handle_reply(&mut self, data: &[u8], from: SocketAddr) {
        if data.len() < STATUS_REPLY_LEN || &data[..STATUS_PROBE.len()] != STATUS_PROBE {
            trace!("Ignoring {} byte datagram from {}", data.len(), from);
            return;
        }

        let mut matched = false;
        for reflector in self.reflectors.iter_mut().filter(|r| r.address == from) {
            self.refresh_seq += 1;
            reflector
                .count
                .copy_from_slice(&data[STATUS_COUNT_OFFSET..STATUS_COUNT_OFFSET + COUNT_LEN]);
            reflector.liveness.start();
            reflector.refreshed = self.refresh_seq;
            matched = true;
        }

        if !matched {
            trace!("Status reply from unknown reflector {}", from);
        }
    }

    fn rebuild_current(&mut self) {
        let mut current: Vec<usize> = self
            .reflectors
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_alive())
            .map(|(i, _)| i)
            .collect();
        current.sort_by(|a, b| self.reflectors[*b].refreshed.cmp(&self.reflectors[*a].refreshed));
        self.current = current;
    }
}

/// First IPv4 address of `host`; the status socket is IPv4 only.
fn resolve(host: &str, port: u16) -> Option<SocketAddr> {
    (host, port)
        .to_socket_addrs()
        .ok()?
        .find(SocketAddr::is_ipv4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct MockSocket {
        sent: Vec<(Vec<u8>, SocketAddr)>,
        inbox: VecDeque<(Vec<u8>, SocketAddr)>,
    }

    impl StatusSocket for MockSocket {
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

    fn status_reply(id: &str, count: &str) -> Vec<u8> {
        let mut reply = b"YSFS".to_vec();
        reply.extend_from_slice(&fixed_field::<5>(id));
        reply.extend_from_slice(&fixed_field::<16>("Name"));
        reply.extend_from_slice(&fixed_field::<14>("Desc"));
        reply.extend_from_slice(count.as_bytes());
        reply
    }

    fn directory() -> Reflectors<MockSocket> {
        let settings = DirectorySettings {
            probe_interval_ms: 100,
            liveness_ms: 1000,
        };
        let mut dir = Reflectors::new("unused", MockSocket::default(), settings);
        dir.load_from_str(
            "11111;One;First;127.0.0.1;42001\n22222;Two;Second;127.0.0.1;42002\n",
        );
        dir
    }

    fn addr(port: u16) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], port))
    }

    #[test]
    fn find_pads_short_identifiers() {
        let mut dir = directory();
        dir.load_from_str("123;Short;Padded id;127.0.0.1;42003");
        assert!(dir.find("123").is_some());
        assert!(dir.find("123  ").is_some());
        assert!(dir.find("1234").is_none());
    }

    #[test]
    fn ipv6_only_hosts_are_skipped() {
        let mut dir = directory();
        let loaded = dir.load_from_str(
            "33333;Six;Literal v6;::1;42003\n44444;Four;Literal v4;127.0.0.1;42004\n",
        );
        assert_eq!(loaded, 1);
        assert!(dir.find("33333").is_none());
        assert!(dir.iter().all(|r| r.address().is_ipv4()));
    }

    #[test]
    fn probe_cycle_sends_one_probe_per_entry() {
        let mut dir = directory();
        dir.clock(50);
        assert!(dir.socket().sent.is_empty());
        dir.clock(50);
        assert_eq!(dir.socket().sent.len(), 2);
        assert!(dir.socket().sent.iter().all(|(p, _)| p == b"YSFS"));
    }

    #[test]
    fn current_is_empty_until_a_reply_arrives() {
        let mut dir = directory();
        dir.clock(200);
        assert!(dir.current().is_empty());
    }

    #[test]
    fn reply_refreshes_count_and_liveness() {
        let mut dir = directory();
        dir.socket_mut()
            .inbox
            .push_back((status_reply("22222", "007"), addr(42002)));
        dir.clock(10);

        let current = dir.current();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].id(), b"22222");
        assert_eq!(current[0].count(), b"007");
    }

    #[test]
    fn lapsed_entries_leave_current_but_stay_known() {
        let mut dir = directory();
        dir.socket_mut()
            .inbox
            .push_back((status_reply("11111", "001"), addr(42001)));
        dir.clock(10);
        assert_eq!(dir.current().len(), 1);

        dir.clock(1000);
        assert!(dir.current().is_empty());
        assert_eq!(dir.len(), 2);
        assert!(dir.find("11111").is_some());
    }

    #[test]
    fn most_recently_refreshed_comes_first() {
        let mut dir = directory();
        dir.socket_mut()
            .inbox
            .push_back((status_reply("11111", "001"), addr(42001)));
        dir.clock(10);
        dir.socket_mut()
            .inbox
            .push_back((status_reply("22222", "002"), addr(42002)));
        dir.clock(10);

        let ids: Vec<_> = dir.current().iter().map(|r| r.id_str()).collect();
        assert_eq!(ids, vec!["22222", "11111"]);
    }

    #[test]
    fn short_or_foreign_datagrams_are_ignored() {
        let mut dir = directory();
        dir.socket_mut().inbox.push_back((b"YSFS".to_vec(), addr(42001)));
        dir.socket_mut()
            .inbox
            .push_back((status_reply("11111", "001"), addr(9)));
        dir.clock(10);
        assert!(dir.current().is_empty());
    }

    #[test]
    fn missing_hosts_file_is_an_error() {
        let mut dir = Reflectors::new(
            "/nonexistent/hosts.txt",
            MockSocket::default(),
            DirectorySettings::default(),
        );
        assert!(matches!(dir.load(), Err(DirectoryError::HostsFile { .. })));
    }
}
