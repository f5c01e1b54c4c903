//! # Network Transport
//!
//! Thin UDP plumbing between the Wires-X engine and the outside world.
//!
//! - [`Network`] - where reply frames go (the repeater link)
//! - [`UdpNetwork`] - `Network` over a shared tokio UDP socket
//! - [`UdpStatusSocket`] - the reflector directory's probe socket
//!
//! All sends are non-blocking and fire-and-forget: a frame that cannot be
//! queued by the kernel is logged and dropped, never retried. The remote
//! station recovers by repeating its request.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use log::warn;
use tokio::net::UdpSocket;

use crate::reflectors::StatusSocket;

/// Sink for complete network frames.
pub trait Network {
    fn write(&mut self, frame: &[u8]);
}

/// Collects frames in memory; handy for tests and dry runs.
impl Network for Vec<Vec<u8>> {
    fn write(&mut self, frame: &[u8]) {
        self.push(frame.to_vec());
    }
}

/// Frames to a fixed peer over a UDP socket that may be shared with a reader.
#[derive(Debug, Clone)]
pub struct UdpNetwork {
    socket: Arc<UdpSocket>,
    peer: SocketAddr,
}

impl UdpNetwork {
    pub fn new(socket: Arc<UdpSocket>, peer: SocketAddr) -> Self {
        Self { socket, peer }
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }
}

impl Network for UdpNetwork {
    fn write(&mut self, frame: &[u8]) {
        if let Err(e) = self.socket.try_send_to(frame, self.peer) {
            warn!("Dropping {} byte frame to {}: {}", frame.len(), self.peer, e);
        }
    }
}

/// Status probe socket. Must be created inside a tokio runtime.
#[derive(Debug)]
pub struct UdpStatusSocket {
    socket: UdpSocket,
}

impl UdpStatusSocket {
    pub async fn bind(addr: SocketAddr) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        Ok(Self { socket })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

impl StatusSocket for UdpStatusSocket {
    fn send_to(&mut self, buf: &[u8], target: SocketAddr) -> io::Result<()> {
        self.socket.try_send_to(buf, target).map(|_| ())
    }

    fn recv_from(&mut self, buf: &mut [u8]) -> io::Result<Option<(usize, SocketAddr)>> {
        match self.socket.try_recv_from(buf) {
            Ok(received) => Ok(Some(received)),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e),
        }
    }
}
