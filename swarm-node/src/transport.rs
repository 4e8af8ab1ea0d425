//! UDP transport: the concrete external collaborator the core's wire
//! contract assumes (spec.md §1, §6). Best-effort broadcast to a fixed peer
//! list; no reliability, no discovery.
//!
//! Grounded on `roj-core-rs/src/transport.rs`'s `Transport` (tokio
//! `UdpSocket`, a background receive task feeding an `mpsc` channel, a
//! `broadcast` helper that sends to a peer list), adapted to carry opaque
//! byte frames instead of JSON-serialized `Message`s and to skip mDNS
//! discovery — the core assumes a fixed peer list handed in at startup
//! (spec.md §1's Non-goals exclude dynamic membership).

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Frames larger than this are truncated UDP datagrams or garbage; the
/// wire format never produces anything close to this size.
const MAX_FRAME_SIZE: usize = 1024;

/// UDP transport for swarm frames: one socket, a fixed peer list, best
/// effort send, background receive into a bounded channel.
pub struct FrameTransport {
    socket: Arc<UdpSocket>,
    peers: Vec<SocketAddr>,
    inbound_rx: mpsc::Receiver<Vec<u8>>,
}

impl FrameTransport {
    pub async fn bind(port: u16, peers: Vec<SocketAddr>) -> std::io::Result<Self> {
        let addr = format!("0.0.0.0:{}", port);
        let socket = Arc::new(UdpSocket::bind(&addr).await?);
        socket.set_broadcast(true)?;

        let (inbound_tx, inbound_rx) = mpsc::channel(256);
        let recv_socket = socket.clone();
        tokio::spawn(async move {
            let mut buf = vec![0u8; MAX_FRAME_SIZE];
            loop {
                match recv_socket.recv_from(&mut buf).await {
                    Ok((len, src)) => {
                        debug!(%src, len, "received frame");
                        if inbound_tx.send(buf[..len].to_vec()).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!(error = %e, "udp receive error"),
                }
            }
        });

        Ok(Self { socket, peers, inbound_rx })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Receive the next complete inbound frame. Cancel-safe: a dropped
    /// future loses nothing, the background task keeps draining the socket.
    pub async fn recv(&mut self) -> Option<Vec<u8>> {
        self.inbound_rx.recv().await
    }

    /// Best-effort broadcast of one frame to every configured peer
    /// (spec.md §6: "the core assumes best-effort broadcast and tolerates
    /// loss"). A failed send to one peer never blocks the others.
    pub async fn broadcast(&self, frame: &[u8]) {
        for peer in &self.peers {
            if let Err(e) = self.socket.send_to(frame, peer).await {
                warn!(%peer, error = %e, "failed to send frame");
            }
        }
    }
}
