use std::collections::HashMap;
use std::fmt;

use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::warn;

use crate::message::PeerMessage;

/// Identifies one live peer connection.
///
/// Ids name connections, not network identities: re-dialing the same address
/// produces a fresh id alongside the old one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerId(u64);

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peer-{}", self.0)
    }
}

/// Events flowing from connection workers and dial tasks into the node loop.
#[derive(Debug)]
pub enum PeerEvent {
    /// An outbound dial completed; the stream is ready to be registered.
    Opened { stream: TcpStream, addr: String },
    /// A decoded message from a connected peer.
    Message { peer: PeerId, message: PeerMessage },
    /// The peer's connection closed or failed; its worker has ended.
    Disconnected(PeerId),
}

/// The node-side half of one peer connection.
#[derive(Debug)]
struct PeerHandle {
    addr: String,
    outbound: mpsc::Sender<PeerMessage>,
}

/// All currently connected peers.
///
/// Iteration must tolerate membership changing underneath it: a peer can die
/// mid-broadcast, in which case it is dropped from the set rather than
/// aborting the broadcast.
#[derive(Debug, Default)]
pub struct PeerSet {
    peers: HashMap<PeerId, PeerHandle>,
    next_id: u64,
}

impl PeerSet {
    /// Register a connection and hand out its id.
    pub fn insert(
        &mut self,
        addr: impl Into<String>,
        outbound: mpsc::Sender<PeerMessage>,
    ) -> PeerId {
        let id = PeerId(self.next_id);
        self.next_id += 1;
        self.peers.insert(
            id,
            PeerHandle {
                addr: addr.into(),
                outbound,
            },
        );
        id
    }

    /// Drop a connection, returning its address if it was still registered.
    pub fn remove(&mut self, id: PeerId) -> Option<String> {
        self.peers.remove(&id).map(|handle| handle.addr)
    }

    /// Queue `message` for one peer. Returns false if the peer is gone or its
    /// outbound queue cannot take the message.
    pub fn send(&self, id: PeerId, message: PeerMessage) -> bool {
        match self.peers.get(&id) {
            Some(handle) => handle.outbound.try_send(message).is_ok(),
            None => false,
        }
    }

    /// Queue `message` for every connected peer and report how many were
    /// reached. Peers whose worker has gone away are dropped from the set.
    pub fn broadcast(&mut self, message: &PeerMessage) -> usize {
        let mut reached = 0;
        let mut dead = Vec::new();
        for (id, handle) in &self.peers {
            match handle.outbound.try_send(message.clone()) {
                Ok(()) => reached += 1,
                Err(mpsc::error::TrySendError::Closed(_)) => dead.push(*id),
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!(peer = %id, addr = %handle.addr, "Peer outbound queue full, dropping message");
                }
            }
        }
        for id in dead {
            if let Some(addr) = self.remove(id) {
                warn!(peer = %id, %addr, "Peer vanished during broadcast");
            }
        }
        reached
    }

    /// Addresses of all connections, duplicates included.
    pub fn addresses(&self) -> Vec<String> {
        self.peers
            .values()
            .map(|handle| handle.addr.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}
