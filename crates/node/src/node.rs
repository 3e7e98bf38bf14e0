use std::net::SocketAddr;

use chain::{reconcile, ChainStore, Reconciliation};
use chain_types::Block;
use network::{connect, spawn_peer, NetworkError, PeerEvent, PeerId, PeerMessage, PeerSet};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::NodeConfig;
use crate::handle::{Command, NodeHandle};

/// A ledger node: one chain, one peer set, one event loop.
///
/// The loop is the sole owner of [`ChainStore`] and [`PeerSet`]. Peer workers
/// and [`NodeHandle`]s feed it events and commands over channels, and every
/// read-validate-write sequence runs to completion inside the loop before the
/// next message is looked at. That makes each store mutation one atomic step;
/// interleaved reconciliations from different peers cannot lose updates or
/// append twice.
pub struct Node {
    store: ChainStore,
    peers: PeerSet,
    listener: TcpListener,
    events_tx: mpsc::Sender<PeerEvent>,
    events_rx: mpsc::Receiver<PeerEvent>,
    commands: mpsc::Receiver<Command>,
    config: NodeConfig,
}

impl Node {
    /// Bind the peer listener and assemble a node around a genesis-only chain.
    pub async fn bind(addr: &str, config: NodeConfig) -> Result<(Self, NodeHandle), NodeError> {
        let listener = TcpListener::bind(addr).await?;
        let (events_tx, events_rx) = mpsc::channel(config.event_capacity);
        let (commands_tx, commands_rx) = mpsc::channel(config.command_capacity);
        let node = Self {
            store: ChainStore::new(),
            peers: PeerSet::default(),
            listener,
            events_tx,
            events_rx,
            commands: commands_rx,
            config,
        };
        Ok((node, NodeHandle::new(commands_tx)))
    }

    /// The address the peer listener actually bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, NodeError> {
        Ok(self.listener.local_addr()?)
    }

    /// Main event loop. Runs until every [`NodeHandle`] has been dropped.
    pub async fn run(mut self) {
        match self.listener.local_addr() {
            Ok(addr) => info!(%addr, "Listening for peers"),
            Err(error) => warn!(%error, "Peer listener has no local address"),
        }

        loop {
            tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, addr)) => self.register_peer(stream, addr.to_string()),
                    Err(error) => warn!(%error, "Failed to accept peer connection"),
                },
                Some(event) = self.events_rx.recv() => self.handle_peer_event(event),
                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
            }
        }
        debug!("All handles dropped, node loop ending");
    }

    /// Adopt a connected stream as a peer and open synchronization with it.
    fn register_peer(&mut self, stream: TcpStream, addr: String) {
        let (outbound_tx, outbound_rx) = mpsc::channel(self.config.network.outbound_capacity);
        let id = self.peers.insert(addr.clone(), outbound_tx);
        spawn_peer(
            id,
            stream,
            self.config.network.max_frame_length,
            outbound_rx,
            self.events_tx.clone(),
        );
        info!(peer = %id, %addr, "Peer connected");

        // every fresh connection starts with a latest-block query
        self.peers.send(id, PeerMessage::QueryLatest);
    }

    fn handle_peer_event(&mut self, event: PeerEvent) {
        match event {
            PeerEvent::Opened { stream, addr } => self.register_peer(stream, addr),
            PeerEvent::Message { peer, message } => self.handle_peer_message(peer, message),
            PeerEvent::Disconnected(peer) => {
                if let Some(addr) = self.peers.remove(peer) {
                    info!(peer = %peer, %addr, "Peer disconnected");
                }
            }
        }
    }

    fn handle_peer_message(&mut self, peer: PeerId, message: PeerMessage) {
        match message {
            PeerMessage::QueryLatest => {
                debug!(peer = %peer, "Peer asked for our latest block");
                let latest = self.store.latest().clone();
                self.peers.send(peer, PeerMessage::ChainPush(vec![latest]));
            }
            PeerMessage::QueryAll => {
                debug!(peer = %peer, "Peer asked for our full chain");
                let chain = self.store.blocks().to_vec();
                self.peers.send(peer, PeerMessage::ChainPush(chain));
            }
            PeerMessage::ChainPush(chain) => self.handle_chain_push(peer, chain),
        }
    }

    /// Run a pushed chain view through reconciliation and follow up on the
    /// outcome: announce accepted progress to everyone, or go back to the
    /// originating peer for its full history.
    fn handle_chain_push(&mut self, peer: PeerId, chain: Vec<Block>) {
        match reconcile(&mut self.store, chain) {
            Reconciliation::Appended => {
                info!(peer = %peer, position = self.store.latest().index(), "Appended block received from peer");
                self.broadcast_latest();
            }
            Reconciliation::Replaced => {
                info!(peer = %peer, height = self.store.len(), "Replaced local chain with longer peer history");
                self.broadcast_latest();
            }
            Reconciliation::NeedFullChain => {
                info!(peer = %peer, "Peer tip does not attach, querying their full chain");
                self.peers.send(peer, PeerMessage::QueryAll);
            }
            Reconciliation::KeptLocal => {
                debug!(peer = %peer, "Peer chain is not ahead, nothing to do");
            }
            Reconciliation::Rejected => {
                warn!(peer = %peer, "Rejected invalid chain from peer");
            }
        }
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Mine { payload, reply } => {
                let _ = reply.send(self.mine(payload));
            }
            Command::Chain { reply } => {
                let _ = reply.send(self.store.blocks().to_vec());
            }
            Command::Peers { reply } => {
                let _ = reply.send(self.peers.addresses());
            }
            Command::AddPeer { addr, reply } => self.dial_peer(addr, reply),
        }
    }

    /// Mine a block from `payload`, append it, and announce the new tip.
    fn mine(&mut self, payload: String) -> Result<Block, NodeError> {
        let block = Block::next(self.store.latest(), payload);
        if !self.store.try_append(block.clone()) {
            // unreachable while mining happens inside the loop, kept as a
            // guard for the invariant rather than a code path
            warn!(position = block.index(), "Freshly mined block failed to append");
            return Err(NodeError::BlockRejected);
        }
        info!(position = block.index(), hash = %block.hash(), "Mined new block");
        self.broadcast_latest();
        Ok(block)
    }

    /// Push a single-element chain holding the latest block to every peer.
    fn broadcast_latest(&mut self) {
        let latest = self.store.latest().clone();
        let reached = self.peers.broadcast(&PeerMessage::ChainPush(vec![latest]));
        debug!(peers = reached, "Announced latest block");
    }

    /// Dial `addr` off the loop so a slow or dead address cannot stall other
    /// peers. The dialed stream comes back in through the event channel.
    fn dial_peer(&self, addr: String, reply: tokio::sync::oneshot::Sender<Result<(), NodeError>>) {
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            match connect(&addr).await {
                Ok(stream) => {
                    let _ = reply.send(Ok(()));
                    let _ = events.send(PeerEvent::Opened { stream, addr }).await;
                }
                Err(error) => {
                    warn!(%addr, %error, "Failed to dial peer");
                    let _ = reply.send(Err(error.into()));
                }
            }
        });
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    #[error("Block rejected")]
    BlockRejected,
    #[error("Node is shut down")]
    Shutdown,
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
