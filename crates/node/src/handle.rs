use chain_types::Block;
use tokio::sync::{mpsc, oneshot};

use crate::node::NodeError;

/// Commands a [`NodeHandle`] submits into the node loop.
#[derive(Debug)]
pub(crate) enum Command {
    Mine {
        payload: String,
        reply: oneshot::Sender<Result<Block, NodeError>>,
    },
    Chain {
        reply: oneshot::Sender<Vec<Block>>,
    },
    Peers {
        reply: oneshot::Sender<Vec<String>>,
    },
    AddPeer {
        addr: String,
        reply: oneshot::Sender<Result<(), NodeError>>,
    },
}

/// Cloneable handle for driving a running node from outside its loop.
///
/// All chain and peer state lives inside the node task; the handle only ever
/// exchanges messages with it, so callers can never observe or interleave a
/// half-applied mutation. Every method fails with [`NodeError::Shutdown`] once
/// the node loop has ended.
#[derive(Debug, Clone)]
pub struct NodeHandle {
    commands: mpsc::Sender<Command>,
}

impl NodeHandle {
    pub(crate) fn new(commands: mpsc::Sender<Command>) -> Self {
        Self { commands }
    }

    /// Mine a block holding `payload`, append it, and announce it to peers.
    pub async fn mine(&self, payload: impl Into<String>) -> Result<Block, NodeError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Mine {
                payload: payload.into(),
                reply,
            })
            .await
            .map_err(|_| NodeError::Shutdown)?;
        response.await.map_err(|_| NodeError::Shutdown)?
    }

    /// A snapshot of the full chain, genesis first.
    pub async fn chain(&self) -> Result<Vec<Block>, NodeError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Chain { reply })
            .await
            .map_err(|_| NodeError::Shutdown)?;
        response.await.map_err(|_| NodeError::Shutdown)
    }

    /// Addresses of all connected peers.
    pub async fn peers(&self) -> Result<Vec<String>, NodeError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Peers { reply })
            .await
            .map_err(|_| NodeError::Shutdown)?;
        response.await.map_err(|_| NodeError::Shutdown)
    }

    /// Dial `addr` and register the connection; synchronization starts as soon
    /// as the connection is up. Resolves once the dial has succeeded or failed.
    pub async fn add_peer(&self, addr: impl Into<String>) -> Result<(), NodeError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::AddPeer {
                addr: addr.into(),
                reply,
            })
            .await
            .map_err(|_| NodeError::Shutdown)?;
        response.await.map_err(|_| NodeError::Shutdown)?
    }
}
