use chain_types::Block;
use serde::{Deserialize, Serialize};

use crate::NetworkError;

/// Wire discriminants for peer messages. The numeric values are shared with
/// other node implementations and must not be reassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageKind {
    QueryLatest = 0,
    QueryAll = 1,
    ChainPush = 2,
}

impl MessageKind {
    fn from_wire(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::QueryLatest),
            1 => Some(Self::QueryAll),
            2 => Some(Self::ChainPush),
            _ => None,
        }
    }
}

/// On-the-wire shape: `{"type": <int>, "data": <string>}`.
///
/// `data` carries a JSON-serialized chain as a *string* (encoded twice), and
/// is omitted entirely for the query kinds. Both quirks are part of the shared
/// wire format.
#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    #[serde(rename = "type")]
    kind: u8,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    data: String,
}

/// A message exchanged over a peer connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerMessage {
    /// Ask the peer for a single-element chain holding its latest block.
    QueryLatest,
    /// Ask the peer for its entire chain.
    QueryAll,
    /// Push a chain view, either a full history or just a tip.
    ChainPush(Vec<Block>),
}

impl PeerMessage {
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::QueryLatest => MessageKind::QueryLatest,
            Self::QueryAll => MessageKind::QueryAll,
            Self::ChainPush(_) => MessageKind::ChainPush,
        }
    }

    /// Serialize to JSON bytes for one transport frame.
    pub fn to_bytes(&self) -> Result<Vec<u8>, NetworkError> {
        let wire = match self {
            Self::QueryLatest | Self::QueryAll => WireMessage {
                kind: self.kind() as u8,
                data: String::new(),
            },
            Self::ChainPush(chain) => WireMessage {
                kind: MessageKind::ChainPush as u8,
                data: serde_json::to_string(chain)?,
            },
        };
        serde_json::to_vec(&wire).map_err(NetworkError::Serialization)
    }

    /// Deserialize one transport frame.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, NetworkError> {
        let wire: WireMessage =
            serde_json::from_slice(bytes).map_err(NetworkError::Deserialization)?;
        match MessageKind::from_wire(wire.kind) {
            Some(MessageKind::QueryLatest) => Ok(Self::QueryLatest),
            Some(MessageKind::QueryAll) => Ok(Self::QueryAll),
            Some(MessageKind::ChainPush) => {
                let chain =
                    serde_json::from_str(&wire.data).map_err(NetworkError::Deserialization)?;
                Ok(Self::ChainPush(chain))
            }
            None => Err(NetworkError::UnknownMessageKind(wire.kind)),
        }
    }
}
