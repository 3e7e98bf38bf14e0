mod config;
mod message;
mod peer;
mod transport;

pub use config::NetworkConfig;
pub use message::{MessageKind, PeerMessage};
pub use peer::{PeerEvent, PeerId, PeerSet};
pub use transport::{connect, spawn_peer};

#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(serde_json::Error),

    #[error("Unknown message kind: {0}")]
    UnknownMessageKind(u8),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
