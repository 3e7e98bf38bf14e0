use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::consts::{GENESIS_INDEX, GENESIS_PAYLOAD, GENESIS_PREVIOUS_HASH, GENESIS_TIMESTAMP};

/// A single hash-linked record.
///
/// The serialized field names (`index`, `timestamp`, `data`, `prevHash`,
/// `hash`) are part of the wire format shared with other nodes and must not
/// change. No validity is assumed: a `Block` can hold a stored hash that does
/// not match its fields, which is exactly what the validators check for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Block {
    index: u64,
    timestamp: i64,
    #[serde(rename = "data")]
    payload: String,
    #[serde(rename = "prevHash")]
    previous_hash: String,
    hash: String,
}

impl Block {
    /// Build a block from explicit fields, sealing it with the computed hash.
    pub fn new(
        index: u64,
        timestamp: i64,
        payload: impl Into<String>,
        previous_hash: impl Into<String>,
    ) -> Self {
        let payload = payload.into();
        let previous_hash = previous_hash.into();
        let hash = utils::hash_fields(index, timestamp, &payload, &previous_hash);
        Self {
            index,
            timestamp,
            payload,
            previous_hash,
            hash,
        }
    }

    /// The well-known first block every node's chain is rooted at.
    ///
    /// Its hash is computed with the same function as any other block, so all
    /// nodes agree on the genesis block byte for byte.
    pub fn genesis() -> Self {
        Self::new(
            GENESIS_INDEX,
            GENESIS_TIMESTAMP,
            GENESIS_PAYLOAD,
            GENESIS_PREVIOUS_HASH,
        )
    }

    /// Mint the block extending `previous` with `payload`, stamped with the
    /// current time.
    pub fn next(previous: &Block, payload: impl Into<String>) -> Self {
        Self::new(
            previous.index + 1,
            Utc::now().timestamp(),
            payload,
            previous.hash.clone(),
        )
    }

    /// Recompute the content hash from this block's fields.
    ///
    /// For a well-formed block this equals [`Block::hash`]; a difference means
    /// the block was tampered with after sealing.
    pub fn compute_hash(&self) -> String {
        utils::hash_fields(self.index, self.timestamp, &self.payload, &self.previous_hash)
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn previous_hash(&self) -> &str {
        &self.previous_hash
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }
}

mod utils {
    use sha2::{Digest, Sha256};

    /// SHA-256 over the decimal-rendered index and timestamp followed by the
    /// payload and previous hash, as lowercase hex. Field order and encoding
    /// are fixed: every node must derive identical hashes from identical
    /// fields or cross-node validation falls apart.
    #[inline]
    pub fn hash_fields(index: u64, timestamp: i64, payload: &str, previous_hash: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(index.to_string().as_bytes());
        hasher.update(timestamp.to_string().as_bytes());
        hasher.update(payload.as_bytes());
        hasher.update(previous_hash.as_bytes());
        hex::encode(hasher.finalize())
    }
}
