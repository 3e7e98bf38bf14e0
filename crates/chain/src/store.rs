use chain_types::Block;

use crate::validate::{is_valid_chain, is_valid_successor};

/// The node's single authoritative chain.
///
/// Holds at least the genesis block at all times and only changes through
/// [`ChainStore::try_append`] and [`ChainStore::try_replace`], both of which
/// leave the chain untouched when their candidate fails validation. Callers
/// are expected to serialize access; the store itself does no locking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainStore {
    blocks: Vec<Block>,
}

impl ChainStore {
    /// A fresh store holding only the genesis block.
    pub fn new() -> Self {
        Self {
            blocks: vec![Block::genesis()],
        }
    }

    /// The last block of the authoritative chain.
    pub fn latest(&self) -> &Block {
        self.blocks.last().expect("store always holds genesis")
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Append `block` if it validly extends the current latest block.
    /// Returns false and leaves the chain unchanged otherwise.
    pub fn try_append(&mut self, block: Block) -> bool {
        if !is_valid_successor(&block, self.latest()) {
            return false;
        }
        self.blocks.push(block);
        true
    }

    /// Swap the whole chain for `candidate` if the candidate is valid from
    /// genesis and strictly longer than the current chain. Length alone is
    /// never enough: a longer-but-invalid candidate is rejected, as is a
    /// shorter-but-valid one.
    pub fn try_replace(&mut self, candidate: Vec<Block>) -> bool {
        if !is_valid_chain(&candidate) || candidate.len() <= self.blocks.len() {
            return false;
        }
        self.blocks = candidate;
        true
    }
}

impl Default for ChainStore {
    fn default() -> Self {
        Self::new()
    }
}
