//! Fixed fields of the well-known first block. Every node starts from exactly
//! this block, so changing any of these splits the network.

pub const GENESIS_INDEX: u64 = 0;
pub const GENESIS_TIMESTAMP: i64 = 1_465_154_705;
pub const GENESIS_PAYLOAD: &str = "my genesis block!!";
pub const GENESIS_PREVIOUS_HASH: &str = "";
