/// Transport tuning for peer connections.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Largest accepted wire frame in bytes. Chains are pushed whole, so this
    /// bounds the chain length a peer can send us.
    pub max_frame_length: usize,

    /// Capacity of each peer's outbound message queue. When a peer cannot
    /// drain its queue, further messages to it are dropped, not queued.
    pub outbound_capacity: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            max_frame_length: 1024 * 1024,
            outbound_capacity: 64,
        }
    }
}
