use network::NetworkConfig;

/// Tunables for a running node.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Framing and per-peer queue settings.
    pub network: NetworkConfig,
    /// Capacity of the peer event queue feeding the node loop.
    pub event_capacity: usize,
    /// Capacity of the command queue between handles and the node loop.
    pub command_capacity: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            event_capacity: 256,
            command_capacity: 32,
        }
    }
}
