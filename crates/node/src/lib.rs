mod api;
mod config;
mod handle;
mod node;

pub use api::{router, serve};
pub use config::NodeConfig;
pub use handle::NodeHandle;
pub use node::{Node, NodeError};
