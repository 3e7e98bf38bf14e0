use std::error::Error;

use clap::Parser;
use node::{Node, NodeConfig};
use tracing::warn;

/// A minimal block chain node: TCP gossip between peers, HTTP on the side.
#[derive(Debug, Parser)]
#[command(name = "chain-node")]
struct Args {
    /// Address for the HTTP control surface.
    #[arg(long, default_value = "127.0.0.1:3001")]
    http_addr: String,

    /// Address to listen on for peer connections.
    #[arg(long, default_value = "127.0.0.1:6001")]
    p2p_addr: String,

    /// Comma-separated peer addresses to dial at startup.
    #[arg(long, default_value = "")]
    peers: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
    let args = Args::parse();

    let (node, handle) = Node::bind(&args.p2p_addr, NodeConfig::default()).await?;
    tokio::spawn(node.run());

    // A peer that is down at startup is not fatal; it can be added later
    // through the HTTP surface.
    for peer in args.peers.split(',').filter(|addr| !addr.is_empty()) {
        if let Err(error) = handle.add_peer(peer).await {
            warn!(%peer, %error, "Failed to dial startup peer");
        }
    }

    node::serve(&args.http_addr, handle).await?;
    Ok(())
}
