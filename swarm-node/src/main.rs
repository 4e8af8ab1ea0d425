//! Process wiring for a swarm coordination node: CLI parsing, logging
//! setup, UDP transport, and the tick loop that drives `swarm_core::Node`.
//!
//! Grounded on `roj-node-rs/src/main.rs`'s shape (clap `Args`, a
//! `FmtSubscriber` built from a `--log-level` string, a `tokio::select!`
//! event loop) with the consensus/discovery/stdin machinery replaced by
//! the tick driver and UDP transport this spec actually calls for.

mod config;
mod transport;

use clap::Parser;
use std::net::SocketAddr;
use std::time::Instant;
use swarm_core::{Capabilities, Node};
use tokio::time::interval;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use transport::FrameTransport;

/// Swarm coordination node: leader election, task allocation, formation motion.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Node id, 0-255, unique per node (spec.md §3).
    #[arg(long)]
    id: u32,

    /// UDP port this node listens on.
    #[arg(long, default_value = "9990")]
    port: u16,

    /// Peer address to broadcast frames to; repeat for every other node.
    #[arg(long = "peer")]
    peers: Vec<SocketAddr>,

    /// Capability tag this node holds; repeat for multiple tags.
    #[arg(long = "capability")]
    capabilities: Vec<String>,

    /// Total agent count, informational only (spec.md §6); unused by the core.
    #[arg(long)]
    agent_count: Option<u32>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).with_target(false).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Startup parameter validation: fatal before the tick loop runs (spec.md §7).
    let node_id = match config::validate_node_id(args.id) {
        Ok(id) => id,
        Err(e) => {
            eprintln!("fatal: {e}");
            std::process::exit(1);
        }
    };

    info!(node_id, port = args.port, peers = args.peers.len(), "swarm node starting");

    let capabilities: Capabilities = args.capabilities.into_iter().collect();
    let start_time_seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);

    let mut node = Node::new(node_id, capabilities, Instant::now(), start_time_seed);
    let mut transport = FrameTransport::bind(args.port, args.peers).await?;
    info!(addr = %transport.local_addr()?, "listening");

    let mut ticker = interval(swarm_core::TICK_PERIOD);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                for frame in node.tick(Instant::now()) {
                    transport.broadcast(&frame).await;
                }
            }
            Some(bytes) = transport.recv() => {
                match swarm_core::codec::decode(&bytes) {
                    Ok(frame) => {
                        for reply in node.deliver(frame, Instant::now()) {
                            transport.broadcast(&reply).await;
                        }
                    }
                    Err(e) => warn!(error = %e, "dropped malformed frame"),
                }
            }
        }
    }
}
