//! Arbor Visualization Server
//!
//! Trace the height computation for a tree and serve the playback API.

use std::env;

use arbor_trace::Trace;
use arbor_tree::{build_level_order, parse_level_order};
use arbor_vis::{VisConfig, VisServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "arbor_vis=info,arbor_trace=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = VisConfig::from_env()?;

    // Positional args: [input] [port]
    let args: Vec<String> = env::args().collect();
    if let Some(input) = args.get(1) {
        config.input = input.clone();
    }
    if let Some(port) = args.get(2).and_then(|s| s.parse().ok()) {
        config = config.with_port(port);
    }

    let values = parse_level_order(&config.input, config.limits)?;
    let tree = build_level_order(&values);
    let trace = Trace::record(&tree);

    println!("Arbor Tree Height Visualizer");
    println!("============================");
    println!();
    println!("Input: {}", config.input);
    println!("  Nodes: {}", tree.len());
    println!("  Height: {}", trace.result());
    println!("  Steps: {}", trace.len());
    println!();
    println!("Starting visualization server on http://{}", config.addr);
    println!();

    let server = VisServer::new(config)?;
    server.serve().await?;

    Ok(())
}
