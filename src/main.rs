//! HTTP protocol adapter (v1)
//!
//! Launched by a control plane with a single JSON configuration argument.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────┐
//!                       │              PROTOCOL ADAPTER                 │
//!   Client Request      │  ┌─────────┐   ┌──────────┐   ┌───────────┐  │      ┌───────────────┐
//!   ────────────────────┼─▶│   net   │──▶│  http    │──▶│resolution │──┼─────▶│ control plane │
//!                       │  │listener │   │canonical │   │  relay    │◀─┼──────│  (callbacks)  │
//!                       │  └─────────┘   └──────────┘   └─────┬─────┘  │      └───────────────┘
//!                       │                                     │        │
//!                       │                               ┌─────▼─────┐  │      ┌───────────────┐
//!                       │                               │ upstream  │──┼─────▶│   upstream    │
//!                       │                               │ forwarder │◀─┼──────│    server     │
//!                       │                               └─────┬─────┘  │      └───────────────┘
//!   Client Response     │  ┌──────────┐   ┌───────────┐       │        │
//!   ◀───────────────────┼──│ response │◀──│materialize│◀──────┘        │
//!   (or closed socket)  │  │  render  │   │ defaults  │                │
//!                       │  └──────────┘   └───────────┘                │
//!                       └──────────────────────────────────────────────┘
//! ```

use clap::Parser;

use protocol_adapter::config::load_config;
use protocol_adapter::lifecycle::{self, signals, Shutdown, StartupError};
use protocol_adapter::observability::logging;

#[derive(Parser)]
#[command(name = "protocol-adapter")]
#[command(about = "HTTP protocol adapter driven by an external control plane", long_about = None)]
struct Cli {
    /// JSON configuration object, e.g. '{"port": 4545, "callbackURLTemplate": "..."}'
    config: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(&cli.config).await {
        eprintln!("{}", e.to_json());
        std::process::exit(1);
    }
}

async fn run(raw_config: &str) -> Result<(), StartupError> {
    let config = load_config(raw_config)?;
    let started = lifecycle::start(&config).await?;

    // The parent treats the first stdout line as the readiness signal.
    println!("{}", serde_json::json!(started.metadata));

    logging::init(config.loglevel);
    tracing::debug!(
        port = started.metadata.port,
        loglevel = config.loglevel.as_str(),
        "protocol-adapter v{} started",
        env!("CARGO_PKG_VERSION")
    );

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());
    started
        .server
        .run(started.listener, shutdown.subscribe())
        .await;

    tracing::info!("Shutdown complete");
    Ok(())
}
