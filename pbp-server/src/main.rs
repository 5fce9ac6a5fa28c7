//! Play-by-play relay server
//!
//! Polls live games, filters their play-by-play down to noteworthy events,
//! and hands those to the publisher until each game ends.

mod api;
mod config;
mod server;
mod shutdown;
mod state;
mod watch;

use clap::{Parser, Subcommand};
use config::{ConfigLoader, Overrides};
use pbp_core::processors::{ActivationService, PollerSpawner};
use pbp_core::registry::GameRegistry;
use pbp_sdk::GameCode;
use server::{build_router, run_server};
use shutdown::drain_pollers;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// How long running pollers get to wind down after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Play-by-play relay - polls live games and forwards noteworthy plays
#[derive(Parser, Debug)]
#[command(name = "pbp-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file [default: ./pbp-relay.toml]
    #[arg(short, long, env = "PBP_RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listen address (e.g., 0.0.0.0:8084)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Override the delay between poll cycles, in seconds
    #[arg(long, value_name = "SECS")]
    poll_interval: Option<u64>,

    /// Emit logs as JSON lines
    #[arg(long, default_value = "false")]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP activation service (default)
    Serve,
    /// Poll a single game in the foreground and print what gets published
    Watch {
        /// Code of the game to follow
        game_code: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize tracing
    init_tracing(args.json_logs);

    tracing::info!("Starting pbp-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_loader = ConfigLoader::new(
        args.config.as_deref(),
        Overrides {
            listen: args.listen,
            poll_interval_secs: args.poll_interval,
        },
    );
    let relay_config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    tracing::info!("Configuration loaded from {:?}", config_loader.config_path());

    if let Some(Command::Watch { game_code }) = args.command {
        return watch::run_watch(&relay_config, GameCode::from(game_code)).await;
    }

    // Shared upstream client and registry
    let upstream = relay_config.upstream.build_client().map_err(|e| {
        tracing::error!("Failed to build upstream client: {}", e);
        e
    })?;
    let endpoints = upstream.endpoints();
    tracing::info!(
        fetch = %endpoints.fetch_base_url,
        filter = %endpoints.filter_base_url,
        publish = %endpoints.publish_base_url,
        interval_secs = relay_config.poller.interval.as_secs(),
        "Upstream services configured"
    );

    let spawner = PollerSpawner::new(Arc::new(upstream), relay_config.poller);
    let activation = ActivationService::new(GameRegistry::new(), spawner);

    // Build the router
    let router = build_router(AppState::new(activation.clone()));

    // Run the server
    let listen_addr = relay_config.server.listen;
    tracing::info!("Starting HTTP server on {}", listen_addr);
    let result = run_server(router, listen_addr).await;

    // Stop pollers before exiting
    drain_pollers(&activation, SHUTDOWN_GRACE).await;
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
