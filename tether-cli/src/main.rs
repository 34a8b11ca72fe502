//! `tether-signal`: runs the pairing relay.
//!
//! ```bash
//! tether-signal --port 8000 --room-timeout-ms 30000
//! RUST_LOG=tether_server=debug tether-signal
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::net::IpAddr;
use std::time::Duration;
use tether_server::ServerConfig;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(name = "tether-signal")]
#[command(about = "Pairs two devices by id suffix and relays their session negotiation")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "TETHER_PORT", default_value_t = 8000)]
    port: u16,

    /// Bind address
    #[arg(short, long, env = "TETHER_BIND", default_value = "0.0.0.0")]
    bind: IpAddr,

    /// How long a room waits for its second device, in milliseconds
    #[arg(long, env = "TETHER_ROOM_TIMEOUT_MS", default_value_t = 30_000)]
    room_timeout_ms: u64,

    /// Live connections accepted before new ones are refused
    #[arg(long, env = "TETHER_MAX_CONNECTIONS", default_value_t = 1000)]
    max_connections: usize,

    /// Outbound queue length per connection; overflow is dropped
    #[arg(long, env = "TETHER_MESSAGE_QUEUE_SIZE", default_value_t = 10_000)]
    message_queue_size: usize,

    /// Seconds between stats log lines (0 disables)
    #[arg(long, env = "TETHER_STATS_INTERVAL_SECS", default_value_t = 30)]
    stats_interval_secs: u64,

    /// Default log level when RUST_LOG is not set
    #[arg(long, env = "TETHER_LOG_LEVEL", default_value = "info")]
    log_level: LevelFilter,
}

impl From<&Args> for ServerConfig {
    fn from(args: &Args) -> Self {
        Self {
            bind: args.bind,
            port: args.port,
            room_timeout: Duration::from_millis(args.room_timeout_ms),
            max_connections: args.max_connections,
            message_queue_size: args.message_queue_size,
            stats_interval: Duration::from_secs(args.stats_interval_secs),
        }
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down...");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(args.log_level.into())
                .from_env_lossy(),
        )
        .init();

    let config = ServerConfig::from(&args);
    anyhow::ensure!(
        config.message_queue_size > 0,
        "--message-queue-size must be at least 1"
    );

    info!("Starting tether signaling server");

    tether_server::serve(config, shutdown_signal())
        .await
        .context("signaling server failed")
}
