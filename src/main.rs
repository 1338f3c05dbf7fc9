//! Live stream relay with placeholder failover.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────┐
//!                     │                 LIVE RELAY                   │
//!                     │                                              │
//!   source ──probe────┼─▶ ┌─────────┐      ┌──────────────────────┐  │
//!                     │   │  probe  │─────▶│      supervisor      │  │
//!                     │   └─────────┘      │ MainActive ⇄ Placeh. │  │
//!                     │                    └──────────┬───────────┘  │
//!                     │                               │ launch/poll  │
//!                     │                               ▼              │
//!                     │   ┌─────────┐      ┌──────────────────────┐  │
//!   source ───────────┼──▶│  relay  │      │ process: handle +    │  │
//!                     │   │ ffmpeg  │◀────▶│ splitter + LineQueue │  │
//!                     │   └────┬────┘      └──────────────────────┘  │
//!                     │        │  or colour bars (placeholder)       │
//!                     └────────┼─────────────────────────────────────┘
//!                              ▼
//!                         destination
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use live_relay::config::{read_config, resolve_config, ConfigOverrides};
use live_relay::lifecycle::signals::spawn_signal_listener;
use live_relay::observability::{logging::init_logging, metrics};
use live_relay::supervisor::CommandLauncher;
use live_relay::{FailoverError, ProbeController, Shutdown, Supervisor};

#[derive(Parser)]
#[command(name = "live-relay")]
#[command(about = "Relay a live stream, falling back to colour bars while the source is down", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Source URL.
    #[arg(long)]
    source: Option<String>,

    /// Destination URL.
    #[arg(long)]
    destination: Option<String>,

    /// Seconds between supervisor iterations.
    #[arg(long)]
    interval: Option<u64>,

    /// Probe deadline in seconds.
    #[arg(long)]
    probe_timeout: Option<u64>,

    /// Log filter when RUST_LOG is unset.
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Keep the destination fed (default)
    Run,
    /// Probe the source once and report whether it is available
    Probe,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            source: self.source.clone(),
            destination: self.destination.clone(),
            interval_secs: self.interval,
            probe_timeout_secs: self.probe_timeout,
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let overrides = cli.overrides();

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run(resolve_config(cli.config.as_deref(), &overrides)?).await,
        Commands::Probe => probe(read_config(cli.config.as_deref(), &overrides)?).await,
    }
}

async fn run(config: live_relay::RelayConfig) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let _guard = init_logging(&config.logging)?;

    tracing::info!("live-relay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        source = %config.stream.source,
        destination = %config.stream.destination,
        interval_secs = config.supervisor.interval_secs,
        probe_timeout_secs = config.supervisor.probe_timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    let stop = shutdown.subscribe();
    spawn_signal_listener(&shutdown);

    let supervisor = Supervisor::new(
        &config,
        CommandLauncher::from_config(&config),
        ProbeController::new(config.binaries.clone(), config.markers.clone()),
    );

    match supervisor.run(stop).await {
        Err(FailoverError::Interrupted(reason)) => {
            tracing::info!(%reason, "Shutdown complete");
            Ok(ExitCode::SUCCESS)
        }
        Ok(()) => {
            tracing::info!("Shutdown complete");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => Err(e.into()),
    }
}

async fn probe(config: live_relay::RelayConfig) -> Result<ExitCode, Box<dyn std::error::Error>> {
    if config.stream.source.is_empty() {
        return Err("no source configured; pass --source or set stream.source".into());
    }

    let guard = init_logging(&config.logging)?;

    let controller = ProbeController::new(config.binaries.clone(), config.markers.clone());
    let result = controller
        .check(&config.stream.source, config.supervisor.probe_timeout())
        .await;

    println!("{}: {:?}", config.stream.source, result);
    drop(guard);

    Ok(if result.is_available() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
