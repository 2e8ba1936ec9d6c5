//! Reconciler binary - prices synths across the configured devnet
//!
//! Usage:
//!   reconciler --config config/synthex.toml
//!   reconciler --once --log-level debug
//!   reconciler --print-config > config/synthex.toml

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use synth_reconciler::{build_devnet, NetworkEndpoint, NetworkSnapshot, Reconciler, SubmissionQueue};
use synthex_config::{load_config, SynthexConfig};
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "reconciler")]
#[command(about = "Synthex cross-network price reconciler")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log filter, overrides the configured level
    #[arg(short, long)]
    log_level: Option<String>,

    /// Enable JSON logging format
    #[arg(long)]
    json_logs: bool,

    /// Run a single cycle and exit
    #[arg(long)]
    once: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref()).context("Failed to load configuration")?;

    if args.print_config {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    init_logging(&args, &config);
    info!("🚀 Starting Synthex reconciler");
    info!(
        "📋 {} networks, {} synths, period {}s",
        config.networks.len(),
        config.synths.len(),
        config.reconciler.period_secs
    );

    let queue = Arc::new(SubmissionQueue::new());
    let networks = build_devnet(&config, queue.clone()).context("Failed to build devnet")?;
    info!("✅ Devnet seeded");

    let endpoints: Vec<Arc<dyn NetworkEndpoint>> = networks
        .iter()
        .map(|n| n.clone() as Arc<dyn NetworkEndpoint>)
        .collect();
    let reconciler = Reconciler::new(
        endpoints,
        queue,
        config.reconciler.operator,
        Duration::from_secs(config.reconciler.period_secs),
    );

    if args.once {
        let report = reconciler.run_cycle().await;
        info!(
            "📊 Cycle complete: {} priced, {} pushed, {} failed",
            report.prices.len(),
            report.pushed,
            report.failed_pushes.len()
        );
    } else {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("🛑 Shutdown signal received"),
                Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
            }
            let _ = shutdown_tx.send(true);
        });
        info!("🔄 Reconciling every {:?}", reconciler.period());
        reconciler.run(shutdown_rx).await;
    }

    if let Some(path) = &config.reconciler.snapshot_path {
        let mut snapshots: Vec<NetworkSnapshot> = Vec::with_capacity(networks.len());
        for network in &networks {
            snapshots.push(network.snapshot().await);
        }
        write_snapshot(path, &snapshots)?;
        info!("💾 State snapshot written to {}", path);
    } else {
        warn!("No snapshot path configured, state discarded");
    }

    Ok(())
}

fn init_logging(args: &Args, config: &SynthexConfig) {
    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if args.json_logs || config.logging.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn write_snapshot(path: &str, snapshots: &[NetworkSnapshot]) -> Result<()> {
    let bytes = bincode::serialize(snapshots).context("Failed to encode state snapshot")?;
    if let Some(parent) = std::path::Path::new(path).parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create snapshot directory {:?}", parent))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("Failed to write snapshot {}", path))
}
