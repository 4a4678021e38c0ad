//! vault-funder
//!
//! Keeps custody vaults on several chains topped up with native gas currency.
//!
//! # Architecture Overview
//!
//! ```text
//!   chains.toml ──▶ config ──┐        key registry ──▶ watched vault address per family
//!                            ▼                                   │
//!   seed phrase ──▶ keys ──▶ lifecycle::startup ◀────────────────┘
//!                            │
//!                            ▼
//!                   funding::WatcherSupervisor
//!                     │        │        │
//!                  watcher  watcher  watcher      (one tokio task per chain)
//!                     │
//!                     ▼  balance < threshold
//!                  executor ──▶ ChainClient (evm / lisk) ──▶ network
//!                     │
//!                     ▼
//!                  confirmation wait
//! ```

use clap::{Parser, Subcommand};
use std::error::Error;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use vault_funder::blockchain::ChainFamily;
use vault_funder::config::load_config;
use vault_funder::keys::{read_seed_phrase, HttpKeyRegistry, KeyDeriver};
use vault_funder::lifecycle::signals::wait_for_termination;
use vault_funder::lifecycle::startup::log_vaults;
use vault_funder::lifecycle::{start, StartupError};
use vault_funder::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "vault-funder", version)]
#[command(about = "Keeps custody vaults topped up with native gas currency", long_about = None)]
struct Cli {
    /// Chain configuration file.
    #[arg(short, long, default_value = "chains.toml")]
    config: PathBuf,

    /// Vault list (JSON). Overrides `vaults_path` from the config file.
    #[arg(long)]
    vaults: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Watch all configured chains and fund vaults (default)
    Run,
    /// Print the faucet address of every supported chain family
    Address,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(cli.config, cli.vaults).await,
        Command::Address => print_addresses().await,
    }
}

async fn read_deriver() -> Result<KeyDeriver, Box<dyn Error>> {
    let phrase = tokio::task::spawn_blocking(read_seed_phrase).await??;
    Ok(KeyDeriver::new(&phrase)?)
}

async fn print_addresses() -> Result<(), Box<dyn Error>> {
    let deriver = read_deriver().await?;
    for family in ChainFamily::ALL {
        let signer = deriver.derive(family)?;
        println!("{}\t{}", family, signer.address());
    }
    Ok(())
}

async fn run(config_path: PathBuf, vaults: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    let config = load_config(&config_path)?;
    logging::init_logging(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_path.display(),
        chains = config.chains.len(),
        "vault-funder starting"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr).map_err(|e| StartupError::Metrics(e.to_string()))?;
    }

    if let Some(path) = vaults.or_else(|| config.vaults_path.as_ref().map(PathBuf::from)) {
        log_vaults(&path)?;
    }

    let deriver = read_deriver().await?;
    let registry = HttpKeyRegistry::new(
        &config.key_registry.url,
        Duration::from_secs(config.key_registry.timeout_secs),
    )?;
    let supervisor = start(&config, &deriver, &registry).await?;
    drop(deriver);

    let signal = wait_for_termination().await;
    tracing::info!(signal, "Shutdown signal received");

    let aborted = supervisor
        .shutdown(Duration::from_secs(config.shutdown.grace_period_secs))
        .await;
    tracing::info!(aborted, "Shutdown complete");
    Ok(())
}
