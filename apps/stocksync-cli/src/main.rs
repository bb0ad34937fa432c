//! stocksync - keep a storefront catalog in line with a supplier stock feed
//!
//! Subcommands:
//! - `sync`: reconcile stock levels, create new products, zero vanished ones
//! - `snapshot`: save the raw supplier feed to a JSON file
//! - `reserve` / `reservations`: supplier-side stock reservations

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

mod commands;
mod config;
mod error;
mod logging;
mod shutdown;

use config::{AppConfig, DEFAULT_CONFIG_FILE};
use error::CliResult;
use logging::LogOptions;

/// Supplier feed to storefront stock synchronization
#[derive(Parser)]
#[command(name = "stocksync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file
    #[arg(long, short, global = true, env = "STOCKSYNC_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Log filter used when RUST_LOG is unset (e.g. "debug" or "info,stocksync_engine=debug")
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json: bool,

    /// Also append logs to this file
    #[arg(long, global = true, value_name = "FILE")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile the store catalog with the supplier feed
    Sync(commands::sync::SyncArgs),

    /// Save the raw supplier feed as JSON
    Snapshot(commands::snapshot::SnapshotArgs),

    /// Reserve stock for a SKU at the supplier
    Reserve(commands::reserve::ReserveArgs),

    /// List open supplier reservations
    Reservations(commands::reserve::ReservationsArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            tracing::error!(error = %e, exit_code = e.exit_code(), "Exiting with error");
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let _ = dotenvy::dotenv();

    logging::init_logging(&LogOptions {
        level: cli.log_level,
        json: cli.json,
        file: cli.log_file,
    })?;

    let config = AppConfig::load(&cli.config)?;

    let cancel = CancellationToken::new();
    shutdown::cancel_on_signal(cancel.clone());

    match cli.command {
        Commands::Sync(args) => commands::sync::execute(args, &config, cancel).await,
        Commands::Snapshot(args) => commands::snapshot::execute(args, &config).await,
        Commands::Reserve(args) => commands::reserve::execute(args, &config).await,
        Commands::Reservations(args) => commands::reserve::list(args, &config).await,
    }
}
