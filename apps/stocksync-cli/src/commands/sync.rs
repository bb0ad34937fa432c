//! Sync command - Reconcile the catalog with the supplier feed

use crate::config::AppConfig;
use crate::error::{CliError, CliResult};
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stocksync_client::{CatalogClient, StockFeedClient};
use stocksync_engine::{ReconciliationCoordinator, RunSummary};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Arguments for the sync command
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Plan only: log the operations without writing to the store
    #[arg(long)]
    pub dry_run: bool,

    /// Also write the final run summary as JSON to this file
    #[arg(long, value_name = "FILE")]
    pub summary_json: Option<PathBuf>,
}

pub async fn execute(args: SyncArgs, config: &AppConfig, cancel: CancellationToken) -> CliResult<()> {
    config
        .sync
        .validate()
        .map_err(|e| CliError::Config(e.to_string()))?;

    let feed = StockFeedClient::new(config.feed()?)?;
    let catalog = CatalogClient::new(config.catalog()?)?;
    info!(feed = %feed.base_url(), store = %catalog.api_url(), "Clients ready");

    let coordinator = ReconciliationCoordinator::new(
        Arc::new(feed),
        Arc::new(catalog),
        Arc::new(config.sync.clone()),
        cancel,
    );

    let outcome = if args.dry_run {
        coordinator.dry_run().await.map(|dry| dry.summary)
    } else {
        coordinator.run().await
    };

    match outcome {
        Ok(summary) => {
            if let Some(path) = &args.summary_json {
                write_summary(path, &summary)?;
            }
            print_summary(&summary);
            Ok(())
        }
        Err(failure) => {
            if let Some(path) = &args.summary_json {
                write_summary(path, &failure.summary)?;
            }
            Err(failure.into())
        }
    }
}

fn write_summary(path: &Path, summary: &RunSummary) -> CliResult<()> {
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json)?;
    info!(path = %path.display(), "Wrote run summary");
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    let prefix = if summary.dry_run { "Dry run: would have " } else { "" };
    println!(
        "{prefix}created {}, updated {}, zeroed {}; failed {}, cancelled {}, skipped {}",
        summary.created,
        summary.updated,
        summary.zeroed,
        summary.failed,
        summary.cancelled,
        summary.invalid_records + summary.skipped_invalid_sku,
    );
    if !summary.has_failures() {
        return;
    }
    println!("Failed operations:");
    for failure in &summary.failures {
        println!(
            "  {} {}: {}",
            failure.kind,
            failure.sku.as_deref().unwrap_or("<no sku>"),
            failure.cause
        );
    }
}
