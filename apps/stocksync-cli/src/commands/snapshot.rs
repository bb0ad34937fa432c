//! Snapshot command - Save the raw supplier feed to a file

use crate::config::AppConfig;
use crate::error::CliResult;
use clap::Args;
use std::path::PathBuf;
use stocksync_client::StockFeedClient;
use tracing::info;

/// Arguments for the snapshot command
#[derive(Args, Debug)]
pub struct SnapshotArgs {
    /// Output file
    #[arg(long, short, value_name = "FILE", default_value = "product_stock.json")]
    pub out: PathBuf,
}

pub async fn execute(args: SnapshotArgs, config: &AppConfig) -> CliResult<()> {
    let feed = StockFeedClient::new(config.feed()?)?;
    let raw = feed.fetch_stock_raw().await?;

    let items = raw
        .get("stock")
        .and_then(serde_json::Value::as_array)
        .map_or(0, Vec::len);

    tokio::fs::write(&args.out, serde_json::to_string_pretty(&raw)?).await?;
    info!(path = %args.out.display(), items, "Saved stock snapshot");
    println!("Saved {items} stock items to {}", args.out.display());
    Ok(())
}
