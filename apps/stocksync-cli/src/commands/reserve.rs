//! Reservation commands - Reserve supplier stock and list reservations

use crate::config::AppConfig;
use crate::error::{CliError, CliResult};
use clap::Args;
use stocksync_client::models::ReservationRequest;
use stocksync_client::StockFeedClient;
use stocksync_engine::is_valid_sku;
use tracing::info;

/// Arguments for the reserve command
#[derive(Args, Debug)]
pub struct ReserveArgs {
    /// Supplier SKU to reserve
    #[arg(long)]
    pub sku: String,

    /// Quantity to reserve
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub qty: u32,

    /// Warranty flag (0 or 1)
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=1))]
    pub warranty: u8,
}

/// Arguments for the reservations command
#[derive(Args, Debug)]
pub struct ReservationsArgs {}

pub async fn execute(args: ReserveArgs, config: &AppConfig) -> CliResult<()> {
    let request = build_request(args)?;
    let feed = StockFeedClient::new(config.feed()?)?;

    let response = feed.create_reservation(&request).await?;
    info!(sku = %request.sku, qty = request.qty, "Reservation submitted");
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

pub async fn list(_args: ReservationsArgs, config: &AppConfig) -> CliResult<()> {
    let feed = StockFeedClient::new(config.feed()?)?;
    let response = feed.list_reservations().await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn build_request(args: ReserveArgs) -> CliResult<ReservationRequest> {
    if !is_valid_sku(&args.sku) {
        return Err(CliError::Validation(format!(
            "'{}' is not a valid SKU (letters, digits, '-' and '_' only)",
            args.sku
        )));
    }
    Ok(ReservationRequest {
        sku: args.sku,
        qty: args.qty,
        warranty: args.warranty,
    })
}
