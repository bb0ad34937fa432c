//! Request bodies for creates and stock updates.

use crate::config::SyncSettings;
use crate::stock::StockRecord;
use rust_decimal::Decimal;
use stocksync_client::models::{CategoryRef, ImageRef, MetaData, NewProduct, ProductUpdate};

/// Body for creating a product from a feed record.
#[must_use]
pub fn new_product(record: &StockRecord, settings: &SyncSettings) -> NewProduct {
    let name = [record.model.as_deref(), record.color.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

    let short_description = settings.add_short_description.then(|| {
        format!(
            "SKU: {} | EAN: {}",
            record.sku,
            record.ean.as_deref().unwrap_or_default()
        )
    });

    let images = record
        .image_url
        .as_ref()
        .filter(|_| settings.add_photos)
        .map(|src| vec![ImageRef { src: src.clone() }]);

    NewProduct {
        name: if name.is_empty() { record.sku.clone() } else { name },
        product_type: "simple".to_string(),
        regular_price: record.price.to_string(),
        categories: record
            .category
            .iter()
            .map(|name| CategoryRef { name: name.clone() })
            .collect(),
        stock_quantity: record.stock_quantity,
        manage_stock: true,
        sku: record.sku.clone(),
        description: record
            .description
            .clone()
            .filter(|_| settings.add_long_description),
        short_description,
        images,
        meta_data: cost_meta(Some(record.price), settings),
    }
}

/// Body for a stock update; `cost_price` is only sent when tracking is on.
#[must_use]
pub fn stock_update(quantity: u32, cost_price: Option<Decimal>, settings: &SyncSettings) -> ProductUpdate {
    ProductUpdate {
        meta_data: cost_meta(cost_price, settings),
        ..ProductUpdate::stock(quantity)
    }
}

fn cost_meta(cost_price: Option<Decimal>, settings: &SyncSettings) -> Option<Vec<MetaData>> {
    if !settings.track_cost_price {
        return None;
    }
    cost_price.map(|price| vec![MetaData::text(&settings.cost_price_field, price.to_string())])
}
