//! Typed upstream stock records and the eligibility filter.

use crate::config::Blacklist;
use crate::error::InvalidStockRecord;
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use stocksync_client::models::RawStockItem;

/// Regional specification of a supplier item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StockSpec {
    Eu,
    Global,
    Other,
}

impl StockSpec {
    /// Map the feed's `properties.item_spec` value. Matching is exact.
    #[must_use]
    pub fn from_item_spec(value: Option<&str>) -> Self {
        match value {
            Some("EU Spec") => Self::Eu,
            Some("Global spec") => Self::Global,
            _ => Self::Other,
        }
    }

    /// Only EU and Global items are synced.
    #[must_use]
    pub fn is_eligible(self) -> bool {
        matches!(self, Self::Eu | Self::Global)
    }
}

impl fmt::Display for StockSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eu => write!(f, "EU"),
            Self::Global => write!(f, "Global"),
            Self::Other => write!(f, "Other"),
        }
    }
}

/// One validated upstream item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockRecord {
    pub sku: String,
    pub spec: StockSpec,
    pub price: Decimal,
    pub stock_quantity: u32,
    pub model: Option<String>,
    pub color: Option<String>,
    pub category: Option<String>,
    pub ean: Option<String>,
    pub image_url: Option<String>,
    /// Long product name from `properties.full_name`.
    pub description: Option<String>,
}

impl TryFrom<&RawStockItem> for StockRecord {
    type Error = InvalidStockRecord;

    fn try_from(item: &RawStockItem) -> Result<Self, Self::Error> {
        let sku = match &item.sku {
            None | Some(Value::Null) => return Err(InvalidStockRecord::new(None, "missing sku")),
            Some(Value::String(sku)) => sku.as_str(),
            Some(other) => {
                return Err(InvalidStockRecord::new(
                    None,
                    format!("sku is not a string: {other}"),
                ))
            }
        };

        let price = item
            .price
            .as_ref()
            .ok_or_else(|| InvalidStockRecord::new(Some(sku), "missing price"))
            .and_then(|value| {
                parse_price(value).ok_or_else(|| {
                    InvalidStockRecord::new(Some(sku), format!("unparseable price {value}"))
                })
            })?;

        let stock_quantity = item
            .in_stock
            .as_ref()
            .ok_or_else(|| InvalidStockRecord::new(Some(sku), "missing in_stock"))
            .and_then(|value| {
                parse_quantity(value).ok_or_else(|| {
                    InvalidStockRecord::new(Some(sku), format!("invalid in_stock {value}"))
                })
            })?;

        Ok(Self {
            sku: sku.to_string(),
            spec: StockSpec::from_item_spec(item.item_spec()),
            price,
            stock_quantity,
            model: item.model.as_ref().and_then(value_to_text),
            color: item.color.as_ref().and_then(value_to_text),
            category: item.cat_name.as_ref().and_then(value_to_text),
            ean: item.ean.as_ref().and_then(value_to_text),
            image_url: item.image.as_ref().and_then(value_to_text),
            description: item.property("full_name").and_then(value_to_text),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_blank(Some(s)),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_price(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_quantity(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => {
            if let Some(q) = n.as_u64() {
                return u32::try_from(q).ok();
            }
            // Whole floats such as `5.0`.
            let f = n.as_f64()?;
            if f >= 0.0 && f.fract() == 0.0 && f <= f64::from(u32::MAX) {
                Some(f as u32)
            } else {
                None
            }
        }
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

/// Result of turning the raw feed into typed records.
#[derive(Debug, Default)]
pub struct ParsedStock {
    pub records: Vec<StockRecord>,
    pub invalid: Vec<InvalidStockRecord>,
    /// SKUs of EU/Global items that failed validation. The supplier still
    /// lists them, so the catalog products carrying them are not zeroed.
    pub skipped_skus: HashSet<String>,
}

/// Convert every raw item, keeping feed order. Invalid items are collected,
/// not fatal.
#[must_use]
pub fn parse_stock(items: &[RawStockItem]) -> ParsedStock {
    let mut parsed = ParsedStock::default();
    for item in items {
        match StockRecord::try_from(item) {
            Ok(record) => parsed.records.push(record),
            Err(invalid) => {
                let eligible = StockSpec::from_item_spec(item.item_spec()).is_eligible();
                if let Some(sku) = item.sku().filter(|sku| eligible && !sku.trim().is_empty()) {
                    parsed.skipped_skus.insert(sku.to_string());
                }
                parsed.invalid.push(invalid);
            }
        }
    }
    parsed
}

/// Keep records with an eligible spec whose SKU is not blacklisted.
/// Input order is preserved.
#[must_use]
pub fn filter_stock(records: Vec<StockRecord>, blacklist: &Blacklist) -> Vec<StockRecord> {
    records
        .into_iter()
        .filter(|record| record.spec.is_eligible() && !blacklist.contains(&record.sku))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn raw(value: serde_json::Value) -> RawStockItem {
        RawStockItem::from_value(value)
    }

    fn record(sku: &str, spec: StockSpec) -> StockRecord {
        StockRecord {
            sku: sku.to_string(),
            spec,
            price: Decimal::ONE,
            stock_quantity: 1,
            model: None,
            color: None,
            category: None,
            ean: None,
            image_url: None,
            description: None,
        }
    }

    #[test]
    fn test_spec_mapping_is_exact() {
        assert_eq!(StockSpec::from_item_spec(Some("EU Spec")), StockSpec::Eu);
        assert_eq!(StockSpec::from_item_spec(Some("Global spec")), StockSpec::Global);
        assert_eq!(StockSpec::from_item_spec(Some("Global Spec")), StockSpec::Other);
        assert_eq!(StockSpec::from_item_spec(Some("eu spec")), StockSpec::Other);
        assert_eq!(StockSpec::from_item_spec(None), StockSpec::Other);
    }

    #[test]
    fn test_full_item_converts() {
        let item = raw(json!({
            "sku": "A1",
            "price": "199.90",
            "in_stock": 5,
            "model": "Galaxy S24",
            "color": "Black",
            "cat_name": "Phones",
            "ean": 8806095299871u64,
            "image": "https://img.example.com/a1.jpg",
            "properties": { "item_spec": "EU Spec", "full_name": "Samsung Galaxy S24 128GB Black" }
        }));

        let record = StockRecord::try_from(&item).unwrap();
        assert_eq!(record.sku, "A1");
        assert_eq!(record.spec, StockSpec::Eu);
        assert_eq!(record.price, dec("199.90"));
        assert_eq!(record.stock_quantity, 5);
        assert_eq!(record.ean.as_deref(), Some("8806095299871"));
        assert_eq!(record.category.as_deref(), Some("Phones"));
        assert_eq!(
            record.description.as_deref(),
            Some("Samsung Galaxy S24 128GB Black")
        );
    }

    #[test]
    fn test_numeric_price_and_string_stock() {
        let item = raw(json!({ "sku": "B2", "price": 99.5, "in_stock": "7" }));
        let record = StockRecord::try_from(&item).unwrap();
        assert_eq!(record.price, dec("99.5"));
        assert_eq!(record.stock_quantity, 7);
        assert_eq!(record.spec, StockSpec::Other);
    }

    #[test]
    fn test_whole_float_stock_accepted() {
        let item = raw(json!({ "sku": "B2", "price": 1, "in_stock": 3.0 }));
        assert_eq!(StockRecord::try_from(&item).unwrap().stock_quantity, 3);
    }

    #[test]
    fn test_missing_fields_rejected() {
        let no_sku = raw(json!({ "price": 1, "in_stock": 1 }));
        assert_eq!(StockRecord::try_from(&no_sku).unwrap_err().reason, "missing sku");

        let no_price = raw(json!({ "sku": "A1", "in_stock": 1 }));
        let err = StockRecord::try_from(&no_price).unwrap_err();
        assert_eq!(err.sku.as_deref(), Some("A1"));
        assert_eq!(err.reason, "missing price");

        let no_stock = raw(json!({ "sku": "A1", "price": 1 }));
        assert_eq!(StockRecord::try_from(&no_stock).unwrap_err().reason, "missing in_stock");
    }

    #[test]
    fn test_bad_values_rejected() {
        assert!(StockRecord::try_from(&raw(json!({ "sku": "A", "price": "n/a", "in_stock": 1 }))).is_err());
        assert!(StockRecord::try_from(&raw(json!({ "sku": "A", "price": 1, "in_stock": -2 }))).is_err());
        assert!(StockRecord::try_from(&raw(json!({ "sku": "A", "price": 1, "in_stock": 1.5 }))).is_err());
        assert!(StockRecord::try_from(&raw(json!({ "sku": "A", "price": 1, "in_stock": true }))).is_err());
    }

    #[test]
    fn test_parse_stock_keeps_order_and_collects_invalid() {
        let items = vec![
            raw(json!({ "sku": "A1", "price": 1, "in_stock": 1 })),
            raw(json!({ "price": 1, "in_stock": 1 })),
            raw(json!({ "sku": "C3", "price": 1, "in_stock": 0 })),
        ];
        let parsed = parse_stock(&items);
        let skus: Vec<_> = parsed.records.iter().map(|r| r.sku.as_str()).collect();
        assert_eq!(skus, vec!["A1", "C3"]);
        assert_eq!(parsed.invalid.len(), 1);
    }

    #[test]
    fn test_non_string_sku_rejected() {
        let err = StockRecord::try_from(&raw(json!({ "sku": 12345, "price": 1, "in_stock": 1 })))
            .unwrap_err();
        assert_eq!(err.sku, None);
        assert!(err.reason.starts_with("sku is not a string"));
    }

    #[test]
    fn test_empty_properties_array_means_other_spec() {
        let item = raw(json!({ "sku": "A1", "price": 1, "in_stock": 1, "properties": [] }));
        let record = StockRecord::try_from(&item).unwrap();
        assert_eq!(record.spec, StockSpec::Other);
        assert_eq!(record.description, None);
    }

    #[test]
    fn test_skipped_skus_only_from_eligible_items() {
        let items = vec![
            raw(json!({ "sku": "A1", "price": "call us", "in_stock": 5, "properties": { "item_spec": "EU Spec" } })),
            raw(json!({ "sku": "B2", "price": 1, "in_stock": -1, "properties": { "item_spec": "Global spec" } })),
            raw(json!({ "sku": "C3", "price": "n/a", "in_stock": 1, "properties": { "item_spec": "Other" } })),
            raw(json!({ "sku": 12345, "price": 1, "in_stock": 1, "properties": { "item_spec": "EU Spec" } })),
        ];
        let parsed = parse_stock(&items);

        assert!(parsed.records.is_empty());
        assert_eq!(parsed.invalid.len(), 4);
        let mut skipped: Vec<_> = parsed.skipped_skus.iter().map(String::as_str).collect();
        skipped.sort_unstable();
        assert_eq!(skipped, vec!["A1", "B2"]);
    }

    #[test]
    fn test_filter_drops_other_spec_and_blacklisted() {
        let records = vec![
            record("A1", StockSpec::Eu),
            record("B2", StockSpec::Other),
            record("C3", StockSpec::Global),
            record("D4", StockSpec::Eu),
        ];
        let filtered = filter_stock(records, &Blacklist::parse("D4"));
        let skus: Vec<_> = filtered.iter().map(|r| r.sku.as_str()).collect();
        assert_eq!(skus, vec!["A1", "C3"]);
    }

    proptest! {
        #[test]
        fn prop_unknown_spec_never_passes(spec in ".*") {
            prop_assume!(spec != "EU Spec" && spec != "Global spec");
            let r = record("A1", StockSpec::from_item_spec(Some(&spec)));
            prop_assert!(filter_stock(vec![r], &Blacklist::default()).is_empty());
        }

        #[test]
        fn prop_blacklisted_never_passes(sku in "[A-Za-z0-9_-]{1,12}", global in any::<bool>()) {
            let spec = if global { StockSpec::Global } else { StockSpec::Eu };
            let blacklist: Blacklist = std::iter::once(sku.clone()).collect();
            prop_assert!(filter_stock(vec![record(&sku, spec)], &blacklist).is_empty());
        }
    }
}
