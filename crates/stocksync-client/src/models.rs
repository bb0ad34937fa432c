//! Wire models for the supplier feed and the storefront catalog.
//!
//! Feed items are kept as raw JSON values: the supplier's types drift between
//! records (numeric SKUs, `"properties": []`), and one odd record must not
//! fail the whole feed. Typed validation happens in the engine.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Body of `GET getStock/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockFeedResponse {
    #[serde(default, deserialize_with = "lenient_items")]
    pub stock: Vec<RawStockItem>,
}

/// Non-object entries become empty items, rejected later as missing a SKU.
fn lenient_items<'de, D>(deserializer: D) -> Result<Vec<RawStockItem>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<Value>::deserialize(deserializer)?;
    Ok(values.into_iter().map(RawStockItem::from_value).collect())
}

/// One entry of the feed's `stock` array, as sent by the supplier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawStockItem {
    #[serde(default)]
    pub sku: Option<Value>,
    /// Number or numeric string.
    #[serde(default)]
    pub price: Option<Value>,
    /// Number or numeric string.
    #[serde(default)]
    pub in_stock: Option<Value>,
    #[serde(default)]
    pub model: Option<Value>,
    #[serde(default)]
    pub color: Option<Value>,
    #[serde(default)]
    pub cat_name: Option<Value>,
    /// EANs arrive as strings or bare numbers depending on the product.
    #[serde(default)]
    pub ean: Option<Value>,
    #[serde(default)]
    pub image: Option<Value>,
    /// Usually an object with `item_spec` and `full_name`; an empty array
    /// when the supplier has no properties for the item.
    #[serde(default)]
    pub properties: Option<Value>,
}

impl RawStockItem {
    /// Read an item from any JSON value. Anything that is not an object
    /// yields an empty item.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }

    /// SKU when the supplier sent it as a string.
    #[must_use]
    pub fn sku(&self) -> Option<&str> {
        self.sku.as_ref().and_then(Value::as_str)
    }

    /// Entry of the nested `properties` object.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.as_ref()?.as_object()?.get(key)
    }

    /// `properties.item_spec` when it is a string.
    #[must_use]
    pub fn item_spec(&self) -> Option<&str> {
        self.property("item_spec").and_then(Value::as_str)
    }
}

/// Product as listed by `GET products`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: u64,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub stock_quantity: Option<i64>,
    /// The platform sends prices as strings; empty when unset.
    #[serde(default)]
    pub regular_price: Option<String>,
    #[serde(default)]
    pub meta_data: Vec<MetaData>,
}

impl CatalogProduct {
    /// SKU, treating empty or blank values as absent.
    #[must_use]
    pub fn sku(&self) -> Option<&str> {
        self.sku
            .as_deref()
            .map(str::trim)
            .filter(|sku| !sku.is_empty())
    }
}

/// Key/value side-channel field on a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaData {
    pub key: String,
    pub value: Value,
}

impl MetaData {
    #[must_use]
    pub fn text(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Value::String(value.into()),
        }
    }
}

/// Category reference by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub name: String,
}

/// Image reference by source URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub src: String,
}

/// Body of `POST products`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(rename = "type")]
    pub product_type: String,
    pub regular_price: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<CategoryRef>,
    pub stock_quantity: u32,
    pub manage_stock: bool,
    pub sku: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ImageRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_data: Option<Vec<MetaData>>,
}

/// Body of `PUT products/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub stock_quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_data: Option<Vec<MetaData>>,
}

impl ProductUpdate {
    /// Update that only sets the stock level.
    #[must_use]
    pub fn stock(quantity: u32) -> Self {
        Self {
            stock_quantity: quantity,
            meta_data: None,
        }
    }
}

/// Form body of `POST reserveArticle/new/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReservationRequest {
    pub sku: String,
    pub qty: u32,
    pub warranty: u8,
}
