//! Catalog products.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use super::{Price, ProductId, Quantity, QuantityError};

/// A product as listed by the remote catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub price: Price,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub available_items: u32,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Only used for ordering; a timestamp that cannot be read counts as absent.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Text(String),
    #[allow(dead_code)]
    Other(IgnoredAny),
}

/// Accept RFC 3339, or a local date-time without offset read as UTC.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(RawTimestamp::Text(raw)) = Option::<RawTimestamp>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }
    Ok(raw.parse::<NaiveDateTime>().ok().map(|naive| naive.and_utc()))
}

impl Product {
    /// Whether any units are left to buy.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.available_items > 0
    }

    /// Validate a requested quantity against this product's stock.
    ///
    /// # Errors
    ///
    /// Returns an error if `units` is zero or exceeds the available items.
    pub fn quantity(&self, units: u32) -> Result<Quantity, QuantityError> {
        Quantity::within_stock(units, self.available_items)
    }

    /// The editable fields of this product, for a replace request.
    #[must_use]
    pub fn to_draft(&self) -> ProductDraft {
        ProductDraft {
            name: self.name.clone(),
            category: self.category.clone(),
            price: self.price,
            description: self.description.clone().unwrap_or_default(),
            manufacturer: self.manufacturer.clone(),
            available_items: self.available_items,
            image_url: self.image_url.clone(),
        }
    }
}

/// Body for creating or replacing a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub category: String,
    pub price: Price,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    pub available_items: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}
