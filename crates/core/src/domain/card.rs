use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::price::{PriceQuote, PriceTable};

/// One catalog entry. Fields the UI does not interpret are kept in `extra`
/// so the record renders exactly as the catalog returned it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CardRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set: Option<CardSet>,
    #[serde(default)]
    pub number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rarity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tcgplayer: Option<VendorPrices>,
    #[serde(default, skip_deserializing)]
    pub selected_price: Option<PriceQuote>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CardRecord {
    pub fn set_name(&self) -> Option<&str> {
        self.set.as_ref().map(|set| set.name.as_str()).filter(|name| !name.is_empty())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CardSet {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `tcgplayer` block: one shared timestamp plus a per-variant price table.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VendorPrices {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prices: Option<PriceTable>,
}

/// Envelope of one catalog page.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CardPage {
    #[serde(default)]
    pub data: Vec<CardRecord>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default, rename = "pageSize")]
    pub page_size: Option<u32>,
    #[serde(default, rename = "totalCount")]
    pub total_count: Option<u64>,
}
