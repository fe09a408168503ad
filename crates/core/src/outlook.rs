//! Content-addressed memoization of generated collector outlooks.
//!
//! The key covers exactly the card identity fields, the selected price and
//! the instruction text. Request context (page, filters, card id) never
//! reaches the key, so the same card seen from two different searches shares
//! one entry.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::card::CardRecord;

/// Card fields the outlook is generated from, flattened the way the search
/// page posts them back.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OutlookPayload {
    pub card_name: Option<String>,
    pub card_set: Option<String>,
    pub card_number: Option<String>,
    pub card_rarity: Option<String>,
    pub price_variant: Option<String>,
    pub price_market: Option<f64>,
    pub price_mid: Option<f64>,
    pub price_low: Option<f64>,
    pub price_high: Option<f64>,
    pub price_updated: Option<String>,
}

/// Hidden form input carrying one payload field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FormField {
    pub name: &'static str,
    pub value: String,
}

impl OutlookPayload {
    pub fn from_card(card: &CardRecord) -> Self {
        let quote = card.selected_price.as_ref();
        Self {
            card_name: clean(Some(card.name.as_str())),
            card_set: clean(card.set_name()),
            card_number: clean(Some(card.number.as_str())),
            card_rarity: clean(card.rarity.as_deref()),
            price_variant: quote.map(|quote| quote.variant.clone()),
            price_market: quote.and_then(|quote| quote.market),
            price_mid: quote.and_then(|quote| quote.mid),
            price_low: quote.and_then(|quote| quote.low),
            price_high: quote.and_then(|quote| quote.high),
            price_updated: quote.and_then(|quote| quote.updated_at.clone()),
        }
    }

    /// Field values in hash order, `None` where the field is absent.
    fn ordered_values(&self) -> [(&'static str, Option<String>); 10] {
        [
            ("card_name", clean(self.card_name.as_deref())),
            ("card_set", clean(self.card_set.as_deref())),
            ("card_number", clean(self.card_number.as_deref())),
            ("card_rarity", clean(self.card_rarity.as_deref())),
            ("price_variant", clean(self.price_variant.as_deref())),
            ("price_market", self.price_market.map(format_figure)),
            ("price_mid", self.price_mid.map(format_figure)),
            ("price_low", self.price_low.map(format_figure)),
            ("price_high", self.price_high.map(format_figure)),
            ("price_updated", clean(self.price_updated.as_deref())),
        ]
    }

    /// Stable hash input: a JSON array of every field in fixed order, `null`
    /// where absent. Field boundaries survive any `|` or quote inside a value.
    pub fn canonical_string(&self) -> String {
        let values = self.ordered_values().map(|(_, value)| value);
        serde_json::to_string(&values).unwrap_or_else(|_| String::from("[]"))
    }

    /// Values to round-trip through the analyze form unchanged.
    pub fn form_fields(&self) -> Vec<FormField> {
        self.ordered_values()
            .into_iter()
            .map(|(name, value)| FormField { name, value: value.unwrap_or_default() })
            .collect()
    }
}

/// Parses a posted price figure; blank, `None` and unparsable values are absent.
pub fn parse_price_figure(raw: Option<&str>) -> Option<f64> {
    let raw = raw?.trim();
    if raw.is_empty() || raw == "None" {
        return None;
    }
    raw.parse::<f64>().ok().filter(|value| value.is_finite())
}

pub fn format_figure(value: f64) -> String {
    value.to_string()
}

pub fn cache_key(payload: &OutlookPayload, instructions: &str) -> String {
    format!("{}|{}", sha256_hex(&payload.canonical_string()), sha256_hex(instructions))
}

/// User prompt for one card: identity lines always, price lines only when present.
pub fn build_prompt(payload: &OutlookPayload) -> String {
    let identity = |value: &Option<String>| clean(value.as_deref()).unwrap_or_else(|| "N/A".to_string());

    let mut details = vec![
        format!("Name: {}", identity(&payload.card_name)),
        format!("Set: {}", identity(&payload.card_set)),
        format!("Number: {}", identity(&payload.card_number)),
        format!("Rarity: {}", identity(&payload.card_rarity)),
    ];

    if let Some(variant) = clean(payload.price_variant.as_deref()) {
        details.push(format!("TCGplayer Variant: {variant}"));
    }
    let figures = [
        ("Market", payload.price_market),
        ("Mid", payload.price_mid),
        ("Low", payload.price_low),
        ("High", payload.price_high),
    ];
    for (label, value) in figures {
        if let Some(value) = value {
            details.push(format!("{label}: {}", format_figure(value)));
        }
    }
    if let Some(updated) = clean(payload.price_updated.as_deref()) {
        details.push(format!("Prices Updated: {updated}"));
    }

    format!("Card details:\n{}\n\nReturn 2–4 sentences.", details.join("\n"))
}

fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn clean(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|value| !value.is_empty()).map(ToString::to_string)
}

/// Process-local, unbounded outlook store. Entries never expire.
#[derive(Debug, Default)]
pub struct OutlookCache {
    entries: RwLock<HashMap<String, String>>,
}

impl OutlookCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).get(key).cloned()
    }

    pub fn insert(&self, key: String, outlook: String) {
        self.entries.write().unwrap_or_else(PoisonError::into_inner).insert(key, outlook);
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
