use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Figures one vendor reports for a single printing variant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VariantPrices {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mid: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market: Option<f64>,
    #[serde(default, rename = "directLow", skip_serializing_if = "Option::is_none")]
    pub direct_low: Option<f64>,
}

impl VariantPrices {
    /// A variant is usable only if at least one of market/mid/low/high is reported.
    pub fn has_figure(&self) -> bool {
        [self.market, self.mid, self.low, self.high].iter().any(Option::is_some)
    }
}

/// Variant label → prices, in the order the vendor sent them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PriceTable(Vec<(String, VariantPrices)>);

impl PriceTable {
    pub fn get(&self, label: &str) -> Option<&VariantPrices> {
        self.0.iter().find(|(candidate, _)| candidate == label).map(|(_, prices)| prices)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &VariantPrices)> {
        self.0.iter().map(|(label, prices)| (label.as_str(), prices))
    }
}

impl<L: Into<String>> FromIterator<(L, VariantPrices)> for PriceTable {
    fn from_iter<I: IntoIterator<Item = (L, VariantPrices)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(label, prices)| (label.into(), prices)).collect())
    }
}

impl Serialize for PriceTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, prices) in &self.0 {
            map.serialize_entry(label, prices)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PriceTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = PriceTable;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of variant labels to price entries")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<PriceTable, A::Error> {
                let mut entries: Vec<(String, VariantPrices)> =
                    Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((label, prices)) =
                    access.next_entry::<String, Option<VariantPrices>>()?
                {
                    let prices = prices.unwrap_or_default();
                    match entries.iter_mut().find(|(existing, _)| *existing == label) {
                        // Later duplicates win but keep the first position.
                        Some((_, slot)) => *slot = prices,
                        None => entries.push((label, prices)),
                    }
                }
                Ok(PriceTable(entries))
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

/// The single representative price shown for a card.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub variant: String,
    pub market: Option<f64>,
    pub mid: Option<f64>,
    pub low: Option<f64>,
    pub high: Option<f64>,
    pub updated_at: Option<String>,
}
