//! Picks the representative price shown next to each card.

use crate::domain::card::{CardRecord, VendorPrices};
use crate::domain::price::{PriceQuote, VariantPrices};

/// Variant labels tried first, most collectible printing first.
pub const VARIANT_PREFERENCE: [&str; 7] = [
    "holofoil",
    "reverseHolofoil",
    "1stEditionHolofoil",
    "1stEdition",
    "normal",
    "unlimitedHolofoil",
    "unlimited",
];

/// Returns the first preferred variant carrying a figure, else the first
/// variant in vendor order carrying one, else `None`.
pub fn select_price(vendor: Option<&VendorPrices>) -> Option<PriceQuote> {
    let vendor = vendor?;
    let table = vendor.prices.as_ref()?;

    let preferred: Option<(&str, &VariantPrices)> = VARIANT_PREFERENCE
        .iter()
        .filter_map(|label| table.get(label).map(|prices| (*label, prices)))
        .find(|(_, prices)| prices.has_figure());
    let (label, prices) =
        preferred.or_else(|| table.iter().find(|(_, prices)| prices.has_figure()))?;

    Some(quote_from(label, prices, vendor.updated_at.clone()))
}

/// Fills `selected_price` on every record of a fetched page.
pub fn annotate(cards: &mut [CardRecord]) {
    for card in cards {
        card.selected_price = select_price(card.tcgplayer.as_ref());
    }
}

fn quote_from(label: &str, prices: &VariantPrices, updated_at: Option<String>) -> PriceQuote {
    PriceQuote {
        variant: label.to_string(),
        market: prices.market,
        mid: prices.mid,
        low: prices.low,
        high: prices.high,
        updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::{annotate, select_price};
    use crate::domain::card::{CardRecord, VendorPrices};
    use crate::domain::price::{PriceTable, VariantPrices};

    fn vendor(json: &str) -> VendorPrices {
        serde_json::from_str(json).expect("vendor block should parse")
    }

    #[test]
    fn absent_or_empty_table_has_no_price() {
        assert_eq!(select_price(None), None);
        assert_eq!(select_price(Some(&VendorPrices::default())), None);
        assert_eq!(select_price(Some(&vendor(r#"{"prices": {}}"#))), None);
    }

    #[test]
    fn preferred_variant_without_figures_is_skipped() {
        let block = vendor(
            r#"{"updatedAt": "2024/03/02", "prices": {
                "normal": {"market": 1.0},
                "holofoil": {"market": null, "mid": null, "low": null, "high": null}
            }}"#,
        );

        let quote = select_price(Some(&block)).expect("normal should be chosen");
        assert_eq!(quote.variant, "normal");
        assert_eq!(quote.market, Some(1.0));
        assert_eq!(quote.updated_at.as_deref(), Some("2024/03/02"));
    }

    #[test]
    fn unknown_variant_is_used_as_fallback() {
        let block = vendor(r#"{"prices": {"unknownVariant": {"low": 2.5}}}"#);

        let quote = select_price(Some(&block)).expect("fallback should be chosen");
        assert_eq!(quote.variant, "unknownVariant");
        assert_eq!(quote.low, Some(2.5));
        assert_eq!(quote.market, None);
        assert_eq!(quote.updated_at, None);
    }

    #[test]
    fn preference_order_beats_vendor_order() {
        let block = vendor(
            r#"{"prices": {
                "normal": {"market": 0.5},
                "reverseHolofoil": {"market": 2.0},
                "holofoil": {"high": 9.0}
            }}"#,
        );

        let quote = select_price(Some(&block)).expect("holofoil should be chosen");
        assert_eq!(quote.variant, "holofoil");
        assert_eq!(quote.high, Some(9.0));
        assert_eq!(quote.market, None);
    }

    #[test]
    fn fallback_follows_vendor_order() {
        let table: PriceTable = vec![
            ("zeta", VariantPrices::default()),
            ("beta", VariantPrices { mid: Some(4.0), ..VariantPrices::default() }),
            ("alpha", VariantPrices { mid: Some(5.0), ..VariantPrices::default() }),
        ]
        .into_iter()
        .collect();
        let block = VendorPrices { prices: Some(table), ..VendorPrices::default() };

        assert_eq!(select_price(Some(&block)).map(|quote| quote.variant), Some("beta".to_string()));
    }

    #[test]
    fn table_without_any_figures_has_no_price() {
        let block = vendor(r#"{"prices": {"holofoil": {}, "oddity": {"directLow": 1.0}}}"#);
        assert_eq!(select_price(Some(&block)), None);
    }

    #[test]
    fn selection_is_stable_for_identical_tables() {
        let json = r#"{"prices": {"normal": {"low": 1.0}, "unlimited": {"low": 2.0}}}"#;
        assert_eq!(select_price(Some(&vendor(json))), select_price(Some(&vendor(json))));
    }

    #[test]
    fn annotate_sets_selected_price_per_card() {
        let mut cards = vec![
            CardRecord {
                id: "a".to_string(),
                tcgplayer: Some(vendor(r#"{"prices": {"normal": {"market": 3.0}}}"#)),
                ..CardRecord::default()
            },
            CardRecord { id: "b".to_string(), ..CardRecord::default() },
        ];

        annotate(&mut cards);

        assert_eq!(cards[0].selected_price.as_ref().map(|quote| quote.market), Some(Some(3.0)));
        assert!(cards[1].selected_price.is_none());
    }
}
