//! Catalog query-string construction.
//!
//! Each populated filter becomes a `field:"value"` clause. Clauses are joined
//! by a single space, which the catalog treats as an implicit AND. Values are
//! quoted but not escaped; the catalog's tokenizer does literal matching
//! inside the quotes.

use crate::domain::filter::FilterSet;

/// Catalog field names in the order their clauses are emitted.
pub const CLAUSE_FIELDS: [&str; 5] = ["name", "set.name", "number", "rarity", "types"];

pub fn build_query(filters: &FilterSet) -> String {
    let values = [
        filters.name.as_deref(),
        filters.set_name.as_deref(),
        filters.number.as_deref(),
        filters.rarity.as_deref(),
        filters.card_type.as_deref(),
    ];

    CLAUSE_FIELDS
        .iter()
        .zip(values)
        .filter_map(|(field, value)| {
            let value = value.filter(|value| !value.trim().is_empty())?;
            Some(format!("{field}:\"{value}\""))
        })
        .collect::<Vec<_>>()
        .join(" ")
}
