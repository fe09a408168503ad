pub mod config;
pub mod domain;
pub mod errors;
pub mod outlook;
pub mod pricing;
pub mod query;

pub use domain::card::{CardPage, CardRecord, CardSet, VendorPrices};
pub use domain::filter::FilterSet;
pub use domain::price::{PriceQuote, PriceTable, VariantPrices};
pub use errors::{ApplicationError, InterfaceError};
pub use outlook::{cache_key, OutlookCache, OutlookPayload};
pub use pricing::select_price;
pub use query::build_query;
