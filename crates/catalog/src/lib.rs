//! Pokémon TCG catalog access.
//!
//! One GET per results page, one timeout per call, no retries. Every fetched
//! record is annotated with its representative price before it is returned.

pub mod client;

pub use client::{CardCatalog, CatalogError, CatalogSettings, HttpCatalogClient};
