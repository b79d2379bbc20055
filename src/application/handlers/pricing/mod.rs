//! Pricing queries.

mod resolve_price;

pub use resolve_price::{ResolvePriceHandler, ResolvePriceQuery, ResolvePriceResult};
