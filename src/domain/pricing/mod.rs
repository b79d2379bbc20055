//! Pricing - member-type tier resolution and seat quotes.

mod resolver;

pub use resolver::{PricingResolver, ResolvedPrice, SeatQuote, STANDARD_LABEL};
