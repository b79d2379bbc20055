//! Product catalog: subscription products and member-type pricing tiers.

mod product;
mod tier;

pub use product::{SeatConfig, SubscriptionProduct, SubscriptionScope, TermLength, TermUnit};
pub use tier::PricingTier;
