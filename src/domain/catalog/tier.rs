//! Member-type pricing tiers.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MemberType, ProductId, TierId};

/// Scoped override of a product's price for one member type.
///
/// `created_seq` is the tier's position in creation order; overlapping
/// tiers are resolved by the lowest sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTier {
    pub id: TierId,
    pub product_id: ProductId,
    pub member_type: MemberType,
    pub label: String,
    pub price: Decimal,
    #[serde(default)]
    pub valid_from: Option<NaiveDate>,
    #[serde(default)]
    pub valid_to: Option<NaiveDate>,
    #[serde(default)]
    pub requires_verification: bool,
    pub created_seq: u64,
}

impl PricingTier {
    /// True when `as_of` falls inside the tier's validity window.
    /// Open bounds are unbounded.
    pub fn is_valid_on(&self, as_of: NaiveDate) -> bool {
        self.valid_from.map_or(true, |from| from <= as_of)
            && self.valid_to.map_or(true, |to| to >= as_of)
    }

    /// True when this tier applies to `member_type` on `as_of`.
    pub fn applies_to(&self, member_type: &MemberType, as_of: NaiveDate) -> bool {
        &self.member_type == member_type && self.is_valid_on(as_of)
    }
}
