//! Price resolution for a product, member type and date.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::catalog::{PricingTier, SubscriptionProduct, SubscriptionScope};
use crate::domain::foundation::{MemberType, TierId};

/// Label used when no tier applies.
pub const STANDARD_LABEL: &str = "Standard";

/// Price a holder pays for one term of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPrice {
    pub price: Decimal,
    pub currency: String,
    pub tier_label: String,
    pub requires_verification: bool,
    /// Tier that supplied the price, `None` for the base price.
    pub tier_id: Option<TierId>,
}

/// Enterprise seat quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatQuote {
    pub seats: u32,
    pub included_seats: u32,
    pub additional_seats: u32,
    pub additional_seat_price: Decimal,
    pub total: Decimal,
}

/// Resolves member-type tier pricing.
///
/// Overlapping tiers for the same member type are a data-quality anomaly;
/// the tier created first wins so repeated calls always agree.
#[derive(Debug, Default, Clone, Copy)]
pub struct PricingResolver;

impl PricingResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolves the price of `product` for `member_type` on `as_of`.
    ///
    /// `tiers` may contain tiers of other products; they are ignored.
    pub fn resolve(
        &self,
        product: &SubscriptionProduct,
        tiers: &[PricingTier],
        member_type: Option<&MemberType>,
        as_of: NaiveDate,
    ) -> ResolvedPrice {
        let tier = member_type.and_then(|member_type| {
            tiers
                .iter()
                .filter(|t| t.product_id == product.id && t.applies_to(member_type, as_of))
                .min_by_key(|t| t.created_seq)
        });

        match tier {
            Some(tier) => ResolvedPrice {
                price: tier.price,
                currency: product.currency.clone(),
                tier_label: tier.label.clone(),
                requires_verification: tier.requires_verification,
                tier_id: Some(tier.id),
            },
            None => ResolvedPrice {
                price: product.base_price,
                currency: product.currency.clone(),
                tier_label: STANDARD_LABEL.to_string(),
                requires_verification: false,
                tier_id: None,
            },
        }
    }

    /// Quotes an enterprise product for `seats` seats.
    ///
    /// The resolved price covers the included seats; each seat beyond them
    /// costs the product's additional-seat price. Individual products and
    /// enterprise products without seat configuration cost the resolved
    /// price regardless of seat count.
    pub fn quote_seats(
        &self,
        product: &SubscriptionProduct,
        resolved: &ResolvedPrice,
        seats: u32,
    ) -> SeatQuote {
        match (&product.scope, &product.seats) {
            (SubscriptionScope::Enterprise, Some(config)) => {
                let additional = seats.saturating_sub(config.included_seats);
                SeatQuote {
                    seats,
                    included_seats: config.included_seats,
                    additional_seats: additional,
                    additional_seat_price: config.additional_seat_price,
                    total: resolved.price
                        + config.additional_seat_price * Decimal::from(additional),
                }
            }
            _ => SeatQuote {
                seats,
                included_seats: seats,
                additional_seats: 0,
                additional_seat_price: Decimal::ZERO,
                total: resolved.price,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{SeatConfig, TermLength};
    use crate::domain::foundation::ProductId;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn product() -> SubscriptionProduct {
        SubscriptionProduct::new(
            ProductId::new(),
            "Regular Membership",
            dec!(300),
            "USD",
            TermLength::years(1),
        )
    }

    fn tier(
        product: &SubscriptionProduct,
        member_type: &str,
        label: &str,
        price: Decimal,
        seq: u64,
    ) -> PricingTier {
        PricingTier {
            id: TierId::new(),
            product_id: product.id,
            member_type: MemberType::new(member_type).unwrap(),
            label: label.to_string(),
            price,
            valid_from: None,
            valid_to: None,
            requires_verification: false,
            created_seq: seq,
        }
    }

    #[test]
    fn no_member_type_uses_base_price() {
        let p = product();
        let tiers = vec![tier(&p, "student", "Student", dec!(100), 1)];
        let resolved = PricingResolver::new().resolve(&p, &tiers, None, date(2024, 1, 1));
        assert_eq!(resolved.price, dec!(300));
        assert_eq!(resolved.tier_label, "Standard");
        assert!(resolved.tier_id.is_none());
    }

    #[test]
    fn matching_tier_overrides_base_price() {
        let p = product();
        let mut student = tier(&p, "student", "Student", dec!(100), 1);
        student.requires_verification = true;
        let tiers = vec![student];
        let mt = MemberType::new("student").unwrap();
        let resolved = PricingResolver::new().resolve(&p, &tiers, Some(&mt), date(2024, 1, 1));
        assert_eq!(resolved.price, dec!(100));
        assert_eq!(resolved.tier_label, "Student");
        assert!(resolved.requires_verification);
    }

    #[test]
    fn expired_tier_falls_back_to_standard() {
        let p = product();
        let mut promo = tier(&p, "student", "Student 2023", dec!(90), 1);
        promo.valid_from = Some(date(2023, 1, 1));
        promo.valid_to = Some(date(2023, 12, 31));
        let mt = MemberType::new("student").unwrap();
        let resolver = PricingResolver::new();

        assert_eq!(resolver.resolve(&p, &[promo.clone()], Some(&mt), date(2023, 12, 31)).price, dec!(90));
        let resolved = resolver.resolve(&p, &[promo], Some(&mt), date(2024, 1, 1));
        assert_eq!(resolved.price, dec!(300));
        assert_eq!(resolved.tier_label, STANDARD_LABEL);
    }

    #[test]
    fn tiers_of_other_products_are_ignored() {
        let p = product();
        let other = product();
        let tiers = vec![tier(&other, "student", "Student", dec!(100), 1)];
        let mt = MemberType::new("student").unwrap();
        let resolved = PricingResolver::new().resolve(&p, &tiers, Some(&mt), date(2024, 1, 1));
        assert_eq!(resolved.price, dec!(300));
    }

    #[test]
    fn overlapping_tiers_pick_earliest_created_every_time() {
        let p = product();
        let later = tier(&p, "retired", "Retired (new)", dec!(150), 7);
        let earlier = tier(&p, "retired", "Retired", dec!(175), 3);
        let tiers = vec![later, earlier.clone()];
        let mt = MemberType::new("retired").unwrap();
        let resolver = PricingResolver::new();

        for _ in 0..5 {
            let resolved = resolver.resolve(&p, &tiers, Some(&mt), date(2024, 5, 1));
            assert_eq!(resolved.tier_id, Some(earlier.id));
            assert_eq!(resolved.price, dec!(175));
        }
    }

    #[test]
    fn enterprise_quote_charges_additional_seats() {
        let mut p = product();
        p.scope = SubscriptionScope::Enterprise;
        p.seats = Some(SeatConfig {
            included_seats: 5,
            additional_seat_price: dec!(40),
        });
        let resolver = PricingResolver::new();
        let resolved = resolver.resolve(&p, &[], None, date(2024, 1, 1));

        let quote = resolver.quote_seats(&p, &resolved, 8);
        assert_eq!(quote.additional_seats, 3);
        assert_eq!(quote.total, dec!(420));

        let quote = resolver.quote_seats(&p, &resolved, 2);
        assert_eq!(quote.additional_seats, 0);
        assert_eq!(quote.total, dec!(300));
    }

    #[test]
    fn individual_quote_ignores_seat_count() {
        let p = product();
        let resolver = PricingResolver::new();
        let resolved = resolver.resolve(&p, &[], None, date(2024, 1, 1));
        assert_eq!(resolver.quote_seats(&p, &resolved, 12).total, dec!(300));
    }
}
