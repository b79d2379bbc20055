//! Subscription product catalog definitions.

use chrono::{Days, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::domain::foundation::{MemberType, ProductId, ValidationError};

/// Unit of a term length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermUnit {
    Day,
    Month,
    Year,
}

/// Length of one entitlement term, e.g. 12 months or 2 years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TermLength {
    pub count: u32,
    pub unit: TermUnit,
}

impl TermLength {
    pub const fn days(count: u32) -> Self {
        Self { count, unit: TermUnit::Day }
    }

    pub const fn months(count: u32) -> Self {
        Self { count, unit: TermUnit::Month }
    }

    pub const fn years(count: u32) -> Self {
        Self { count, unit: TermUnit::Year }
    }

    /// Adds this length to a date using calendar arithmetic.
    ///
    /// Month and year additions clamp to the last day of the target month
    /// (Jan 31 + 1 month = Feb 29 in a leap year). Returns `None` when the
    /// result falls outside chrono's supported range.
    pub fn add_to(&self, date: NaiveDate) -> Option<NaiveDate> {
        match self.unit {
            TermUnit::Day => date.checked_add_days(Days::new(u64::from(self.count))),
            TermUnit::Month => date.checked_add_months(Months::new(self.count)),
            TermUnit::Year => date.checked_add_months(Months::new(self.count.checked_mul(12)?)),
        }
    }

    /// Returns the last day of a term that begins on `begin`.
    ///
    /// A one-year term starting 2024-01-01 ends 2024-12-31.
    pub fn term_end_from(&self, begin: NaiveDate) -> Option<NaiveDate> {
        self.add_to(begin)?.pred_opt()
    }
}

impl fmt::Display for TermLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.unit {
            TermUnit::Day => "day",
            TermUnit::Month => "month",
            TermUnit::Year => "year",
        };
        let plural = if self.count == 1 { "" } else { "s" };
        write!(f, "{} {}{}", self.count, unit, plural)
    }
}

/// Who may hold a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionScope {
    /// Held by individual members.
    #[default]
    Individual,
    /// Held by organizations, typically with seats.
    Enterprise,
}

/// Seat configuration for enterprise products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatConfig {
    /// Seats covered by the base price.
    pub included_seats: u32,
    /// Price per seat beyond the included ones.
    pub additional_seat_price: Decimal,
}

/// Catalog definition of a subscription product.
///
/// Immutable per version: editing the catalog never alters participations
/// that already locked a price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionProduct {
    pub id: ProductId,
    pub name: String,
    pub base_price: Decimal,
    /// ISO 4217 currency code.
    pub currency: String,
    pub term: TermLength,
    #[serde(default = "default_true")]
    pub renewable: bool,
    /// Days after term end during which renewal may still be initiated.
    #[serde(default)]
    pub renewal_window_days: u32,
    /// Requires the holder to have an active base membership.
    #[serde(default)]
    pub member_only: bool,
    /// Empty means every member type is accepted.
    #[serde(default)]
    pub eligible_member_types: BTreeSet<MemberType>,
    #[serde(default)]
    pub scope: SubscriptionScope,
    #[serde(default)]
    pub seats: Option<SeatConfig>,
    #[serde(default)]
    pub min_age: Option<u32>,
    #[serde(default)]
    pub max_age: Option<u32>,
    /// Flat fee added to plan changes into this product. Never prorated.
    #[serde(default)]
    pub change_fee: Option<Decimal>,
}

fn default_true() -> bool {
    true
}

impl SubscriptionProduct {
    /// Creates a renewable individual product with no restrictions.
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        base_price: Decimal,
        currency: impl Into<String>,
        term: TermLength,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            base_price,
            currency: currency.into(),
            term,
            renewable: true,
            renewal_window_days: 0,
            member_only: false,
            eligible_member_types: BTreeSet::new(),
            scope: SubscriptionScope::Individual,
            seats: None,
            min_age: None,
            max_age: None,
            change_fee: None,
        }
    }

    /// Validates catalog data.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ValidationError::invalid_format(
                "currency",
                format!("'{}' is not an ISO 4217 code", self.currency),
            ));
        }
        if self.base_price.is_sign_negative() {
            return Err(ValidationError::invalid_format("base_price", "must not be negative"));
        }
        if self.term.count == 0 {
            return Err(ValidationError::out_of_range("term.count", 1, i64::from(u32::MAX), 0));
        }
        if let (Some(min), Some(max)) = (self.min_age, self.max_age) {
            if min > max {
                return Err(ValidationError::invalid_format(
                    "min_age",
                    format!("minimum age {} exceeds maximum age {}", min, max),
                ));
            }
        }
        if self.scope == SubscriptionScope::Individual && self.seats.is_some() {
            return Err(ValidationError::invalid_format(
                "seats",
                "seat configuration is only valid for enterprise products",
            ));
        }
        Ok(())
    }
}
