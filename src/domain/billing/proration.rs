//! Proration of mid-term price changes.
//!
//! Computes the credit for the unused part of the old price, the charge for
//! the same span at the new price, and the signed net adjustment. All
//! arithmetic is exact decimal; rounding to currency precision happens once
//! on the final figures, half-to-even.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Inputs for one proration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProrationInput {
    pub old_price: Decimal,
    pub new_price: Decimal,
    pub term_start: NaiveDate,
    pub term_end: NaiveDate,
    pub effective_date: NaiveDate,
    /// Evaluation date. Remaining time never starts before it.
    pub today: NaiveDate,
    /// Flat fee added to the net adjustment, never prorated.
    #[serde(default)]
    pub change_fee: Option<Decimal>,
}

/// Outcome of a proration.
///
/// `net_adjustment` is positive when the customer owes more and negative
/// when a refund is due.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProrationResult {
    pub remaining_days: i64,
    pub total_days: i64,
    /// Unrounded remaining fraction of the term.
    pub factor: Decimal,
    pub credit: Decimal,
    pub charge: Decimal,
    pub change_fee: Decimal,
    pub net_adjustment: Decimal,
    /// The term had no length; every figure except the change fee is zero.
    pub underflow: bool,
}

impl ProrationResult {
    pub fn is_charge(&self) -> bool {
        self.net_adjustment > Decimal::ZERO
    }

    pub fn is_refund(&self) -> bool {
        self.net_adjustment < Decimal::ZERO
    }

    pub fn is_neutral(&self) -> bool {
        self.net_adjustment.is_zero()
    }
}

/// Proration calculator.
///
/// `remaining_days` counts the effective day itself through term end
/// (2024-07-01 to 2024-12-31 is 184 days) and is capped at `total_days`,
/// which is the plain difference between term end and term start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProrationCalculator {
    /// Decimal places of the billing currency.
    pub precision: u32,
}

impl Default for ProrationCalculator {
    fn default() -> Self {
        Self { precision: 2 }
    }
}

impl ProrationCalculator {
    pub fn with_precision(precision: u32) -> Self {
        Self { precision }
    }

    pub fn calculate(&self, input: &ProrationInput) -> ProrationResult {
        let fee = input.change_fee.unwrap_or(Decimal::ZERO);
        let total_days = (input.term_end - input.term_start).num_days();

        if total_days <= 0 {
            return ProrationResult {
                remaining_days: 0,
                total_days,
                factor: Decimal::ZERO,
                credit: Decimal::ZERO,
                charge: Decimal::ZERO,
                change_fee: self.round(fee),
                net_adjustment: self.round(fee),
                underflow: true,
            };
        }

        let start = input.today.max(input.effective_date);
        let remaining_days = ((input.term_end - start).num_days() + 1).clamp(0, total_days);

        let factor = Decimal::from(remaining_days) / Decimal::from(total_days);
        let credit = input.old_price * factor;
        let charge = input.new_price * factor;
        let net = charge - credit + fee;

        ProrationResult {
            remaining_days,
            total_days,
            factor,
            credit: self.round(credit),
            charge: self.round(charge),
            change_fee: self.round(fee),
            net_adjustment: self.round(net),
            underflow: false,
        }
    }

    fn round(&self, value: Decimal) -> Decimal {
        value.round_dp_with_strategy(self.precision, RoundingStrategy::MidpointNearestEven)
    }
}
