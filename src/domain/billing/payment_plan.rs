//! Installment payment plans.
//!
//! A plan splits a total into 2 to 12 installments on a fixed cadence. The
//! schedule is generated once, when a participation enrolls, and stored on
//! the participation. The daily sweep marks unpaid installments overdue once
//! the plan's grace days have passed, adding the late fee.

use chrono::{Days, Months, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

const CURRENCY_PRECISION: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalUnit {
    Days,
    Weeks,
    Months,
}

/// Cadence of installments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaymentFrequency {
    Monthly,
    Quarterly,
    Biannual,
    Custom { every: u32, unit: IntervalUnit },
}

impl PaymentFrequency {
    fn interval(&self) -> (u32, IntervalUnit) {
        match *self {
            PaymentFrequency::Monthly => (1, IntervalUnit::Months),
            PaymentFrequency::Quarterly => (3, IntervalUnit::Months),
            PaymentFrequency::Biannual => (6, IntervalUnit::Months),
            PaymentFrequency::Custom { every, unit } => (every, unit),
        }
    }

    /// The date `periods` intervals after `from`.
    ///
    /// Month steps are counted from `from` itself and clamp to the end of
    /// shorter months, so a plan starting on the 31st stays on month end.
    pub fn advance(&self, from: NaiveDate, periods: u32) -> Option<NaiveDate> {
        let (every, unit) = self.interval();
        let steps = every.checked_mul(periods)?;
        match unit {
            IntervalUnit::Days => from.checked_add_days(Days::new(u64::from(steps))),
            IntervalUnit::Weeks => from.checked_add_days(Days::new(u64::from(steps) * 7)),
            IntervalUnit::Months => from.checked_add_months(Months::new(steps)),
        }
    }
}

/// When the first installment falls due, relative to enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FirstPaymentDue {
    #[default]
    Immediate,
    /// One interval of the plan's frequency after enrollment.
    NextPeriod,
    AfterDays { days: u32 },
}

fn default_grace_days() -> u32 {
    5
}

/// An installment plan offered for a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentPlan {
    pub code: String,
    pub name: String,
    pub total_amount: Decimal,
    pub installments: u32,
    pub frequency: PaymentFrequency,
    #[serde(default)]
    pub first_payment_due: FirstPaymentDue,
    /// Charged once, with the first installment.
    #[serde(default)]
    pub setup_fee: Decimal,
    /// Added to every installment.
    #[serde(default)]
    pub installment_fee: Decimal,
    /// Added to an installment when it goes overdue.
    #[serde(default)]
    pub late_fee: Decimal,
    /// Days after the due date before an unpaid installment is overdue.
    #[serde(default = "default_grace_days")]
    pub grace_period_days: u32,
}

impl PaymentPlan {
    pub const MIN_INSTALLMENTS: u32 = 2;
    pub const MAX_INSTALLMENTS: u32 = 12;

    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        total_amount: Decimal,
        installments: u32,
        frequency: PaymentFrequency,
    ) -> Result<Self, ValidationError> {
        let plan = Self {
            code: code.into(),
            name: name.into(),
            total_amount,
            installments,
            frequency,
            first_payment_due: FirstPaymentDue::Immediate,
            setup_fee: Decimal::ZERO,
            installment_fee: Decimal::ZERO,
            late_fee: Decimal::ZERO,
            grace_period_days: default_grace_days(),
        };
        plan.validate()?;
        Ok(plan)
    }

    pub fn with_first_payment_due(mut self, due: FirstPaymentDue) -> Self {
        self.first_payment_due = due;
        self
    }

    pub fn with_fees(mut self, setup_fee: Decimal, installment_fee: Decimal, late_fee: Decimal) -> Self {
        self.setup_fee = setup_fee;
        self.installment_fee = installment_fee;
        self.late_fee = late_fee;
        self
    }

    pub fn with_grace_period_days(mut self, days: u32) -> Self {
        self.grace_period_days = days;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.code.trim().is_empty() {
            return Err(ValidationError::empty_field("code"));
        }
        if !(Self::MIN_INSTALLMENTS..=Self::MAX_INSTALLMENTS).contains(&self.installments) {
            return Err(ValidationError::out_of_range(
                "installments",
                i64::from(Self::MIN_INSTALLMENTS),
                i64::from(Self::MAX_INSTALLMENTS),
                i64::from(self.installments),
            ));
        }
        if self.total_amount <= Decimal::ZERO {
            return Err(ValidationError::invalid_format(
                "total_amount",
                "must be greater than zero",
            ));
        }
        for (field, fee) in [
            ("setup_fee", self.setup_fee),
            ("installment_fee", self.installment_fee),
            ("late_fee", self.late_fee),
        ] {
            if fee.is_sign_negative() {
                return Err(ValidationError::invalid_format(field, "cannot be negative"));
            }
        }
        if let PaymentFrequency::Custom { every: 0, .. } = self.frequency {
            return Err(ValidationError::invalid_format(
                "frequency",
                "custom interval must be at least one unit",
            ));
        }
        Ok(())
    }

    /// Regular installment: the total split evenly, plus the installment fee.
    pub fn calculate_installment_amount(&self) -> Decimal {
        self.base_amount() + self.installment_fee
    }

    fn base_amount(&self) -> Decimal {
        if self.installments == 0 {
            return Decimal::ZERO;
        }
        (self.total_amount / Decimal::from(self.installments))
            .round_dp_with_strategy(CURRENCY_PRECISION, RoundingStrategy::MidpointNearestEven)
    }

    pub fn first_due_date(&self, start: NaiveDate) -> Option<NaiveDate> {
        match self.first_payment_due {
            FirstPaymentDue::Immediate => Some(start),
            FirstPaymentDue::NextPeriod => self.frequency.advance(start, 1),
            FirstPaymentDue::AfterDays { days } => start.checked_add_days(Days::new(u64::from(days))),
        }
    }

    /// Builds the installment schedule for an enrollment on `start`.
    ///
    /// The last installment absorbs the rounding remainder, so the base
    /// amounts always sum to `total_amount`.
    pub fn schedule(&self, start: NaiveDate) -> Result<PaymentSchedule, ValidationError> {
        self.validate()?;
        let out_of_range =
            || ValidationError::invalid_format("start_date", format!("schedule from {} is out of range", start));
        let first = self.first_due_date(start).ok_or_else(out_of_range)?;
        let base = self.base_amount();

        let mut installments = Vec::with_capacity(self.installments as usize);
        let mut allotted = Decimal::ZERO;
        for number in 1..=self.installments {
            let due_date = self.frequency.advance(first, number - 1).ok_or_else(out_of_range)?;
            let share = if number == self.installments {
                self.total_amount - allotted
            } else {
                base
            };
            allotted += share;

            let mut amount = share + self.installment_fee;
            if number == 1 {
                amount += self.setup_fee;
            }
            installments.push(Installment {
                number,
                due_date,
                amount,
                late_fee: Decimal::ZERO,
                status: InstallmentStatus::Pending,
                paid_on: None,
            });
        }

        Ok(PaymentSchedule {
            plan: self.clone(),
            start_date: start,
            installments,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallmentStatus {
    Pending,
    Paid,
    Overdue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installment {
    /// 1-based position in the schedule.
    pub number: u32,
    pub due_date: NaiveDate,
    pub amount: Decimal,
    #[serde(default)]
    pub late_fee: Decimal,
    pub status: InstallmentStatus,
    #[serde(default)]
    pub paid_on: Option<NaiveDate>,
}

impl Installment {
    pub fn total_due(&self) -> Decimal {
        self.amount + self.late_fee
    }

    pub fn is_unpaid(&self) -> bool {
        matches!(self.status, InstallmentStatus::Pending | InstallmentStatus::Overdue)
    }
}

/// A participation's installments under one plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSchedule {
    pub plan: PaymentPlan,
    pub start_date: NaiveDate,
    pub installments: Vec<Installment>,
}

impl PaymentSchedule {
    /// Marks pending installments overdue once `today` is past their due
    /// date plus the grace days, applying the late fee. Returns how many
    /// changed; a second call for the same date returns zero.
    pub fn process_overdue(&mut self, today: NaiveDate) -> usize {
        let grace = Days::new(u64::from(self.plan.grace_period_days));
        let late_fee = self.plan.late_fee;
        let mut marked = 0;

        for installment in &mut self.installments {
            if installment.status != InstallmentStatus::Pending {
                continue;
            }
            let past_grace = installment
                .due_date
                .checked_add_days(grace)
                .is_some_and(|grace_end| today > grace_end);
            if past_grace {
                if late_fee > Decimal::ZERO {
                    installment.late_fee = late_fee;
                }
                installment.status = InstallmentStatus::Overdue;
                marked += 1;
            }
        }
        marked
    }

    pub fn record_payment(&mut self, number: u32, paid_on: NaiveDate) -> Result<(), ValidationError> {
        let installment = self
            .installments
            .iter_mut()
            .find(|i| i.number == number)
            .ok_or_else(|| {
                ValidationError::out_of_range(
                    "installment",
                    1,
                    i64::from(self.plan.installments),
                    i64::from(number),
                )
            })?;
        if !installment.is_unpaid() {
            return Err(ValidationError::invalid_format(
                "installment",
                format!("installment {} is already paid", number),
            ));
        }
        installment.status = InstallmentStatus::Paid;
        installment.paid_on = Some(paid_on);
        Ok(())
    }

    /// Earliest unpaid installment.
    pub fn next_due(&self) -> Option<&Installment> {
        self.installments
            .iter()
            .filter(|i| i.is_unpaid())
            .min_by_key(|i| i.due_date)
    }

    pub fn overdue_count(&self) -> usize {
        self.installments
            .iter()
            .filter(|i| i.status == InstallmentStatus::Overdue)
            .count()
    }

    /// Sum still owed, late fees included.
    pub fn outstanding(&self) -> Decimal {
        self.installments
            .iter()
            .filter(|i| i.is_unpaid())
            .map(Installment::total_due)
            .sum()
    }
}
