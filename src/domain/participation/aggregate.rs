//! Participation aggregate entity.
//!
//! A Participation is one holder's entitlement term: a membership, chapter
//! membership, committee position or generic subscription. Records are never
//! deleted; terminal states are kept for audit.
//!
//! # Design Decisions
//!
//! - **Dates are calendar dates**: lifecycle rules compare whole days, so
//!   every term field is a `NaiveDate`. Only audit timestamps carry a time.
//! - **Mutated through the engine**: status and its deadline fields are
//!   only changed by [`LifecycleEngine`](crate::domain::lifecycle::LifecycleEngine).
//! - **Derived state is computed on read**: overdue, in-grace and access
//!   flags are functions of `(participation, as_of)` and never stored.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CancellationReason, ParticipationKind, ParticipationStatus};
use crate::domain::billing::PaymentSchedule;
use crate::domain::catalog::SubscriptionProduct;
use crate::domain::foundation::{
    ParticipationId, ProductId, StateMachine, Timestamp, ValidationError,
};
use crate::domain::member::Holder;

/// Bill-through may run at most this many days past term end.
pub const BILL_THROUGH_SLACK_DAYS: u64 = 30;

/// Participation aggregate.
///
/// # Invariants
///
/// - `term_begin <= term_end`
/// - `join_date <= term_begin`
/// - `bill_through <= term_end + 30 days`
/// - `cancellation_reason` is set if and only if the status is terminal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participation {
    pub id: ParticipationId,
    pub holder: Holder,
    pub kind: ParticipationKind,
    pub status: ParticipationStatus,

    /// Product whose price and term this participation was created from.
    pub product_id: ProductId,
    /// Price locked in for the current term.
    pub unit_price: Decimal,
    pub currency: String,

    /// First-ever start date. Never changes once set.
    pub join_date: NaiveDate,
    pub term_begin: NaiveDate,
    pub term_end: NaiveDate,
    pub bill_through: NaiveDate,
    pub paid_through: NaiveDate,
    #[serde(default)]
    pub grace_end: Option<NaiveDate>,
    #[serde(default)]
    pub suspend_end: Option<NaiveDate>,
    #[serde(default)]
    pub terminated_date: Option<NaiveDate>,

    /// Invoice or payment that funded the current term.
    #[serde(default)]
    pub funding_ref: Option<String>,
    /// Installments when the term is paid under a payment plan.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_schedule: Option<PaymentSchedule>,

    #[serde(default)]
    pub auto_renew: bool,
    /// Product to renew into instead of `product_id`.
    #[serde(default)]
    pub renew_to_product: Option<ProductId>,

    #[serde(default)]
    pub cancellation_reason: Option<CancellationReason>,

    /// Parent participation for organizational seat memberships.
    #[serde(default)]
    pub parent: Option<ParticipationId>,
    /// Participation this one renewed.
    #[serde(default)]
    pub renewed_from: Option<ParticipationId>,

    /// Optimistic concurrency version, bumped on every committed write.
    #[serde(default)]
    pub version: u64,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Participation {
    /// Creates a prospect participation with explicit term dates.
    ///
    /// Nothing is paid yet: paid-through is the day before the term begins.
    pub fn new(
        holder: Holder,
        kind: ParticipationKind,
        product_id: ProductId,
        term_begin: NaiveDate,
        term_end: NaiveDate,
        unit_price: Decimal,
        currency: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let now = Timestamp::now();
        let participation = Self {
            id: ParticipationId::new(),
            holder,
            kind,
            status: ParticipationStatus::Prospect,
            product_id,
            unit_price,
            currency: currency.into(),
            join_date: term_begin,
            term_begin,
            term_end,
            bill_through: term_end,
            paid_through: term_begin.pred_opt().unwrap_or(term_begin),
            grace_end: None,
            suspend_end: None,
            terminated_date: None,
            funding_ref: None,
            payment_schedule: None,
            auto_renew: false,
            renew_to_product: None,
            cancellation_reason: None,
            parent: None,
            renewed_from: None,
            version: 0,
            created_at: now,
            updated_at: now,
        };
        participation.check_invariants()?;
        Ok(participation)
    }

    /// Creates a prospect participation whose term is derived from the kind's
    /// default length, falling back to the product's own term.
    pub fn for_product(
        holder: Holder,
        kind: ParticipationKind,
        product: &SubscriptionProduct,
        term_begin: NaiveDate,
        unit_price: Decimal,
    ) -> Result<Self, ValidationError> {
        let term = kind.default_term().unwrap_or(product.term);
        let term_end = term.term_end_from(term_begin).ok_or_else(|| {
            ValidationError::invalid_format("term_end", "term end is out of calendar range")
        })?;
        Self::new(
            holder,
            kind,
            product.id,
            term_begin,
            term_end,
            unit_price,
            product.currency.clone(),
        )
    }

    /// Marks the participation as paid and active at creation time
    /// (immediate paid signup).
    pub fn activated_on_signup(mut self, paid_through: NaiveDate) -> Self {
        self.status = ParticipationStatus::Active;
        self.paid_through = paid_through;
        self
    }

    pub fn with_id(mut self, id: ParticipationId) -> Self {
        self.id = id;
        self
    }

    pub fn with_join_date(mut self, join_date: NaiveDate) -> Self {
        self.join_date = join_date;
        self
    }

    pub fn with_auto_renew(mut self, auto_renew: bool) -> Self {
        self.auto_renew = auto_renew;
        self
    }

    pub fn with_renew_to(mut self, product_id: ProductId) -> Self {
        self.renew_to_product = Some(product_id);
        self
    }

    pub fn with_funding_ref(mut self, funding_ref: impl Into<String>) -> Self {
        self.funding_ref = Some(funding_ref.into());
        self
    }

    pub fn with_parent(mut self, parent: ParticipationId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Product the next term should be priced from.
    pub fn renewal_product(&self) -> ProductId {
        self.renew_to_product.unwrap_or(self.product_id)
    }

    /// Verifies the aggregate's structural invariants.
    pub fn check_invariants(&self) -> Result<(), ValidationError> {
        if self.term_begin > self.term_end {
            return Err(ValidationError::invalid_format(
                "term_begin",
                format!("term begins {} after it ends {}", self.term_begin, self.term_end),
            ));
        }
        if self.join_date > self.term_begin {
            return Err(ValidationError::invalid_format(
                "join_date",
                format!("join date {} is after term begin {}", self.join_date, self.term_begin),
            ));
        }
        let bill_limit = self
            .term_end
            .checked_add_days(Days::new(BILL_THROUGH_SLACK_DAYS))
            .unwrap_or(NaiveDate::MAX);
        if self.bill_through > bill_limit {
            return Err(ValidationError::invalid_format(
                "bill_through",
                format!("bill-through {} exceeds {}", self.bill_through, bill_limit),
            ));
        }
        match (self.status.is_terminal(), self.cancellation_reason.is_some()) {
            (true, false) => Err(ValidationError::empty_field("cancellation_reason")),
            (false, true) => Err(ValidationError::invalid_format(
                "cancellation_reason",
                format!("not allowed while {}", self.status),
            )),
            _ => Ok(()),
        }
    }

    /// Active but paid-through has lapsed.
    pub fn is_overdue(&self, as_of: NaiveDate) -> bool {
        self.status == ParticipationStatus::Active && self.paid_through < as_of
    }

    /// In grace and the grace deadline has not passed.
    pub fn is_in_grace(&self, as_of: NaiveDate) -> bool {
        self.status == ParticipationStatus::Grace
            && self.grace_end.map_or(false, |end| as_of <= end)
    }

    /// Signed days until the term ends; negative once expired.
    pub fn days_until_expiry(&self, as_of: NaiveDate) -> i64 {
        (self.term_end - as_of).num_days()
    }

    /// Whether benefits are currently granted.
    ///
    /// Grace only grants access up to its deadline.
    pub fn has_access(&self, as_of: NaiveDate) -> bool {
        match self.status {
            ParticipationStatus::Active => true,
            ParticipationStatus::Grace => self.is_in_grace(as_of),
            _ => false,
        }
    }

    /// Flagged for auto-renew, funded, still open and at or past term end.
    pub fn can_auto_renew(&self, as_of: NaiveDate) -> bool {
        self.auto_renew
            && self.kind.supports_auto_renew()
            && self.status.is_open()
            && self.funding_ref.is_some()
            && self.days_until_expiry(as_of) <= 0
    }

    /// Extends the term in place for a renewal.
    pub fn extend_term(
        &mut self,
        term_begin: NaiveDate,
        term_end: NaiveDate,
        unit_price: Decimal,
        product_id: ProductId,
    ) -> Result<(), ValidationError> {
        let mut next = self.clone();
        next.term_begin = term_begin;
        next.term_end = term_end;
        next.bill_through = term_end;
        next.unit_price = unit_price;
        next.product_id = product_id;
        next.renew_to_product = None;
        next.check_invariants()?;
        *self = next;
        self.touch();
        Ok(())
    }

    /// Records payment through `paid_through`.
    pub fn record_payment(&mut self, paid_through: NaiveDate, funding_ref: Option<String>) {
        if paid_through > self.paid_through {
            self.paid_through = paid_through;
        }
        if funding_ref.is_some() {
            self.funding_ref = funding_ref;
        }
        self.touch();
    }

    pub(crate) fn touch(&mut self) {
        self.touch_at(Timestamp::now());
    }

    pub(crate) fn touch_at(&mut self, at: Timestamp) {
        self.updated_at = at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::TermLength;
    use crate::domain::foundation::{CommitteeId, MemberId};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn annual() -> Participation {
        Participation::new(
            Holder::Individual(MemberId::new()),
            ParticipationKind::Membership,
            ProductId::new(),
            date(2024, 1, 1),
            date(2024, 12, 31),
            dec!(300),
            "USD",
        )
        .unwrap()
    }

    #[test]
    fn new_participation_is_unpaid_prospect() {
        let p = annual();
        assert_eq!(p.status, ParticipationStatus::Prospect);
        assert_eq!(p.paid_through, date(2023, 12, 31));
        assert_eq!(p.join_date, date(2024, 1, 1));
        assert_eq!(p.version, 0);
    }

    #[test]
    fn rejects_inverted_term() {
        let result = Participation::new(
            Holder::Individual(MemberId::new()),
            ParticipationKind::Membership,
            ProductId::new(),
            date(2024, 12, 31),
            date(2024, 1, 1),
            dec!(300),
            "USD",
        );
        assert!(result.is_err());
    }

    #[test]
    fn rejects_join_after_term_begin() {
        let p = annual().with_join_date(date(2024, 2, 1));
        assert!(p.check_invariants().is_err());
    }

    #[test]
    fn rejects_bill_through_beyond_slack() {
        let mut p = annual();
        p.bill_through = date(2025, 1, 30);
        assert!(p.check_invariants().is_ok());
        p.bill_through = date(2025, 1, 31);
        assert!(p.check_invariants().is_err());
    }

    #[test]
    fn cancellation_reason_required_iff_terminal() {
        let mut p = annual().activated_on_signup(date(2024, 12, 31));
        p.cancellation_reason = Some(CancellationReason::member_request());
        assert!(p.check_invariants().is_err());

        p.status = ParticipationStatus::Cancelled;
        assert!(p.check_invariants().is_ok());

        p.cancellation_reason = None;
        assert!(p.check_invariants().is_err());
    }

    #[test]
    fn committee_term_uses_kind_default_over_product_term() {
        let product = crate::domain::catalog::SubscriptionProduct::new(
            ProductId::new(),
            "Committee seat",
            dec!(0),
            "USD",
            TermLength::months(6),
        );
        let p = Participation::for_product(
            Holder::Individual(MemberId::new()),
            ParticipationKind::CommitteePosition {
                committee: CommitteeId::new(),
                position: "Secretary".to_string(),
            },
            &product,
            date(2024, 3, 1),
            dec!(0),
        )
        .unwrap();
        assert_eq!(p.term_end, date(2026, 2, 28));
    }

    #[test]
    fn generic_subscription_uses_product_term() {
        let product = crate::domain::catalog::SubscriptionProduct::new(
            ProductId::new(),
            "Journal",
            dec!(40),
            "EUR",
            TermLength::months(3),
        );
        let p = Participation::for_product(
            Holder::Individual(MemberId::new()),
            ParticipationKind::GenericSubscription,
            &product,
            date(2024, 2, 1),
            dec!(40),
        )
        .unwrap();
        assert_eq!(p.term_end, date(2024, 4, 30));
        assert_eq!(p.currency, "EUR");
    }

    #[test]
    fn overdue_when_active_and_paid_through_lapsed() {
        let p = annual().activated_on_signup(date(2023, 12, 31));
        assert!(p.is_overdue(date(2024, 1, 1)));
        assert!(!p.is_overdue(date(2023, 12, 31)));
    }

    #[test]
    fn grace_access_ends_after_deadline() {
        let mut p = annual().activated_on_signup(date(2023, 12, 31));
        p.status = ParticipationStatus::Grace;
        p.grace_end = Some(date(2024, 1, 31));
        assert!(p.has_access(date(2024, 1, 31)));
        assert!(p.is_in_grace(date(2024, 1, 31)));
        assert!(!p.has_access(date(2024, 2, 1)));
    }

    #[test]
    fn days_until_expiry_goes_negative() {
        let p = annual();
        assert_eq!(p.days_until_expiry(date(2024, 12, 30)), 1);
        assert_eq!(p.days_until_expiry(date(2025, 1, 2)), -2);
    }

    #[test]
    fn auto_renew_requires_funding_and_term_end() {
        let p = annual()
            .activated_on_signup(date(2024, 12, 31))
            .with_auto_renew(true);
        assert!(!p.can_auto_renew(date(2024, 12, 31)));

        let p = p.with_funding_ref("INV-1");
        assert!(!p.can_auto_renew(date(2024, 12, 30)));
        assert!(p.can_auto_renew(date(2024, 12, 31)));
    }

    #[test]
    fn extend_term_moves_dates_and_clears_override() {
        let next_product = ProductId::new();
        let mut p = annual()
            .activated_on_signup(date(2024, 12, 31))
            .with_renew_to(next_product);
        p.extend_term(date(2025, 1, 1), date(2025, 12, 31), dec!(320), next_product)
            .unwrap();
        assert_eq!(p.term_end, date(2025, 12, 31));
        assert_eq!(p.bill_through, date(2025, 12, 31));
        assert_eq!(p.join_date, date(2024, 1, 1));
        assert_eq!(p.product_id, next_product);
        assert!(p.renew_to_product.is_none());
    }

    #[test]
    fn record_payment_never_moves_paid_through_backwards() {
        let mut p = annual().activated_on_signup(date(2024, 6, 30));
        p.record_payment(date(2024, 3, 31), Some("INV-2".to_string()));
        assert_eq!(p.paid_through, date(2024, 6, 30));
        assert_eq!(p.funding_ref.as_deref(), Some("INV-2"));
    }
}
