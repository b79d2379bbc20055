//! Renewal planning.
//!
//! Decides whether a participation may renew and what the next term looks
//! like. Persisting the result, and the idempotence check against existing
//! successors, belong to the renewal handler.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::catalog::{PricingTier, SubscriptionProduct};
use crate::domain::foundation::{MemberType, ProductId};
use crate::domain::lifecycle::{LifecycleError, RenewalStrategy};
use crate::domain::participation::Participation;
use crate::domain::pricing::{PricingResolver, ResolvedPrice};

/// The next term of a participation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenewalPlan {
    pub product_id: ProductId,
    pub term_begin: NaiveDate,
    pub term_end: NaiveDate,
    pub price: ResolvedPrice,
    pub strategy: RenewalStrategy,
}

#[derive(Debug, Clone, Default)]
pub struct RenewalOrchestrator {
    strategy: RenewalStrategy,
    resolver: PricingResolver,
}

impl RenewalOrchestrator {
    pub fn new(strategy: RenewalStrategy) -> Self {
        Self {
            strategy,
            resolver: PricingResolver::new(),
        }
    }

    pub fn strategy(&self) -> RenewalStrategy {
        self.strategy
    }

    /// Checks the renewal preconditions.
    ///
    /// Open status, a renewable product, and paid-through no later than
    /// term end plus the product's renewal window.
    pub fn check_eligible(
        &self,
        p: &Participation,
        product: &SubscriptionProduct,
    ) -> Result<(), LifecycleError> {
        if !p.status.is_open() {
            return Err(LifecycleError::NotRenewable {
                reason: format!("status is {}", p.status),
            });
        }
        if !product.renewable {
            return Err(LifecycleError::NotRenewable {
                reason: format!("product '{}' is not renewable", product.name),
            });
        }
        let window_end = p
            .term_end
            .checked_add_days(Days::new(u64::from(product.renewal_window_days)))
            .unwrap_or(NaiveDate::MAX);
        if p.paid_through > window_end {
            return Err(LifecycleError::NotRenewable {
                reason: format!("already paid through {}", p.paid_through),
            });
        }
        Ok(())
    }

    /// Plans the next term.
    ///
    /// `product` is the product being renewed into (the participation's
    /// renew-to override when set). The term begins the day after the
    /// current term ends and runs for the product's calendar length; the
    /// price is resolved for the member's current type as of the new term
    /// begin.
    pub fn plan(
        &self,
        p: &Participation,
        product: &SubscriptionProduct,
        tiers: &[PricingTier],
        member_type: Option<&MemberType>,
    ) -> Result<RenewalPlan, LifecycleError> {
        self.check_eligible(p, product)?;

        let term_begin = p
            .term_end
            .succ_opt()
            .ok_or_else(|| LifecycleError::validation("term_end", "no day follows term end"))?;
        let term_end = product
            .term
            .term_end_from(term_begin)
            .ok_or_else(|| LifecycleError::validation("term_end", "next term is out of range"))?;
        let price = self.resolver.resolve(product, tiers, member_type, term_begin);

        Ok(RenewalPlan {
            product_id: product.id,
            term_begin,
            term_end,
            price,
            strategy: self.strategy,
        })
    }

    /// Builds the successor participation for the new-participation strategy.
    ///
    /// The successor keeps holder, kind, join date, parent and auto-renew
    /// settings. It starts active when the new term is already paid,
    /// otherwise as a prospect awaiting payment.
    pub fn successor(
        &self,
        p: &Participation,
        plan: &RenewalPlan,
        paid_through: Option<NaiveDate>,
        funding_ref: Option<String>,
    ) -> Result<Participation, LifecycleError> {
        let mut next = Participation::new(
            p.holder,
            p.kind.clone(),
            plan.product_id,
            plan.term_begin,
            plan.term_end,
            plan.price.price,
            plan.price.currency.clone(),
        )?
        .with_join_date(p.join_date)
        .with_auto_renew(p.auto_renew);
        next.parent = p.parent;
        next.renewed_from = Some(p.id);
        next.funding_ref = funding_ref;
        if let Some(paid) = paid_through {
            next = next.activated_on_signup(paid);
        }
        next.check_invariants()?;
        Ok(next)
    }

    /// Applies the plan to `p` for the extend-in-place strategy.
    ///
    /// Only term, price and payment fields move; a grace or suspended
    /// status is left for the engine to reactivate.
    pub fn extend(
        &self,
        p: &Participation,
        plan: &RenewalPlan,
        paid_through: Option<NaiveDate>,
        funding_ref: Option<String>,
    ) -> Result<Participation, LifecycleError> {
        let mut next = p.clone();
        next.extend_term(plan.term_begin, plan.term_end, plan.price.price, plan.product_id)?;
        if let Some(paid) = paid_through {
            next.record_payment(paid, funding_ref);
        }
        Ok(next)
    }
}
