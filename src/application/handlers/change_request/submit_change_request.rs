//! SubmitChangeRequestHandler - Drafts and submits change requests for review.
//!
//! Plan and category changes are checked for eligibility on the target
//! product and get a proration quote. An ineligible request is still stored,
//! as a draft carrying its reason codes, and the caller gets
//! `EligibilityFailure`.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::target_price;
use crate::domain::billing::{ProrationCalculator, ProrationInput, ProrationResult};
use crate::domain::change_request::{ChangeKind, ChangeRequest};
use crate::domain::eligibility::{Eligibility, EligibilityChecker};
use crate::domain::foundation::{ChangeRequestId, ParticipationId};
use crate::domain::lifecycle::LifecycleError;
use crate::domain::participation::Participation;
use crate::ports::{
    CatalogReader, ChangeRequestRepository, MemberDirectory, ParticipationRepository,
};

#[derive(Debug, Clone)]
pub struct SubmitChangeRequestCommand {
    pub participation_id: ParticipationId,
    pub kind: ChangeKind,
    pub effective_date: NaiveDate,
    pub requested_by: Option<String>,
    pub today: NaiveDate,
}

/// Command to submit a stored draft again, e.g. after the member's
/// situation changed.
#[derive(Debug, Clone)]
pub struct ResubmitChangeRequestCommand {
    pub request_id: ChangeRequestId,
    pub today: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct SubmitChangeRequestResult {
    pub request: ChangeRequest,
}

pub struct SubmitChangeRequestHandler {
    participations: Arc<dyn ParticipationRepository>,
    requests: Arc<dyn ChangeRequestRepository>,
    catalog: Arc<dyn CatalogReader>,
    members: Arc<dyn MemberDirectory>,
    checker: EligibilityChecker,
    calculator: ProrationCalculator,
}

impl SubmitChangeRequestHandler {
    pub fn new(
        participations: Arc<dyn ParticipationRepository>,
        requests: Arc<dyn ChangeRequestRepository>,
        catalog: Arc<dyn CatalogReader>,
        members: Arc<dyn MemberDirectory>,
    ) -> Self {
        Self {
            participations,
            requests,
            catalog,
            members,
            checker: EligibilityChecker::new(),
            calculator: ProrationCalculator::default(),
        }
    }

    #[instrument(skip(self), fields(participation_id = %cmd.participation_id, kind = cmd.kind.label()))]
    pub async fn handle(
        &self,
        cmd: SubmitChangeRequestCommand,
    ) -> Result<SubmitChangeRequestResult, LifecycleError> {
        let participation = self.load_participation(&cmd.participation_id).await?;

        let mut request = ChangeRequest::draft(participation.id, cmd.kind, cmd.effective_date);
        request.requested_by = cmd.requested_by;

        let outcome = self.submit(&participation, &mut request, cmd.today).await;
        if keeps_request(&outcome) {
            self.requests.insert(&request).await?;
        }
        outcome?;

        info!(request_id = %request.id, "change request submitted");
        Ok(SubmitChangeRequestResult { request })
    }

    #[instrument(skip(self))]
    pub async fn resubmit(
        &self,
        cmd: ResubmitChangeRequestCommand,
    ) -> Result<SubmitChangeRequestResult, LifecycleError> {
        let mut request = self
            .requests
            .find_by_id(&cmd.request_id)
            .await?
            .ok_or_else(|| LifecycleError::not_found("ChangeRequest", cmd.request_id))?;
        let participation = self.load_participation(&request.participation_id).await?;

        let outcome = self.submit(&participation, &mut request, cmd.today).await;
        if keeps_request(&outcome) {
            self.requests.update(&request).await?;
        }
        outcome?;

        info!(request_id = %request.id, "change request resubmitted");
        Ok(SubmitChangeRequestResult { request })
    }

    async fn load_participation(&self, id: &ParticipationId) -> Result<Participation, LifecycleError> {
        self.participations
            .find_by_id(id)
            .await?
            .ok_or_else(|| LifecycleError::not_found("Participation", id))
    }

    /// Validates, assesses and submits `request`, leaving it in draft when
    /// the member is ineligible.
    async fn submit(
        &self,
        participation: &Participation,
        request: &mut ChangeRequest,
        today: NaiveDate,
    ) -> Result<(), LifecycleError> {
        validate(participation, &request.kind, request.effective_date)?;
        let (eligibility, proration) = self
            .assess(participation, &request.kind, request.effective_date, today)
            .await?;

        if let Err(e) = request.submit(&eligibility, proration) {
            if let LifecycleError::EligibilityFailure { reasons } = &e {
                warn!(request_id = %request.id, reasons = ?reasons, "change request ineligible");
            }
            return Err(e);
        }
        Ok(())
    }

    async fn assess(
        &self,
        participation: &Participation,
        kind: &ChangeKind,
        effective_date: NaiveDate,
        today: NaiveDate,
    ) -> Result<(Eligibility, Option<ProrationResult>), LifecycleError> {
        if !kind.is_pricing_change() {
            let eligible = Eligibility {
                eligible: true,
                reasons: Vec::new(),
            };
            return Ok((eligible, None));
        }

        let target = target_price::resolve(
            self.catalog.as_ref(),
            self.members.as_ref(),
            participation,
            kind,
            effective_date,
        )
        .await?;
        let eligibility = self
            .checker
            .check(&target.product, &target.profile, Some(&target.price), today);

        let proration = self.calculator.calculate(&ProrationInput {
            old_price: participation.unit_price,
            new_price: target.price.price,
            term_start: participation.term_begin,
            term_end: participation.term_end,
            effective_date,
            today,
            change_fee: target.product.change_fee,
        });
        if proration.underflow {
            warn!(
                participation_id = %participation.id,
                error = %LifecycleError::ProrationUnderflow,
                "proration skipped"
            );
        }

        Ok((eligibility, Some(proration)))
    }
}

/// Submitted and ineligible requests are stored; anything else was
/// rejected before it became a request.
fn keeps_request(outcome: &Result<(), LifecycleError>) -> bool {
    matches!(outcome, Ok(()) | Err(LifecycleError::EligibilityFailure { .. }))
}

fn validate(
    participation: &Participation,
    kind: &ChangeKind,
    effective_date: NaiveDate,
) -> Result<(), LifecycleError> {
    if !participation.status.is_open() {
        return Err(LifecycleError::validation(
            "participation",
            format!("{} participations cannot be changed", participation.status),
        ));
    }
    match kind {
        ChangeKind::PlanChange { .. } | ChangeKind::CategoryChange { .. } => {
            if effective_date < participation.term_begin || effective_date > participation.term_end {
                return Err(LifecycleError::validation(
                    "effective_date",
                    format!(
                        "{} is outside the term {} to {}",
                        effective_date, participation.term_begin, participation.term_end
                    ),
                ));
            }
        }
        ChangeKind::Pause { resume_on: Some(resume_on) } if *resume_on < effective_date => {
            return Err(LifecycleError::validation(
                "resume_on",
                format!("{} is before the pause starts on {}", resume_on, effective_date),
            ));
        }
        ChangeKind::Extension { until } if *until <= participation.term_end => {
            return Err(LifecycleError::validation(
                "until",
                format!("{} does not extend past {}", until, participation.term_end),
            ));
        }
        ChangeKind::PaymentPlanChange { plan: Some(plan) } => {
            plan.validate()?;
            if effective_date > participation.term_end {
                return Err(LifecycleError::validation(
                    "effective_date",
                    format!("{} is after the term ends on {}", effective_date, participation.term_end),
                ));
            }
        }
        ChangeKind::PaymentPlanChange { plan: None } if participation.payment_schedule.is_none() => {
            return Err(LifecycleError::validation(
                "plan",
                "participation has no payment plan to drop",
            ));
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::{date, Fixture};
    use crate::domain::billing::{PaymentFrequency, PaymentPlan};
    use crate::domain::catalog::{SubscriptionProduct, TermLength};
    use crate::domain::change_request::ChangeRequestStatus;
    use crate::domain::eligibility::ReasonCode;
    use crate::domain::foundation::{MemberType, ProductId};
    use crate::domain::member::MemberProfile;
    use rust_decimal_macros::dec;

    fn handler(fx: &Fixture) -> SubmitChangeRequestHandler {
        SubmitChangeRequestHandler::new(
            fx.backend.participations.clone(),
            fx.backend.change_requests.clone(),
            fx.backend.catalog.clone(),
            fx.members.clone(),
        )
    }

    async fn premium(fx: &Fixture) -> SubscriptionProduct {
        let product = SubscriptionProduct::new(
            ProductId::new(),
            "Premium Membership",
            dec!(450.00),
            "USD",
            TermLength::years(1),
        );
        fx.backend.catalog.add_product(product.clone()).await.unwrap();
        product
    }

    fn plan_change(p: &Participation, target: ProductId) -> SubmitChangeRequestCommand {
        SubmitChangeRequestCommand {
            participation_id: p.id,
            kind: ChangeKind::PlanChange {
                target_product: target,
            },
            effective_date: date(2024, 7, 1),
            requested_by: Some("staff:42".to_string()),
            today: date(2024, 6, 20),
        }
    }

    #[tokio::test]
    async fn plan_change_is_submitted_with_proration() {
        let fx = Fixture::new().await;
        let p = fx.active_membership().await;
        let premium = premium(&fx).await;

        let result = handler(&fx).handle(plan_change(&p, premium.id)).await.unwrap();

        assert_eq!(result.request.status, ChangeRequestStatus::Submitted);
        let proration = result.request.proration.unwrap();
        assert_eq!(proration.remaining_days, 184);
        assert_eq!(proration.net_adjustment, dec!(75.62));
        assert_eq!(fx.backend.change_requests.all().await.len(), 1);
    }

    #[tokio::test]
    async fn change_fee_is_added_unprorated() {
        let fx = Fixture::new().await;
        let p = fx.active_membership().await;
        let mut premium = premium(&fx).await;
        premium.change_fee = Some(dec!(25.00));
        fx.backend.catalog.add_product(premium.clone()).await.unwrap();

        let result = handler(&fx).handle(plan_change(&p, premium.id)).await.unwrap();

        assert_eq!(result.request.proration.unwrap().net_adjustment, dec!(100.62));
    }

    #[tokio::test]
    async fn ineligible_request_stays_draft_with_reasons() {
        let fx = Fixture::new().await;
        let p = fx.active_membership().await;
        let mut premium = premium(&fx).await;
        premium.eligible_member_types = [MemberType::new("fellow").unwrap()].into_iter().collect();
        fx.backend.catalog.add_product(premium.clone()).await.unwrap();

        let err = handler(&fx).handle(plan_change(&p, premium.id)).await.unwrap_err();

        assert!(matches!(err, LifecycleError::EligibilityFailure { .. }));
        let stored = fx.backend.change_requests.all().await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].status, ChangeRequestStatus::Draft);
        assert_eq!(stored[0].reasons, vec![ReasonCode::MemberTypeMissing]);
    }

    #[tokio::test]
    async fn resubmit_succeeds_once_member_qualifies() {
        let fx = Fixture::new().await;
        let p = fx.active_membership().await;
        let mut premium = premium(&fx).await;
        let fellow = MemberType::new("fellow").unwrap();
        premium.eligible_member_types = [fellow.clone()].into_iter().collect();
        fx.backend.catalog.add_product(premium.clone()).await.unwrap();
        let handler = handler(&fx);
        handler.handle(plan_change(&p, premium.id)).await.unwrap_err();
        let draft = fx.backend.change_requests.all().await.remove(0);

        fx.members
            .upsert(MemberProfile::new(p.holder).with_member_type(fellow))
            .await;
        let result = handler
            .resubmit(ResubmitChangeRequestCommand {
                request_id: draft.id,
                today: date(2024, 6, 21),
            })
            .await
            .unwrap();

        assert_eq!(result.request.status, ChangeRequestStatus::Submitted);
        assert!(result.request.reasons.is_empty());
    }

    #[tokio::test]
    async fn extension_must_move_term_end_forward() {
        let fx = Fixture::new().await;
        let p = fx.active_membership().await;

        let err = handler(&fx)
            .handle(SubmitChangeRequestCommand {
                participation_id: p.id,
                kind: ChangeKind::Extension {
                    until: date(2024, 12, 1),
                },
                effective_date: date(2024, 6, 1),
                requested_by: None,
                today: date(2024, 6, 1),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, LifecycleError::Validation { .. }));
        assert!(fx.backend.change_requests.all().await.is_empty());
    }

    #[tokio::test]
    async fn pause_needs_no_proration() {
        let fx = Fixture::new().await;
        let p = fx.active_membership().await;

        let result = handler(&fx)
            .handle(SubmitChangeRequestCommand {
                participation_id: p.id,
                kind: ChangeKind::Pause {
                    resume_on: Some(date(2024, 9, 1)),
                },
                effective_date: date(2024, 6, 1),
                requested_by: None,
                today: date(2024, 5, 20),
            })
            .await
            .unwrap();

        assert_eq!(result.request.status, ChangeRequestStatus::Submitted);
        assert!(result.request.proration.is_none());
    }

    #[tokio::test]
    async fn payment_plan_outside_installment_bounds_is_refused() {
        let fx = Fixture::new().await;
        let p = fx.active_membership().await;
        let mut plan =
            PaymentPlan::new("M6", "Six months", dec!(300), 6, PaymentFrequency::Monthly).unwrap();
        plan.installments = 13;

        let err = handler(&fx)
            .handle(SubmitChangeRequestCommand {
                participation_id: p.id,
                kind: ChangeKind::PaymentPlanChange { plan: Some(plan) },
                effective_date: date(2024, 2, 1),
                requested_by: None,
                today: date(2024, 1, 20),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, LifecycleError::Validation { ref field, .. } if field == "installments"));
        assert!(fx.backend.change_requests.all().await.is_empty());
    }

    #[tokio::test]
    async fn payment_plan_is_submitted_without_proration() {
        let fx = Fixture::new().await;
        let p = fx.active_membership().await;
        let plan = PaymentPlan::new("Q4", "Quarterly", dec!(300), 4, PaymentFrequency::Quarterly).unwrap();

        let result = handler(&fx)
            .handle(SubmitChangeRequestCommand {
                participation_id: p.id,
                kind: ChangeKind::PaymentPlanChange { plan: Some(plan) },
                effective_date: date(2024, 1, 1),
                requested_by: None,
                today: date(2024, 1, 1),
            })
            .await
            .unwrap();

        assert_eq!(result.request.status, ChangeRequestStatus::Submitted);
        assert!(result.request.proration.is_none());
    }

    #[tokio::test]
    async fn dropping_a_plan_needs_one_in_place() {
        let fx = Fixture::new().await;
        let p = fx.active_membership().await;

        let err = handler(&fx)
            .handle(SubmitChangeRequestCommand {
                participation_id: p.id,
                kind: ChangeKind::PaymentPlanChange { plan: None },
                effective_date: date(2024, 3, 1),
                requested_by: None,
                today: date(2024, 3, 1),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, LifecycleError::Validation { .. }));
    }
}
