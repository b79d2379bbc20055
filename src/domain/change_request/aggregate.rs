//! ChangeRequest aggregate.
//!
//! A proposed mutation of one participation. Created by staff or a
//! self-service flow, reviewed, and applied exactly once when processed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ChangeRequestStatus;
use crate::domain::billing::{PaymentPlan, ProrationResult};
use crate::domain::eligibility::{Eligibility, ReasonCode};
use crate::domain::foundation::{
    ChangeRequestId, MemberType, ParticipationId, ProductId, StateMachine, Timestamp,
};
use crate::domain::lifecycle::LifecycleError;
use crate::domain::participation::CancellationReason;

/// What the request changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeKind {
    /// Move to another product mid-term.
    PlanChange { target_product: ProductId },
    /// Change member type, optionally onto another product.
    CategoryChange {
        target_member_type: MemberType,
        #[serde(default)]
        target_product: Option<ProductId>,
    },
    /// Suspend until `resume_on`, or for the policy's default period.
    Pause {
        #[serde(default)]
        resume_on: Option<NaiveDate>,
    },
    /// End before term end.
    EarlyTermination { reason: CancellationReason },
    /// Push term end out to `until`.
    Extension { until: NaiveDate },
    /// Pay the term in installments under `plan`, starting on the
    /// effective date. `None` drops the plan.
    PaymentPlanChange {
        #[serde(default)]
        plan: Option<PaymentPlan>,
    },
}

impl ChangeKind {
    /// Product the participation moves onto, if any.
    pub fn target_product(&self) -> Option<ProductId> {
        match self {
            ChangeKind::PlanChange { target_product } => Some(*target_product),
            ChangeKind::CategoryChange { target_product, .. } => *target_product,
            _ => None,
        }
    }

    pub fn target_member_type(&self) -> Option<&MemberType> {
        match self {
            ChangeKind::CategoryChange { target_member_type, .. } => Some(target_member_type),
            _ => None,
        }
    }

    /// Plan and category changes need eligibility and proration.
    pub fn is_pricing_change(&self) -> bool {
        matches!(self, ChangeKind::PlanChange { .. } | ChangeKind::CategoryChange { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChangeKind::PlanChange { .. } => "plan_change",
            ChangeKind::CategoryChange { .. } => "category_change",
            ChangeKind::Pause { .. } => "pause",
            ChangeKind::EarlyTermination { .. } => "early_termination",
            ChangeKind::Extension { .. } => "extension",
            ChangeKind::PaymentPlanChange { .. } => "payment_plan_change",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRequest {
    pub id: ChangeRequestId,
    pub participation_id: ParticipationId,
    pub kind: ChangeKind,
    pub effective_date: NaiveDate,
    pub status: ChangeRequestStatus,
    /// Filled on submit for pricing changes.
    #[serde(default)]
    pub proration: Option<ProrationResult>,
    /// Eligibility failures found on the last submit attempt.
    #[serde(default)]
    pub reasons: Vec<ReasonCode>,
    #[serde(default)]
    pub requested_by: Option<String>,
    #[serde(default)]
    pub review_note: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default)]
    pub processed_at: Option<Timestamp>,
}

impl ChangeRequest {
    /// Creates a draft request.
    pub fn draft(participation_id: ParticipationId, kind: ChangeKind, effective_date: NaiveDate) -> Self {
        let now = Timestamp::now();
        Self {
            id: ChangeRequestId::new(),
            participation_id,
            kind,
            effective_date,
            status: ChangeRequestStatus::Draft,
            proration: None,
            reasons: Vec::new(),
            requested_by: None,
            review_note: None,
            created_at: now,
            updated_at: now,
            processed_at: None,
        }
    }

    pub fn requested_by(mut self, actor: impl Into<String>) -> Self {
        self.requested_by = Some(actor.into());
        self
    }

    /// Submits the request for review.
    ///
    /// An ineligible request records its reasons and stays in draft.
    pub fn submit(
        &mut self,
        eligibility: &Eligibility,
        proration: Option<ProrationResult>,
    ) -> Result<(), LifecycleError> {
        self.ensure_can(ChangeRequestStatus::Submitted, "submit")?;
        self.reasons = eligibility.reasons.clone();
        self.proration = proration;
        self.updated_at = Timestamp::now();
        if !eligibility.eligible {
            return Err(LifecycleError::EligibilityFailure {
                reasons: eligibility.reasons.clone(),
            });
        }
        self.status = ChangeRequestStatus::Submitted;
        Ok(())
    }

    pub fn approve(&mut self, note: Option<String>) -> Result<(), LifecycleError> {
        self.move_to(ChangeRequestStatus::Approved, "approve")?;
        self.review_note = note;
        Ok(())
    }

    pub fn reject(&mut self, note: Option<String>) -> Result<(), LifecycleError> {
        self.move_to(ChangeRequestStatus::Rejected, "reject")?;
        self.review_note = note;
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), LifecycleError> {
        self.move_to(ChangeRequestStatus::Cancelled, "cancel")
    }

    /// Marks the request consumed.
    pub fn mark_processed(&mut self) -> Result<(), LifecycleError> {
        self.move_to(ChangeRequestStatus::Processed, "process")?;
        self.processed_at = Some(Timestamp::now());
        Ok(())
    }

    /// Approved and effective on or before `as_of`.
    pub fn is_due(&self, as_of: NaiveDate) -> bool {
        self.status == ChangeRequestStatus::Approved && self.effective_date <= as_of
    }

    fn move_to(&mut self, target: ChangeRequestStatus, action: &str) -> Result<(), LifecycleError> {
        self.ensure_can(target, action)?;
        self.status = target;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    fn ensure_can(&self, target: ChangeRequestStatus, action: &str) -> Result<(), LifecycleError> {
        if self.status.can_transition_to(&target) {
            Ok(())
        } else {
            Err(LifecycleError::InvalidChangeRequestState {
                status: self.status.to_string(),
                action: action.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn request() -> ChangeRequest {
        ChangeRequest::draft(
            ParticipationId::new(),
            ChangeKind::PlanChange { target_product: ProductId::new() },
            date(2024, 7, 1),
        )
    }

    fn eligible() -> Eligibility {
        Eligibility { eligible: true, reasons: vec![] }
    }

    #[test]
    fn ineligible_submit_stays_draft_with_reasons() {
        let mut cr = request();
        let verdict = Eligibility {
            eligible: false,
            reasons: vec![ReasonCode::MemberOnly],
        };
        let err = cr.submit(&verdict, None).unwrap_err();
        assert!(matches!(err, LifecycleError::EligibilityFailure { .. }));
        assert_eq!(cr.status, ChangeRequestStatus::Draft);
        assert_eq!(cr.reasons, vec![ReasonCode::MemberOnly]);
    }

    #[test]
    fn resubmit_after_fix_clears_reasons() {
        let mut cr = request();
        let _ = cr.submit(&Eligibility { eligible: false, reasons: vec![ReasonCode::MemberOnly] }, None);
        cr.submit(&eligible(), None).unwrap();
        assert_eq!(cr.status, ChangeRequestStatus::Submitted);
        assert!(cr.reasons.is_empty());
    }

    #[test]
    fn approve_requires_submission() {
        let mut cr = request();
        let err = cr.approve(None).unwrap_err();
        assert_eq!(
            err,
            LifecycleError::InvalidChangeRequestState {
                status: "draft".to_string(),
                action: "approve".to_string()
            }
        );
    }

    #[test]
    fn processed_exactly_once() {
        let mut cr = request();
        cr.submit(&eligible(), None).unwrap();
        cr.approve(Some("ok".to_string())).unwrap();
        cr.mark_processed().unwrap();
        assert!(cr.processed_at.is_some());
        assert!(cr.mark_processed().is_err());
    }

    #[test]
    fn due_only_when_approved_and_effective() {
        let mut cr = request();
        cr.submit(&eligible(), None).unwrap();
        assert!(!cr.is_due(date(2024, 7, 1)));
        cr.approve(None).unwrap();
        assert!(!cr.is_due(date(2024, 6, 30)));
        assert!(cr.is_due(date(2024, 7, 1)));
    }

    #[test]
    fn category_change_exposes_targets() {
        let kind = ChangeKind::CategoryChange {
            target_member_type: MemberType::new("retired").unwrap(),
            target_product: None,
        };
        assert!(kind.is_pricing_change());
        assert_eq!(kind.target_product(), None);
        assert_eq!(kind.target_member_type().map(MemberType::as_str), Some("retired"));
        assert!(!ChangeKind::Pause { resume_on: None }.is_pricing_change());
    }

    #[test]
    fn payment_plan_change_is_tagged_by_label() {
        let plan = PaymentPlan::new(
            "Q4",
            "Quarterly",
            rust_decimal_macros::dec!(300),
            4,
            crate::domain::billing::PaymentFrequency::Quarterly,
        )
        .unwrap();
        let kind = ChangeKind::PaymentPlanChange { plan: Some(plan) };

        let json = serde_json::to_value(&kind).unwrap();
        assert_eq!(json["type"], kind.label());
        assert_eq!(json["plan"]["installments"], 4);
        assert!(!kind.is_pricing_change());
    }
}
