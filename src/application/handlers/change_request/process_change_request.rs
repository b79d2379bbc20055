//! ProcessChangeRequestHandler - Applies an approved change request.
//!
//! A request is applied once its effective date has arrived and is then
//! marked processed, so it is never consumed twice. Pauses and early
//! terminations go through the lifecycle engine; plan, category, payment
//! plan and term changes keep the status and are committed with a history
//! entry.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::target_price;
use crate::application::handlers::lifecycle::TransitionExecutor;
use crate::domain::change_request::{ChangeKind, ChangeRequest, ChangeRequestStatus};
use crate::domain::foundation::ChangeRequestId;
use crate::domain::lifecycle::{LifecycleError, TransitionRequest};
use crate::domain::participation::{HistoryRecord, Participation, ParticipationStatus};
use crate::ports::{CatalogReader, ChangeRequestRepository, MemberDirectory};

#[derive(Debug, Clone)]
pub struct ProcessChangeRequestCommand {
    pub request_id: ChangeRequestId,
    pub today: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct ProcessChangeRequestResult {
    pub request: ChangeRequest,
    pub participation: Participation,
    pub history: HistoryRecord,
}

pub struct ProcessChangeRequestHandler {
    executor: TransitionExecutor,
    requests: Arc<dyn ChangeRequestRepository>,
    catalog: Arc<dyn CatalogReader>,
    members: Arc<dyn MemberDirectory>,
}

impl ProcessChangeRequestHandler {
    pub fn new(
        executor: TransitionExecutor,
        requests: Arc<dyn ChangeRequestRepository>,
        catalog: Arc<dyn CatalogReader>,
        members: Arc<dyn MemberDirectory>,
    ) -> Self {
        Self {
            executor,
            requests,
            catalog,
            members,
        }
    }

    #[instrument(skip(self), fields(request_id = %cmd.request_id))]
    pub async fn handle(
        &self,
        cmd: ProcessChangeRequestCommand,
    ) -> Result<ProcessChangeRequestResult, LifecycleError> {
        let mut request = self
            .requests
            .find_by_id(&cmd.request_id)
            .await?
            .ok_or_else(|| LifecycleError::not_found("ChangeRequest", cmd.request_id))?;

        if request.status != ChangeRequestStatus::Approved {
            return Err(LifecycleError::InvalidChangeRequestState {
                status: request.status.to_string(),
                action: "process".to_string(),
            });
        }
        if request.effective_date > cmd.today {
            return Err(LifecycleError::InvalidChangeRequestState {
                status: request.status.to_string(),
                action: format!("process before its effective date {}", request.effective_date),
            });
        }

        let current = self
            .executor
            .repository()
            .find_by_id(&request.participation_id)
            .await?
            .ok_or_else(|| LifecycleError::not_found("Participation", request.participation_id))?;
        if !current.status.is_open() {
            return Err(LifecycleError::validation(
                "participation",
                format!("participation is {}, no further changes apply", current.status),
            ));
        }

        let (participation, history) = self.apply(&request, &current, cmd.today).await?;

        request.mark_processed()?;
        self.requests.update(&request).await?;

        info!(
            participation_id = %participation.id,
            kind = request.kind.label(),
            "change request processed"
        );
        Ok(ProcessChangeRequestResult {
            request,
            participation,
            history,
        })
    }

    async fn apply(
        &self,
        request: &ChangeRequest,
        current: &Participation,
        today: NaiveDate,
    ) -> Result<(Participation, HistoryRecord), LifecycleError> {
        let external_ref = Some(request.id.to_string());

        match &request.kind {
            ChangeKind::PlanChange { .. } | ChangeKind::CategoryChange { .. } => {
                let target = target_price::resolve(
                    self.catalog.as_ref(),
                    self.members.as_ref(),
                    current,
                    &request.kind,
                    request.effective_date,
                )
                .await?;

                let mut updated = current.clone();
                updated.product_id = target.product.id;
                updated.unit_price = target.price.price;
                updated.currency = target.product.currency.clone();
                updated.renew_to_product = None;
                let reason = format!(
                    "{} to {} ({})",
                    request.kind.label(),
                    target.product.name,
                    target.price.tier_label
                );
                let committed = self
                    .executor
                    .commit_change(current, &updated, reason, external_ref)
                    .await?;
                if let Some(member_type) = request.kind.target_member_type() {
                    if let Err(e) = self.members.set_member_type(&current.holder, member_type).await {
                        warn!(
                            participation_id = %current.id,
                            holder = %current.holder,
                            error = %e,
                            "failed to sync member type"
                        );
                    }
                }
                Ok(committed)
            }
            ChangeKind::Extension { until } => {
                let mut updated = current.clone();
                updated.term_end = *until;
                updated.bill_through = *until;
                self.executor
                    .commit_change(current, &updated, format!("Term extended to {}", until), external_ref)
                    .await
            }
            ChangeKind::PaymentPlanChange { plan } => {
                let mut updated = current.clone();
                let reason = match plan {
                    Some(plan) => {
                        updated.payment_schedule = Some(plan.schedule(request.effective_date)?);
                        format!(
                            "Payment plan {} in {} installments from {}",
                            plan.code, plan.installments, request.effective_date
                        )
                    }
                    None => {
                        updated.payment_schedule = None;
                        "Payment plan dropped".to_string()
                    }
                };
                self.executor
                    .commit_change(current, &updated, reason, external_ref)
                    .await
            }
            ChangeKind::Pause { resume_on } => {
                let mut transition =
                    TransitionRequest::new(ParticipationStatus::Suspended, "Paused on request")
                        .with_approval();
                if let Some(resume_on) = resume_on {
                    transition = transition.with_suspend_until(*resume_on);
                }
                self.transition(current, transition, external_ref, today).await
            }
            ChangeKind::EarlyTermination { reason } => {
                let transition = TransitionRequest::new(
                    ParticipationStatus::Terminated,
                    format!("Early termination: {}", reason.label),
                )
                .with_approval()
                .with_cancellation_reason(reason.clone());
                self.transition(current, transition, external_ref, today).await
            }
        }
    }

    async fn transition(
        &self,
        current: &Participation,
        mut transition: TransitionRequest,
        external_ref: Option<String>,
        today: NaiveDate,
    ) -> Result<(Participation, HistoryRecord), LifecycleError> {
        transition.external_ref = external_ref;
        let outcome = self.executor.transition(current, &transition, today).await?;
        Ok((outcome.participation, outcome.history))
    }
}
