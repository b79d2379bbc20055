//! RequestTransitionHandler - Command handler for manual and system status changes.

use chrono::NaiveDate;
use tracing::instrument;

use super::TransitionExecutor;
use crate::domain::foundation::ParticipationId;
use crate::domain::lifecycle::{HookCall, LifecycleError, TransitionRequest};
use crate::domain::participation::{
    CancellationReason, HistoryRecord, Participation, ParticipationStatus,
};

/// Command to move a participation to another status.
#[derive(Debug, Clone)]
pub struct RequestTransitionCommand {
    pub participation_id: ParticipationId,
    pub target: ParticipationStatus,
    pub reason: String,
    pub automated: bool,
    pub external_ref: Option<String>,
    /// Approval for gated transitions was obtained elsewhere.
    pub approved: bool,
    pub suspend_until: Option<NaiveDate>,
    pub cancellation_reason: Option<CancellationReason>,
    pub today: NaiveDate,
}

impl RequestTransitionCommand {
    pub fn new(
        participation_id: ParticipationId,
        target: ParticipationStatus,
        reason: impl Into<String>,
        today: NaiveDate,
    ) -> Self {
        Self {
            participation_id,
            target,
            reason: reason.into(),
            automated: false,
            external_ref: None,
            approved: false,
            suspend_until: None,
            cancellation_reason: None,
            today,
        }
    }

    fn to_request(&self) -> TransitionRequest {
        TransitionRequest {
            target: self.target,
            reason: self.reason.clone(),
            automated: self.automated,
            external_ref: self.external_ref.clone(),
            approved: self.approved,
            suspend_until: self.suspend_until,
            cancellation_reason: self.cancellation_reason.clone(),
        }
    }
}

/// Result of a committed transition.
#[derive(Debug, Clone)]
pub struct RequestTransitionResult {
    pub participation: Participation,
    pub history: HistoryRecord,
    pub hooks: Vec<HookCall>,
}

/// Handler for status change requests.
///
/// Never retries: a version conflict is returned to the caller, who reloads
/// and decides again.
pub struct RequestTransitionHandler {
    executor: TransitionExecutor,
}

impl RequestTransitionHandler {
    pub fn new(executor: TransitionExecutor) -> Self {
        Self { executor }
    }

    #[instrument(skip(self), fields(participation_id = %cmd.participation_id, target = %cmd.target))]
    pub async fn handle(
        &self,
        cmd: RequestTransitionCommand,
    ) -> Result<RequestTransitionResult, LifecycleError> {
        let current = self
            .executor
            .repository()
            .find_by_id(&cmd.participation_id)
            .await?
            .ok_or_else(|| LifecycleError::not_found("Participation", cmd.participation_id))?;

        let outcome = self
            .executor
            .transition(&current, &cmd.to_request(), cmd.today)
            .await?;

        Ok(RequestTransitionResult {
            participation: outcome.participation,
            history: outcome.history,
            hooks: outcome.hooks,
        })
    }
}
