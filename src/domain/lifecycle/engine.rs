//! Lifecycle engine - the participation state machine with side effects.
//!
//! [`LifecycleEngine::apply`] is a pure decision step: it takes the current
//! participation and a request and returns the updated participation, the
//! history record to append, and the benefit hooks to fire after commit.
//! Nothing is persisted here.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{LifecycleError, LifecyclePolicy};
use crate::domain::foundation::{StateMachine, Timestamp};
use crate::domain::participation::{
    CancellationReason, HistoryRecord, Participation, ParticipationStatus,
};

/// A requested status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub target: ParticipationStatus,
    pub reason: String,
    /// Requested by the system rather than a person.
    pub automated: bool,
    /// Invoice, payment or ticket that caused the change.
    pub external_ref: Option<String>,
    /// Caller has already obtained approval for a gated transition.
    pub approved: bool,
    /// Explicit end of a suspension; defaults from the policy.
    pub suspend_until: Option<NaiveDate>,
    /// Recorded on terminal transitions; a default is chosen when absent.
    pub cancellation_reason: Option<CancellationReason>,
}

impl TransitionRequest {
    /// A manual request.
    pub fn new(target: ParticipationStatus, reason: impl Into<String>) -> Self {
        Self {
            target,
            reason: reason.into(),
            automated: false,
            external_ref: None,
            approved: false,
            suspend_until: None,
            cancellation_reason: None,
        }
    }

    /// A request issued by the system.
    pub fn automated(target: ParticipationStatus, reason: impl Into<String>) -> Self {
        Self {
            automated: true,
            ..Self::new(target, reason)
        }
    }

    pub fn with_external_ref(mut self, external_ref: impl Into<String>) -> Self {
        self.external_ref = Some(external_ref.into());
        self
    }

    pub fn with_approval(mut self) -> Self {
        self.approved = true;
        self
    }

    pub fn with_suspend_until(mut self, until: NaiveDate) -> Self {
        self.suspend_until = Some(until);
        self
    }

    pub fn with_cancellation_reason(mut self, reason: CancellationReason) -> Self {
        self.cancellation_reason = Some(reason);
        self
    }
}

/// Benefit collaborator call to make after a transition commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookCall {
    Activate,
    Suspend,
    Revoke,
}

/// Everything a committed transition produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionOutcome {
    pub participation: Participation,
    pub history: HistoryRecord,
    pub hooks: Vec<HookCall>,
}

/// Applies transitions under a [`LifecyclePolicy`].
#[derive(Debug, Clone, Default)]
pub struct LifecycleEngine {
    policy: LifecyclePolicy,
}

impl LifecycleEngine {
    pub fn new(policy: LifecyclePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &LifecyclePolicy {
        &self.policy
    }

    /// Decides a transition of `current` on `today`, stamped `at`.
    ///
    /// The caller supplies the clock, so the same inputs always give the
    /// same outcome.
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` when the target is unreachable
    /// - `ApprovalRequired` when a gated transition is requested manually
    ///   without approval
    /// - `Validation` when the result would break an aggregate invariant
    pub fn apply(
        &self,
        current: &Participation,
        request: &TransitionRequest,
        today: NaiveDate,
        at: Timestamp,
    ) -> Result<TransitionOutcome, LifecycleError> {
        let from = current.status;
        let to = request.target;

        if !from.can_transition_to(&to) {
            return Err(LifecycleError::InvalidTransition { from, to });
        }
        if !request.automated && !request.approved && self.policy.requires_approval(from, to) {
            return Err(LifecycleError::ApprovalRequired { from, to });
        }

        let mut next = current.clone();
        next.status = to;
        let mut hooks = Vec::new();

        if from == ParticipationStatus::Grace {
            next.grace_end = None;
        }
        if from == ParticipationStatus::Suspended {
            next.suspend_end = None;
        }

        match to {
            ParticipationStatus::Grace => {
                next.grace_end = Some(add_days(today, self.policy.grace_period_days)?);
            }
            ParticipationStatus::Active => {
                // Access was off in both of these; grace keeps access throughout.
                if matches!(from, ParticipationStatus::Prospect | ParticipationStatus::Suspended) {
                    hooks.push(HookCall::Activate);
                }
            }
            ParticipationStatus::Suspended => {
                let until = match request.suspend_until {
                    Some(until) if until < today => {
                        return Err(LifecycleError::validation(
                            "suspend_until",
                            format!("suspension end {} is before {}", until, today),
                        ))
                    }
                    Some(until) => until,
                    None => add_days(today, self.policy.suspend_period_days)?,
                };
                next.suspend_end = Some(until);
                hooks.push(HookCall::Suspend);
                hooks.push(HookCall::Revoke);
            }
            ParticipationStatus::Terminated | ParticipationStatus::Cancelled => {
                next.terminated_date = Some(today);
                next.cancellation_reason = Some(
                    request
                        .cancellation_reason
                        .clone()
                        .unwrap_or_else(|| default_reason(from, to, request.automated)),
                );
                hooks.push(HookCall::Revoke);
            }
            ParticipationStatus::Prospect => {}
        }

        next.check_invariants()?;
        next.touch_at(at);

        let history = HistoryRecord::new(
            current.id,
            from,
            to,
            request.reason.clone(),
            request.automated,
            request.external_ref.clone(),
            at,
        );

        Ok(TransitionOutcome {
            participation: next,
            history,
            hooks,
        })
    }
}

fn add_days(date: NaiveDate, days: u32) -> Result<NaiveDate, LifecycleError> {
    date.checked_add_days(Days::new(u64::from(days)))
        .ok_or_else(|| LifecycleError::validation("date", format!("{} + {} days is out of range", date, days)))
}

fn default_reason(
    from: ParticipationStatus,
    to: ParticipationStatus,
    automated: bool,
) -> CancellationReason {
    match (automated, from, to) {
        (true, ParticipationStatus::Grace, _) => CancellationReason::grace_expired(),
        (true, _, _) => CancellationReason::system(),
        (false, _, ParticipationStatus::Cancelled) => CancellationReason::member_request(),
        (false, _, _) => CancellationReason::administrative(),
    }
}
