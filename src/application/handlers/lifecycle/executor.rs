//! TransitionExecutor - commits engine decisions and runs their follow-ups.
//!
//! Every handler that changes a participation goes through here, so the
//! order is always the same: decide, commit status + history under the
//! version that was read, publish, fire hooks, sync the member record.
//! Only the commit can fail the operation; everything after it is logged.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::foundation::{SerializableDomainEvent, Timestamp};
use crate::domain::lifecycle::{
    HookCall, LifecycleEngine, LifecycleError, TransitionOutcome, TransitionRequest,
};
use crate::domain::participation::{HistoryRecord, Participation, ParticipationStatus};
use crate::ports::{BenefitHooks, EventPublisher, MemberDirectory, ParticipationRepository};

#[derive(Clone)]
pub struct TransitionExecutor {
    engine: LifecycleEngine,
    repository: Arc<dyn ParticipationRepository>,
    publisher: Arc<dyn EventPublisher>,
    hooks: Arc<dyn BenefitHooks>,
    members: Arc<dyn MemberDirectory>,
}

impl TransitionExecutor {
    pub fn new(
        engine: LifecycleEngine,
        repository: Arc<dyn ParticipationRepository>,
        publisher: Arc<dyn EventPublisher>,
        hooks: Arc<dyn BenefitHooks>,
        members: Arc<dyn MemberDirectory>,
    ) -> Self {
        Self {
            engine,
            repository,
            publisher,
            hooks,
            members,
        }
    }

    pub fn engine(&self) -> &LifecycleEngine {
        &self.engine
    }

    pub fn repository(&self) -> &Arc<dyn ParticipationRepository> {
        &self.repository
    }

    /// Transitions `current` and commits the result.
    ///
    /// `current` must be the record as read from the repository; its
    /// version guards the commit.
    pub async fn transition(
        &self,
        current: &Participation,
        request: &TransitionRequest,
        today: NaiveDate,
    ) -> Result<TransitionOutcome, LifecycleError> {
        let outcome = self.engine.apply(current, request, today, Timestamp::now())?;

        if outcome.participation.status == ParticipationStatus::Active {
            self.ensure_single_membership(&outcome.participation).await?;
        }

        let committed = self
            .repository
            .commit(&outcome.participation, current.version, &outcome.history)
            .await?;

        info!(
            participation_id = %committed.id,
            from = %outcome.history.old_status,
            to = %outcome.history.new_status,
            automated = outcome.history.automated,
            "participation transitioned"
        );

        self.publish(&outcome.history).await;
        self.fire_hooks(&committed, &outcome.hooks).await;
        self.sync_member(&committed).await;

        Ok(TransitionOutcome {
            participation: committed,
            ..outcome
        })
    }

    /// Commits a change that keeps the status, e.g. a plan change or an
    /// in-place renewal. The history record repeats the current status.
    pub async fn commit_change(
        &self,
        current: &Participation,
        updated: &Participation,
        reason: impl Into<String>,
        external_ref: Option<String>,
    ) -> Result<(Participation, HistoryRecord), LifecycleError> {
        updated.check_invariants()?;

        let history = HistoryRecord::new(
            updated.id,
            current.status,
            updated.status,
            reason,
            false,
            external_ref,
            Timestamp::now(),
        );
        let committed = self
            .repository
            .commit(updated, current.version, &history)
            .await?;

        debug!(
            participation_id = %committed.id,
            reason = %history.reason,
            "participation updated"
        );

        Ok((committed, history))
    }

    /// A holder may hold one active base membership at a time.
    ///
    /// The participation's own renewal lineage does not count: a successor
    /// may activate while its predecessor runs out.
    pub async fn ensure_single_membership(
        &self,
        participation: &Participation,
    ) -> Result<(), LifecycleError> {
        if !participation.kind.is_base_membership() {
            return Ok(());
        }

        let others = self.repository.find_by_holder(&participation.holder).await?;
        let conflicting = others.iter().find(|other| {
            other.id != participation.id
                && other.kind.is_base_membership()
                && other.status == ParticipationStatus::Active
                && participation.renewed_from != Some(other.id)
                && other.renewed_from != Some(participation.id)
        });

        match conflicting {
            Some(other) => Err(LifecycleError::validation(
                "status",
                format!(
                    "{} already holds active membership {}",
                    participation.holder, other.id
                ),
            )),
            None => Ok(()),
        }
    }

    async fn publish(&self, history: &HistoryRecord) {
        let result = match history.to_envelope() {
            Ok(envelope) => self.publisher.publish(envelope).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            warn!(
                participation_id = %history.participation_id,
                error = %e,
                "failed to publish status change"
            );
        }
    }

    /// Runs hooks in order. Failures are logged and never undo the commit.
    pub async fn fire_hooks(&self, participation: &Participation, hooks: &[HookCall]) {
        for hook in hooks {
            let result = match hook {
                HookCall::Activate => self.hooks.on_activate(participation).await,
                HookCall::Suspend => self.hooks.on_suspend(participation).await,
                HookCall::Revoke => self.hooks.on_revoke(participation).await,
            };
            if let Err(e) = result {
                warn!(
                    participation_id = %participation.id,
                    hook = ?hook,
                    error = %e,
                    "benefit hook failed"
                );
            }
        }
    }

    async fn sync_member(&self, participation: &Participation) {
        if !participation.kind.is_base_membership() {
            return;
        }
        let status = participation.status.member_status();
        if let Err(e) = self.members.sync_status(&participation.holder, status).await {
            warn!(
                participation_id = %participation.id,
                holder = %participation.holder,
                error = %e,
                "failed to sync member status"
            );
        }
    }
}
