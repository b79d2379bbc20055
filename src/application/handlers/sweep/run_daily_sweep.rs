//! RunDailySweepHandler - Date-driven transitions over every open participation.
//!
//! Runs, in order:
//! 1. approved change requests that have come due (optional)
//! 2. auto-renewals of funded participations at term end (optional)
//! 3. overdue installments on payment plans, which get their late fee
//! 4. the status passes: superseded, lapse, grace expiry, suspension end
//!
//! Rows are independent and transition concurrently up to
//! `max_concurrency`. A version conflict means someone else changed the row
//! since it was read; it is counted and left for the next run. Running the
//! sweep twice for the same date changes nothing the second time.

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::application::handlers::change_request::{
    ProcessScheduledChangesCommand, ProcessScheduledChangesHandler, ScheduledChangesReport,
};
use crate::application::handlers::lifecycle::TransitionExecutor;
use crate::application::handlers::renewal::{
    RenewParticipationCommand, RenewParticipationHandler, RenewalPayment,
};
use crate::config::SweepConfig;
use crate::domain::lifecycle::{sweep, LifecycleError, SweepPass};
use crate::domain::participation::Participation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepOptions {
    pub max_concurrency: usize,
    pub process_scheduled_changes: bool,
    pub auto_renew: bool,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self::from(&SweepConfig::default())
    }
}

impl From<&SweepConfig> for SweepOptions {
    fn from(config: &SweepConfig) -> Self {
        Self {
            max_concurrency: config.max_concurrency.max(1),
            process_scheduled_changes: config.process_scheduled_changes,
            auto_renew: config.auto_renew,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunDailySweepCommand {
    pub as_of: NaiveDate,
}

/// Summary of one sweep run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub as_of: NaiveDate,
    /// Open participations the status passes looked at.
    pub evaluated: usize,
    pub transitioned: usize,
    /// Rows skipped on a version conflict; retried next run.
    pub conflicts: usize,
    pub failures: usize,
    /// Transitions per pass.
    pub passes: BTreeMap<&'static str, usize>,
    pub renewals_created: usize,
    pub renewal_failures: usize,
    /// Installments newly marked overdue.
    pub installments_overdue: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_changes: Option<ScheduledChangesReport>,
}

impl SweepReport {
    fn new(as_of: NaiveDate) -> Self {
        Self {
            as_of,
            evaluated: 0,
            transitioned: 0,
            conflicts: 0,
            failures: 0,
            passes: BTreeMap::new(),
            renewals_created: 0,
            renewal_failures: 0,
            installments_overdue: 0,
            scheduled_changes: None,
        }
    }
}

enum RowOutcome {
    Unchanged,
    Transitioned(SweepPass),
    Conflict,
    Failed,
}

pub struct RunDailySweepHandler {
    executor: TransitionExecutor,
    options: SweepOptions,
    scheduled_changes: Option<Arc<ProcessScheduledChangesHandler>>,
    renewals: Option<Arc<RenewParticipationHandler>>,
}

impl RunDailySweepHandler {
    pub fn new(executor: TransitionExecutor, options: SweepOptions) -> Self {
        Self {
            executor,
            options,
            scheduled_changes: None,
            renewals: None,
        }
    }

    pub fn with_scheduled_changes(mut self, handler: Arc<ProcessScheduledChangesHandler>) -> Self {
        self.scheduled_changes = Some(handler);
        self
    }

    pub fn with_renewals(mut self, handler: Arc<RenewParticipationHandler>) -> Self {
        self.renewals = Some(handler);
        self
    }

    #[instrument(skip(self))]
    pub async fn handle(&self, cmd: RunDailySweepCommand) -> Result<SweepReport, LifecycleError> {
        let as_of = cmd.as_of;
        let mut report = SweepReport::new(as_of);

        if self.options.process_scheduled_changes {
            if let Some(handler) = &self.scheduled_changes {
                report.scheduled_changes =
                    Some(handler.handle(ProcessScheduledChangesCommand { as_of }).await?);
            }
        }

        if self.options.auto_renew {
            if let Some(handler) = &self.renewals {
                self.auto_renew(handler, as_of, &mut report).await?;
            }
        }

        self.process_installments(as_of, &mut report).await?;

        let open = self.executor.repository().find_open().await?;
        report.evaluated = open.len();

        let outcomes: Vec<RowOutcome> = stream::iter(open)
            .map(|p| self.sweep_row(p, as_of))
            .buffer_unordered(self.options.max_concurrency)
            .collect()
            .await;

        for outcome in outcomes {
            match outcome {
                RowOutcome::Unchanged => {}
                RowOutcome::Transitioned(pass) => {
                    report.transitioned += 1;
                    *report.passes.entry(pass.as_str()).or_default() += 1;
                }
                RowOutcome::Conflict => report.conflicts += 1,
                RowOutcome::Failed => report.failures += 1,
            }
        }

        info!(
            as_of = %as_of,
            evaluated = report.evaluated,
            transitioned = report.transitioned,
            conflicts = report.conflicts,
            failures = report.failures,
            renewals = report.renewals_created,
            installments_overdue = report.installments_overdue,
            "daily sweep complete"
        );
        Ok(report)
    }

    async fn sweep_row(&self, p: Participation, as_of: NaiveDate) -> RowOutcome {
        let successor = match self.executor.repository().find_renewed_from(&p.id).await {
            Ok(successor) => successor,
            Err(e) => {
                warn!(participation_id = %p.id, error = %e, "sweep lookup failed");
                return RowOutcome::Failed;
            }
        };

        let Some(decision) = sweep::evaluate(&p, successor.as_ref(), as_of) else {
            return RowOutcome::Unchanged;
        };
        debug!(
            participation_id = %p.id,
            pass = decision.pass.as_str(),
            target = %decision.request.target,
            "sweep transition"
        );

        match self.executor.transition(&p, &decision.request, as_of).await {
            Ok(_) => RowOutcome::Transitioned(decision.pass),
            Err(e) if e.is_conflict() => {
                warn!(participation_id = %p.id, "sweep skipped row on version conflict");
                RowOutcome::Conflict
            }
            Err(e) => {
                warn!(participation_id = %p.id, error = %e, "sweep transition failed");
                RowOutcome::Failed
            }
        }
    }

    async fn process_installments(
        &self,
        as_of: NaiveDate,
        report: &mut SweepReport,
    ) -> Result<(), LifecycleError> {
        let due: Vec<(Participation, Participation, usize)> = self
            .executor
            .repository()
            .find_open()
            .await?
            .into_iter()
            .filter_map(|p| {
                let mut updated = p.clone();
                let marked = updated.payment_schedule.as_mut()?.process_overdue(as_of);
                (marked > 0).then_some((p, updated, marked))
            })
            .collect();

        let results: Vec<_> = stream::iter(due)
            .map(|(current, updated, marked)| async move {
                let reason = format!("Automatic: {} installment(s) overdue", marked);
                let result = self
                    .executor
                    .commit_change(&current, &updated, reason, None)
                    .await;
                (current.id, marked, result)
            })
            .buffer_unordered(self.options.max_concurrency)
            .collect()
            .await;

        for (id, marked, result) in results {
            match result {
                Ok(_) => report.installments_overdue += marked,
                Err(e) if e.is_conflict() => {
                    warn!(participation_id = %id, "installments skipped on version conflict");
                    report.conflicts += 1;
                }
                Err(e) => {
                    warn!(participation_id = %id, error = %e, "installment update failed");
                    report.failures += 1;
                }
            }
        }
        Ok(())
    }

    async fn auto_renew(
        &self,
        handler: &RenewParticipationHandler,
        as_of: NaiveDate,
        report: &mut SweepReport,
    ) -> Result<(), LifecycleError> {
        let candidates: Vec<Participation> = self
            .executor
            .repository()
            .find_open()
            .await?
            .into_iter()
            .filter(|p| p.can_auto_renew(as_of))
            .collect();

        let results: Vec<_> = stream::iter(candidates)
            .map(|p| {
                let cmd = RenewParticipationCommand {
                    participation_id: p.id,
                    renewing_term_end: Some(p.term_end),
                    payment: RenewalPayment::FullTerm {
                        funding_ref: p.funding_ref.clone(),
                    },
                    today: as_of,
                };
                async move { (p.id, handler.handle(cmd).await) }
            })
            .buffer_unordered(self.options.max_concurrency)
            .collect()
            .await;

        for (id, result) in results {
            match result {
                Ok(renewal) if renewal.created => report.renewals_created += 1,
                Ok(_) => {}
                Err(e) => {
                    report.renewal_failures += 1;
                    warn!(participation_id = %id, error = %e, "auto-renewal failed");
                }
            }
        }
        Ok(())
    }
}
