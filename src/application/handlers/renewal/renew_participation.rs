//! RenewParticipationHandler - Renews a participation into its next term.
//!
//! Replays are safe. Under the new-participation strategy an existing
//! successor (found through `renewed_from`) is returned instead of creating
//! another; losing an insert race to a concurrent renewal does the same.
//! Under extend-in-place, a participation whose term already moved past
//! `renewing_term_end` is returned unchanged.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::application::handlers::lifecycle::TransitionExecutor;
use crate::domain::foundation::{ParticipationId, Timestamp};
use crate::domain::lifecycle::{LifecycleError, RenewalStrategy, TransitionRequest};
use crate::domain::participation::{Participation, ParticipationStatus};
use crate::domain::renewal::{RenewalOrchestrator, RenewalPlan};
use crate::ports::{CatalogReader, MemberDirectory};

/// What has been paid towards the new term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenewalPayment {
    /// Invoice outstanding; a successor starts as a prospect.
    Unpaid,
    /// The whole new term is paid.
    FullTerm { funding_ref: Option<String> },
    Through {
        paid_through: NaiveDate,
        funding_ref: Option<String>,
    },
}

impl RenewalPayment {
    fn resolve(&self, plan: &RenewalPlan) -> (Option<NaiveDate>, Option<String>) {
        match self {
            RenewalPayment::Unpaid => (None, None),
            RenewalPayment::FullTerm { funding_ref } => (Some(plan.term_end), funding_ref.clone()),
            RenewalPayment::Through {
                paid_through,
                funding_ref,
            } => (Some(*paid_through), funding_ref.clone()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenewParticipationCommand {
    pub participation_id: ParticipationId,
    /// Term end the caller saw when deciding to renew.
    pub renewing_term_end: Option<NaiveDate>,
    pub payment: RenewalPayment,
    pub today: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct RenewParticipationResult {
    /// The successor, or the extended participation.
    pub participation: Participation,
    pub strategy: RenewalStrategy,
    /// False when an earlier renewal was returned.
    pub created: bool,
}

pub struct RenewParticipationHandler {
    executor: TransitionExecutor,
    catalog: Arc<dyn CatalogReader>,
    members: Arc<dyn MemberDirectory>,
    orchestrator: RenewalOrchestrator,
}

impl RenewParticipationHandler {
    pub fn new(
        executor: TransitionExecutor,
        catalog: Arc<dyn CatalogReader>,
        members: Arc<dyn MemberDirectory>,
    ) -> Self {
        let orchestrator = RenewalOrchestrator::new(executor.engine().policy().renewal_strategy);
        Self {
            executor,
            catalog,
            members,
            orchestrator,
        }
    }

    #[instrument(skip(self), fields(participation_id = %cmd.participation_id))]
    pub async fn handle(
        &self,
        cmd: RenewParticipationCommand,
    ) -> Result<RenewParticipationResult, LifecycleError> {
        let strategy = self.orchestrator.strategy();
        let repository = self.executor.repository();

        if strategy == RenewalStrategy::NewParticipation {
            if let Some(existing) = repository.find_renewed_from(&cmd.participation_id).await? {
                return Ok(replayed(existing, strategy));
            }
        }

        let current = repository
            .find_by_id(&cmd.participation_id)
            .await?
            .ok_or_else(|| LifecycleError::not_found("Participation", cmd.participation_id))?;

        if let Some(seen) = cmd.renewing_term_end {
            if current.term_end > seen {
                return Ok(replayed(current, strategy));
            }
        }

        let plan = self.plan(&current).await?;
        let (paid_through, funding_ref) = cmd.payment.resolve(&plan);

        match strategy {
            RenewalStrategy::NewParticipation => {
                self.create_successor(&current, &plan, paid_through, funding_ref)
                    .await
            }
            RenewalStrategy::ExtendInPlace => {
                self.extend(&current, &plan, paid_through, funding_ref, cmd.today)
                    .await
            }
        }
    }

    async fn plan(&self, current: &Participation) -> Result<RenewalPlan, LifecycleError> {
        let product_id = current.renewal_product();
        let product = self
            .catalog
            .product(&product_id)
            .await?
            .ok_or_else(|| LifecycleError::not_found("Product", product_id))?;
        let tiers = self.catalog.tiers_for(&product_id).await?;
        let member_type = self
            .members
            .profile(&current.holder)
            .await?
            .and_then(|profile| profile.member_type);

        self.orchestrator
            .plan(current, &product, &tiers, member_type.as_ref())
    }

    async fn create_successor(
        &self,
        current: &Participation,
        plan: &RenewalPlan,
        paid_through: Option<NaiveDate>,
        funding_ref: Option<String>,
    ) -> Result<RenewParticipationResult, LifecycleError> {
        let successor = self
            .orchestrator
            .successor(current, plan, paid_through, funding_ref)?;
        let repository = self.executor.repository();

        if let Err(e) = repository.insert(&successor).await {
            let err = LifecycleError::from(e);
            if err.is_conflict() {
                if let Some(existing) = repository.find_renewed_from(&current.id).await? {
                    warn!(successor_id = %existing.id, "renewal raced; returning existing successor");
                    return Ok(replayed(existing, RenewalStrategy::NewParticipation));
                }
            }
            return Err(err);
        }

        info!(
            successor_id = %successor.id,
            term_begin = %plan.term_begin,
            term_end = %plan.term_end,
            status = %successor.status,
            "participation renewed"
        );
        Ok(RenewParticipationResult {
            participation: successor,
            strategy: RenewalStrategy::NewParticipation,
            created: true,
        })
    }

    async fn extend(
        &self,
        current: &Participation,
        plan: &RenewalPlan,
        paid_through: Option<NaiveDate>,
        funding_ref: Option<String>,
        today: NaiveDate,
    ) -> Result<RenewParticipationResult, LifecycleError> {
        let extended = self
            .orchestrator
            .extend(current, plan, paid_through, funding_ref.clone())?;

        // Reactivation is a second commit. Check it would pass before the
        // term moves, so a refusal leaves the record untouched.
        let reactivation = if lapsed(extended.status) && extended.paid_through >= today {
            let mut request =
                TransitionRequest::automated(ParticipationStatus::Active, "Renewal paid");
            request.external_ref = funding_ref.clone();
            let outcome = self
                .executor
                .engine()
                .apply(&extended, &request, today, Timestamp::now())?;
            self.executor
                .ensure_single_membership(&outcome.participation)
                .await?;
            Some(request)
        } else {
            None
        };

        let (mut committed, _) = self
            .executor
            .commit_change(
                current,
                &extended,
                format!("Renewed in place through {}", plan.term_end),
                funding_ref,
            )
            .await?;

        if let Some(request) = reactivation {
            committed = match self.executor.transition(&committed, &request, today).await {
                Ok(outcome) => outcome.participation,
                Err(e) => {
                    warn!(
                        participation_id = %committed.id,
                        term_end = %committed.term_end,
                        status = %committed.status,
                        error = %e,
                        "term extended but reactivation failed"
                    );
                    return Err(e);
                }
            };
        }

        info!(
            participation_id = %committed.id,
            term_end = %committed.term_end,
            status = %committed.status,
            "participation extended"
        );
        Ok(RenewParticipationResult {
            participation: committed,
            strategy: RenewalStrategy::ExtendInPlace,
            created: true,
        })
    }
}

fn lapsed(status: ParticipationStatus) -> bool {
    matches!(status, ParticipationStatus::Grace | ParticipationStatus::Suspended)
}

fn replayed(participation: Participation, strategy: RenewalStrategy) -> RenewParticipationResult {
    info!(participation_id = %participation.id, "renewal already recorded");
    RenewParticipationResult {
        participation,
        strategy,
        created: false,
    }
}
