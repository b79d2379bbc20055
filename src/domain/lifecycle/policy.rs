//! Lifecycle policy.

use serde::{Deserialize, Serialize};

use crate::domain::participation::ParticipationStatus;

/// How a renewal is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenewalStrategy {
    /// Create a successor participation linked by `renewed_from`; the old
    /// one is terminated as superseded once its term has passed.
    #[default]
    NewParticipation,
    /// Move the term dates of the existing participation forward.
    ExtendInPlace,
}

/// Period lengths and approval rules the engine applies.
///
/// Built from configuration and passed in explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecyclePolicy {
    pub grace_period_days: u32,
    pub suspend_period_days: u32,
    pub renewal_strategy: RenewalStrategy,
    /// Transitions a non-automated caller may only request with approval.
    pub approval_required: Vec<(ParticipationStatus, ParticipationStatus)>,
}

impl Default for LifecyclePolicy {
    fn default() -> Self {
        Self {
            grace_period_days: 30,
            suspend_period_days: 90,
            renewal_strategy: RenewalStrategy::NewParticipation,
            approval_required: Self::termination_approvals(),
        }
    }
}

impl LifecyclePolicy {
    /// Terminating any open participation requires approval.
    pub fn termination_approvals() -> Vec<(ParticipationStatus, ParticipationStatus)> {
        use ParticipationStatus::*;
        vec![(Active, Terminated), (Grace, Terminated), (Suspended, Terminated)]
    }

    pub fn requires_approval(&self, from: ParticipationStatus, to: ParticipationStatus) -> bool {
        self.approval_required.contains(&(from, to))
    }

    pub fn with_grace_period_days(mut self, days: u32) -> Self {
        self.grace_period_days = days;
        self
    }

    pub fn with_renewal_strategy(mut self, strategy: RenewalStrategy) -> Self {
        self.renewal_strategy = strategy;
        self
    }

    pub fn without_approvals(mut self) -> Self {
        self.approval_required.clear();
        self
    }
}
