//! Benefit hooks that only log.
//!
//! Stands in for the access-control collaborator when the core runs on its
//! own, e.g. the sweep binary over a snapshot.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::domain::foundation::DomainError;
use crate::domain::participation::Participation;
use crate::ports::BenefitHooks;

#[derive(Debug, Default)]
pub struct TracingBenefitHooks {
    activations: AtomicUsize,
    suspensions: AtomicUsize,
    revocations: AtomicUsize,
}

impl TracingBenefitHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(activations, suspensions, revocations)` seen so far.
    pub fn counts(&self) -> (usize, usize, usize) {
        (
            self.activations.load(Ordering::Relaxed),
            self.suspensions.load(Ordering::Relaxed),
            self.revocations.load(Ordering::Relaxed),
        )
    }
}

#[async_trait]
impl BenefitHooks for TracingBenefitHooks {
    async fn on_activate(&self, participation: &Participation) -> Result<(), DomainError> {
        self.activations.fetch_add(1, Ordering::Relaxed);
        tracing::info!(
            participation_id = %participation.id,
            holder = %participation.holder,
            kind = participation.kind.label(),
            "benefits activated"
        );
        Ok(())
    }

    async fn on_suspend(&self, participation: &Participation) -> Result<(), DomainError> {
        self.suspensions.fetch_add(1, Ordering::Relaxed);
        tracing::info!(
            participation_id = %participation.id,
            suspend_end = ?participation.suspend_end,
            "benefits suspended"
        );
        Ok(())
    }

    async fn on_revoke(&self, participation: &Participation) -> Result<(), DomainError> {
        self.revocations.fetch_add(1, Ordering::Relaxed);
        tracing::info!(
            participation_id = %participation.id,
            status = %participation.status,
            "benefits revoked"
        );
        Ok(())
    }
}
