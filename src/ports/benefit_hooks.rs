//! Benefit hooks port.
//!
//! Implemented by the benefits / access-control collaborator. Hooks run
//! after a transition has committed; a failing hook is logged and never
//! rolls the transition back.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::participation::Participation;

#[async_trait]
pub trait BenefitHooks: Send + Sync {
    /// Participation gained access (first activation or resume).
    async fn on_activate(&self, participation: &Participation) -> Result<(), DomainError>;

    /// Participation was suspended.
    async fn on_suspend(&self, participation: &Participation) -> Result<(), DomainError>;

    /// Access must be withdrawn.
    async fn on_revoke(&self, participation: &Participation) -> Result<(), DomainError>;
}
