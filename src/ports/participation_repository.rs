//! Participation repository port.
//!
//! Stores participations and their append-only history.
//!
//! # Design
//!
//! - **Atomic commits**: a status write and its history record land together
//!   or not at all
//! - **Optimistic locking**: every write names the version it read; a
//!   mismatch fails with `ConcurrencyConflict` and changes nothing
//! - **Never deletes**: terminal participations stay for audit

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ParticipationId};
use crate::domain::member::Holder;
use crate::domain::participation::{HistoryRecord, Participation};

#[async_trait]
pub trait ParticipationRepository: Send + Sync {
    /// Stores a new participation.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if the id already exists
    /// - `ConcurrencyConflict` if another participation already renewed
    ///   the same predecessor
    async fn insert(&self, participation: &Participation) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &ParticipationId) -> Result<Option<Participation>, DomainError>;

    /// All participations in an open status (active, grace, suspended).
    async fn find_open(&self) -> Result<Vec<Participation>, DomainError>;

    async fn find_by_holder(&self, holder: &Holder) -> Result<Vec<Participation>, DomainError>;

    /// The participation whose `renewed_from` is `id`, if one exists.
    async fn find_renewed_from(
        &self,
        id: &ParticipationId,
    ) -> Result<Option<Participation>, DomainError>;

    /// Writes `participation` and appends `history` in one step.
    ///
    /// Returns the stored participation with its version bumped.
    ///
    /// # Errors
    ///
    /// - `ParticipationNotFound` if it was never inserted
    /// - `ConcurrencyConflict` if the stored version is not `expected_version`
    async fn commit(
        &self,
        participation: &Participation,
        expected_version: u64,
        history: &HistoryRecord,
    ) -> Result<Participation, DomainError>;

    /// History of one participation, oldest first.
    async fn history_for(&self, id: &ParticipationId) -> Result<Vec<HistoryRecord>, DomainError>;
}
