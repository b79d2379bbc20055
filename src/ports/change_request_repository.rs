//! Change request repository port.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::change_request::ChangeRequest;
use crate::domain::foundation::{ChangeRequestId, DomainError, ParticipationId};

#[async_trait]
pub trait ChangeRequestRepository: Send + Sync {
    async fn insert(&self, request: &ChangeRequest) -> Result<(), DomainError>;

    /// Replaces the stored request.
    ///
    /// # Errors
    ///
    /// - `ChangeRequestNotFound` if it was never inserted
    async fn update(&self, request: &ChangeRequest) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &ChangeRequestId) -> Result<Option<ChangeRequest>, DomainError>;

    async fn find_by_participation(
        &self,
        participation_id: &ParticipationId,
    ) -> Result<Vec<ChangeRequest>, DomainError>;

    /// Approved requests effective on or before `as_of`, oldest effective
    /// date first.
    async fn find_due(&self, as_of: NaiveDate) -> Result<Vec<ChangeRequest>, DomainError>;
}
