//! In-memory change request repository.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::change_request::ChangeRequest;
use crate::domain::foundation::{ChangeRequestId, DomainError, ErrorCode, ParticipationId};
use crate::ports::ChangeRequestRepository;

#[derive(Debug, Clone, Default)]
pub struct InMemoryChangeRequestRepository {
    requests: Arc<RwLock<HashMap<ChangeRequestId, ChangeRequest>>>,
}

impl InMemoryChangeRequestRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(&self, requests: Vec<ChangeRequest>) {
        *self.requests.write().await = requests.into_iter().map(|r| (r.id, r)).collect();
    }

    /// Every request ordered by creation time.
    pub async fn all(&self) -> Vec<ChangeRequest> {
        let mut all: Vec<_> = self.requests.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        all
    }
}

#[async_trait]
impl ChangeRequestRepository for InMemoryChangeRequestRepository {
    async fn insert(&self, request: &ChangeRequest) -> Result<(), DomainError> {
        let mut requests = self.requests.write().await;
        if requests.contains_key(&request.id) {
            return Err(DomainError::validation(
                "id",
                format!("Change request {} already exists", request.id),
            ));
        }
        requests.insert(request.id, request.clone());
        Ok(())
    }

    async fn update(&self, request: &ChangeRequest) -> Result<(), DomainError> {
        let mut requests = self.requests.write().await;
        match requests.get_mut(&request.id) {
            Some(stored) => {
                *stored = request.clone();
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::ChangeRequestNotFound,
                format!("Change request {} not found", request.id),
            )
            .with_detail("id", request.id.to_string())),
        }
    }

    async fn find_by_id(&self, id: &ChangeRequestId) -> Result<Option<ChangeRequest>, DomainError> {
        Ok(self.requests.read().await.get(id).cloned())
    }

    async fn find_by_participation(
        &self,
        participation_id: &ParticipationId,
    ) -> Result<Vec<ChangeRequest>, DomainError> {
        Ok(self
            .requests
            .read()
            .await
            .values()
            .filter(|r| &r.participation_id == participation_id)
            .cloned()
            .collect())
    }

    async fn find_due(&self, as_of: NaiveDate) -> Result<Vec<ChangeRequest>, DomainError> {
        let mut due: Vec<_> = self
            .requests
            .read()
            .await
            .values()
            .filter(|r| r.is_due(as_of))
            .cloned()
            .collect();
        due.sort_by(|a, b| a.effective_date.cmp(&b.effective_date).then(a.created_at.cmp(&b.created_at)));
        Ok(due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::change_request::ChangeKind;
    use crate::domain::eligibility::Eligibility;
    use crate::domain::foundation::ProductId;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn approved(effective: NaiveDate) -> ChangeRequest {
        let mut cr = ChangeRequest::draft(
            ParticipationId::new(),
            ChangeKind::PlanChange { target_product: ProductId::new() },
            effective,
        );
        cr.submit(&Eligibility { eligible: true, reasons: vec![] }, None).unwrap();
        cr.approve(None).unwrap();
        cr
    }

    #[tokio::test]
    async fn find_due_returns_approved_effective_requests_in_date_order() {
        let repo = InMemoryChangeRequestRepository::new();
        let later = approved(date(2024, 7, 1));
        let earlier = approved(date(2024, 6, 1));
        let future = approved(date(2024, 9, 1));
        for r in [&later, &earlier, &future] {
            repo.insert(r).await.unwrap();
        }

        let due = repo.find_due(date(2024, 7, 1)).await.unwrap();
        assert_eq!(due.iter().map(|r| r.id).collect::<Vec<_>>(), vec![earlier.id, later.id]);
    }

    #[tokio::test]
    async fn update_unknown_request_fails() {
        let repo = InMemoryChangeRequestRepository::new();
        let err = repo.update(&approved(date(2024, 1, 1))).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ChangeRequestNotFound);
    }
}
