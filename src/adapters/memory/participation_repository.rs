//! In-memory participation repository.
//!
//! Status and history live behind one lock, so a commit either writes both
//! or neither. Used by the sweep binary over a loaded snapshot and by tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, ParticipationId};
use crate::domain::member::Holder;
use crate::domain::participation::{HistoryRecord, Participation};
use crate::ports::ParticipationRepository;

#[derive(Debug, Default)]
struct Store {
    participations: HashMap<ParticipationId, Participation>,
    history: Vec<HistoryRecord>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryParticipationRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryParticipationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads participations and history as-is, replacing current contents.
    pub async fn load(&self, participations: Vec<Participation>, history: Vec<HistoryRecord>) {
        let mut store = self.store.write().await;
        store.participations = participations.into_iter().map(|p| (p.id, p)).collect();
        store.history = history;
    }

    /// Every participation, ordered by creation time then id.
    pub async fn all(&self) -> Vec<Participation> {
        let store = self.store.read().await;
        let mut all: Vec<_> = store.participations.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        all
    }

    /// Every history record in append order.
    pub async fn all_history(&self) -> Vec<HistoryRecord> {
        self.store.read().await.history.clone()
    }

    pub async fn history_count(&self) -> usize {
        self.store.read().await.history.len()
    }
}

#[async_trait]
impl ParticipationRepository for InMemoryParticipationRepository {
    async fn insert(&self, participation: &Participation) -> Result<(), DomainError> {
        let mut store = self.store.write().await;
        if store.participations.contains_key(&participation.id) {
            return Err(DomainError::validation(
                "id",
                format!("Participation {} already exists", participation.id),
            ));
        }
        if let Some(previous) = participation.renewed_from {
            let taken = store
                .participations
                .values()
                .any(|p| p.renewed_from == Some(previous));
            if taken {
                return Err(DomainError::new(
                    ErrorCode::ConcurrencyConflict,
                    format!("Participation {} was already renewed", previous),
                )
                .with_detail("id", previous.to_string()));
            }
        }
        store.participations.insert(participation.id, participation.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ParticipationId) -> Result<Option<Participation>, DomainError> {
        Ok(self.store.read().await.participations.get(id).cloned())
    }

    async fn find_open(&self) -> Result<Vec<Participation>, DomainError> {
        let store = self.store.read().await;
        let mut open: Vec<_> = store
            .participations
            .values()
            .filter(|p| p.status.is_open())
            .cloned()
            .collect();
        open.sort_by_key(|p| p.id);
        Ok(open)
    }

    async fn find_by_holder(&self, holder: &Holder) -> Result<Vec<Participation>, DomainError> {
        let store = self.store.read().await;
        Ok(store
            .participations
            .values()
            .filter(|p| &p.holder == holder)
            .cloned()
            .collect())
    }

    async fn find_renewed_from(
        &self,
        id: &ParticipationId,
    ) -> Result<Option<Participation>, DomainError> {
        let store = self.store.read().await;
        Ok(store
            .participations
            .values()
            .find(|p| p.renewed_from == Some(*id))
            .cloned())
    }

    async fn commit(
        &self,
        participation: &Participation,
        expected_version: u64,
        history: &HistoryRecord,
    ) -> Result<Participation, DomainError> {
        let mut store = self.store.write().await;
        let stored = store.participations.get_mut(&participation.id).ok_or_else(|| {
            DomainError::new(
                ErrorCode::ParticipationNotFound,
                format!("Participation {} not found", participation.id),
            )
            .with_detail("id", participation.id.to_string())
        })?;

        if stored.version != expected_version {
            return Err(DomainError::conflict("participation", expected_version, stored.version)
                .with_detail("id", participation.id.to_string()));
        }

        let mut next = participation.clone();
        next.version = expected_version + 1;
        *stored = next.clone();
        store.history.push(history.clone());
        Ok(next)
    }

    async fn history_for(&self, id: &ParticipationId) -> Result<Vec<HistoryRecord>, DomainError> {
        let store = self.store.read().await;
        Ok(store
            .history
            .iter()
            .filter(|h| &h.participation_id == id)
            .cloned()
            .collect())
    }
}
