//! In-memory adapters loaded from and exported to a snapshot.

use std::sync::Arc;

use super::{Snapshot, SnapshotError};
use crate::adapters::memory::{
    InMemoryCatalog, InMemoryChangeRequestRepository, InMemoryMemberDirectory,
    InMemoryParticipationRepository,
};

/// The four storage-backed adapters, sharing state with whatever handlers
/// they are handed to.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    pub participations: Arc<InMemoryParticipationRepository>,
    pub change_requests: Arc<InMemoryChangeRequestRepository>,
    pub catalog: Arc<InMemoryCatalog>,
    pub members: Arc<InMemoryMemberDirectory>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds adapters holding the snapshot's contents.
    ///
    /// Products are validated and every participation must satisfy its
    /// invariants; the first offending record fails the load.
    pub async fn from_snapshot(snapshot: Snapshot) -> Result<Self, SnapshotError> {
        for participation in &snapshot.participations {
            participation.check_invariants().map_err(|e| {
                SnapshotError::InvalidData(format!("participation {}: {}", participation.id, e))
            })?;
        }

        let backend = Self::new();
        backend
            .catalog
            .load(snapshot.products, snapshot.tiers)
            .await
            .map_err(|e| SnapshotError::InvalidData(e.to_string()))?;
        backend.members.load(snapshot.members).await;
        backend
            .participations
            .load(snapshot.participations, snapshot.history)
            .await;
        backend.change_requests.load(snapshot.change_requests).await;

        Ok(backend)
    }

    /// Captures the current state of every adapter.
    pub async fn snapshot(&self) -> Snapshot {
        Snapshot {
            products: self.catalog.products().await,
            tiers: self.catalog.tiers().await,
            members: self.members.profiles().await,
            participations: self.participations.all().await,
            history: self.participations.all_history().await,
            change_requests: self.change_requests.all().await,
        }
    }
}
