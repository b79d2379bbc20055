//! LinkParentHandler - Places a participation under a parent participation.
//!
//! Used for organizational seat memberships, whose seats point at the
//! organization's own membership.

use std::collections::HashMap;
use tracing::{info, instrument};

use super::TransitionExecutor;
use crate::domain::foundation::ParticipationId;
use crate::domain::lifecycle::LifecycleError;
use crate::domain::participation::{ensure_acyclic_link, Participation, MAX_HIERARCHY_DEPTH};

#[derive(Debug, Clone)]
pub struct LinkParentCommand {
    pub participation_id: ParticipationId,
    pub parent_id: ParticipationId,
}

pub struct LinkParentHandler {
    executor: TransitionExecutor,
}

impl LinkParentHandler {
    pub fn new(executor: TransitionExecutor) -> Self {
        Self { executor }
    }

    #[instrument(skip(self))]
    pub async fn handle(&self, cmd: LinkParentCommand) -> Result<Participation, LifecycleError> {
        let repository = self.executor.repository();
        let child = repository
            .find_by_id(&cmd.participation_id)
            .await?
            .ok_or_else(|| LifecycleError::not_found("Participation", cmd.participation_id))?;
        let parent = repository
            .find_by_id(&cmd.parent_id)
            .await?
            .ok_or_else(|| LifecycleError::not_found("Participation", cmd.parent_id))?;

        if child.parent == Some(parent.id) {
            return Ok(child);
        }

        let ancestors = self.ancestors_of(&parent).await?;
        ensure_acyclic_link(child.id, parent.id, |id| ancestors.get(&id).copied())?;

        let mut updated = child.clone();
        updated.parent = Some(parent.id);
        let (committed, _) = self
            .executor
            .commit_change(&child, &updated, format!("Linked under {}", parent.id), None)
            .await?;

        info!(participation_id = %committed.id, parent_id = %parent.id, "parent linked");
        Ok(committed)
    }

    /// Parent links from `start` upwards, one step past the depth limit so
    /// the acyclicity check sees an over-deep chain.
    async fn ancestors_of(
        &self,
        start: &Participation,
    ) -> Result<HashMap<ParticipationId, ParticipationId>, LifecycleError> {
        let mut links = HashMap::new();
        let mut cursor = start.id;
        let mut next = start.parent;
        while let Some(parent_id) = next {
            if links.insert(cursor, parent_id).is_some() || links.len() > MAX_HIERARCHY_DEPTH {
                break;
            }
            cursor = parent_id;
            next = self
                .executor
                .repository()
                .find_by_id(&parent_id)
                .await?
                .and_then(|p| p.parent);
        }
        Ok(links)
    }
}
