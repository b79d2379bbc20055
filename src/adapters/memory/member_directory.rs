//! In-memory member directory.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, MemberType};
use crate::domain::member::{Holder, MemberProfile};
use crate::domain::participation::MemberStatus;
use crate::ports::MemberDirectory;

#[derive(Debug, Clone, Default)]
pub struct InMemoryMemberDirectory {
    profiles: Arc<RwLock<HashMap<Holder, MemberProfile>>>,
    statuses: Arc<RwLock<HashMap<Holder, MemberStatus>>>,
}

impl InMemoryMemberDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(&self, profiles: Vec<MemberProfile>) {
        *self.profiles.write().await = profiles.into_iter().map(|p| (p.holder, p)).collect();
    }

    pub async fn upsert(&self, profile: MemberProfile) {
        self.profiles.write().await.insert(profile.holder, profile);
    }

    /// Every profile, ordered by holder.
    pub async fn profiles(&self) -> Vec<MemberProfile> {
        let mut profiles: Vec<_> = self.profiles.read().await.values().cloned().collect();
        profiles.sort_by_cached_key(|p| p.holder.to_string());
        profiles
    }

    /// Last status synced for `holder`.
    pub async fn status_of(&self, holder: &Holder) -> Option<MemberStatus> {
        self.statuses.read().await.get(holder).copied()
    }
}

#[async_trait]
impl MemberDirectory for InMemoryMemberDirectory {
    async fn profile(&self, holder: &Holder) -> Result<Option<MemberProfile>, DomainError> {
        Ok(self.profiles.read().await.get(holder).cloned())
    }

    async fn sync_status(&self, holder: &Holder, status: MemberStatus) -> Result<(), DomainError> {
        self.statuses.write().await.insert(*holder, status);
        if let Some(profile) = self.profiles.write().await.get_mut(holder) {
            profile.has_active_membership = matches!(status, MemberStatus::Active | MemberStatus::Grace);
        }
        Ok(())
    }

    async fn set_member_type(
        &self,
        holder: &Holder,
        member_type: &MemberType,
    ) -> Result<(), DomainError> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles.get_mut(holder).ok_or_else(|| {
            DomainError::new(ErrorCode::MemberNotFound, format!("Member {} not found", holder))
                .with_detail("id", holder.to_string())
        })?;
        profile.member_type = Some(member_type.clone());
        Ok(())
    }
}
