//! Shared wiring for handler tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::lifecycle::TransitionExecutor;
use crate::adapters::{
    InMemoryBackend, InMemoryEventBus, InMemoryMemberDirectory, InMemoryParticipationRepository,
    TracingBenefitHooks,
};
use crate::domain::catalog::{SubscriptionProduct, TermLength};
use crate::domain::foundation::{DomainError, ErrorCode, MemberId, ParticipationId, ProductId, Timestamp};
use crate::domain::lifecycle::{LifecycleEngine, LifecyclePolicy};
use crate::domain::member::{Holder, MemberProfile};
use crate::domain::participation::{HistoryRecord, Participation, ParticipationKind};
use crate::ports::{BenefitHooks, MemberDirectory, ParticipationRepository};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Benefit hooks that always fail.
pub struct FailingHooks;

#[async_trait]
impl BenefitHooks for FailingHooks {
    async fn on_activate(&self, _p: &Participation) -> Result<(), DomainError> {
        Err(DomainError::new(ErrorCode::InternalError, "access service down"))
    }

    async fn on_suspend(&self, _p: &Participation) -> Result<(), DomainError> {
        Err(DomainError::new(ErrorCode::InternalError, "access service down"))
    }

    async fn on_revoke(&self, _p: &Participation) -> Result<(), DomainError> {
        Err(DomainError::new(ErrorCode::InternalError, "access service down"))
    }
}

/// Repository where another writer touches the row right before the first
/// commit goes through, so that commit loses on version.
pub struct ContendedRepository {
    inner: Arc<InMemoryParticipationRepository>,
    contended: AtomicBool,
}

impl ContendedRepository {
    pub fn new(inner: Arc<InMemoryParticipationRepository>) -> Self {
        Self {
            inner,
            contended: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl ParticipationRepository for ContendedRepository {
    async fn insert(&self, participation: &Participation) -> Result<(), DomainError> {
        self.inner.insert(participation).await
    }

    async fn find_by_id(&self, id: &ParticipationId) -> Result<Option<Participation>, DomainError> {
        self.inner.find_by_id(id).await
    }

    async fn find_open(&self) -> Result<Vec<Participation>, DomainError> {
        self.inner.find_open().await
    }

    async fn find_by_holder(&self, holder: &Holder) -> Result<Vec<Participation>, DomainError> {
        self.inner.find_by_holder(holder).await
    }

    async fn find_renewed_from(
        &self,
        id: &ParticipationId,
    ) -> Result<Option<Participation>, DomainError> {
        self.inner.find_renewed_from(id).await
    }

    async fn commit(
        &self,
        participation: &Participation,
        expected_version: u64,
        history: &HistoryRecord,
    ) -> Result<Participation, DomainError> {
        if !self.contended.swap(true, Ordering::SeqCst) {
            let stored = self.inner.find_by_id(&participation.id).await?.unwrap();
            let note = HistoryRecord::new(
                stored.id,
                stored.status,
                stored.status,
                "staff note",
                false,
                None,
                Timestamp::now(),
            );
            self.inner.commit(&stored, stored.version, &note).await?;
        }
        self.inner.commit(participation, expected_version, history).await
    }

    async fn history_for(&self, id: &ParticipationId) -> Result<Vec<HistoryRecord>, DomainError> {
        self.inner.history_for(id).await
    }
}

/// In-memory backend, bus and hooks plus an annual $300 membership product.
pub struct Fixture {
    pub backend: InMemoryBackend,
    pub bus: Arc<InMemoryEventBus>,
    pub hooks: Arc<TracingBenefitHooks>,
    pub members: Arc<InMemoryMemberDirectory>,
    pub product: SubscriptionProduct,
    pub policy: LifecyclePolicy,
    hook_port: Arc<dyn BenefitHooks>,
}

impl Fixture {
    pub async fn new() -> Self {
        let hooks = Arc::new(TracingBenefitHooks::new());
        Self::build(hooks.clone(), hooks).await
    }

    pub async fn with_failing_hooks() -> Self {
        Self::build(Arc::new(TracingBenefitHooks::new()), Arc::new(FailingHooks)).await
    }

    async fn build(hooks: Arc<TracingBenefitHooks>, hook_port: Arc<dyn BenefitHooks>) -> Self {
        let backend = InMemoryBackend::new();
        let product = SubscriptionProduct::new(
            ProductId::new(),
            "Regular Membership",
            dec!(300.00),
            "USD",
            TermLength::years(1),
        );
        backend.catalog.add_product(product.clone()).await.unwrap();
        Self {
            members: backend.members.clone(),
            backend,
            bus: Arc::new(InMemoryEventBus::new()),
            hooks,
            product,
            policy: LifecyclePolicy::default(),
            hook_port,
        }
    }

    pub fn with_policy(mut self, policy: LifecyclePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn executor(&self) -> TransitionExecutor {
        self.executor_with(self.backend.participations.clone())
    }

    /// Executor over another repository sharing the fixture's bus, hooks
    /// and members.
    pub fn executor_with(&self, repository: Arc<dyn ParticipationRepository>) -> TransitionExecutor {
        TransitionExecutor::new(
            LifecycleEngine::new(self.policy.clone()),
            repository,
            self.bus.clone(),
            self.hook_port.clone(),
            self.members.clone(),
        )
    }

    /// A prospect on the fixture product for calendar year 2024.
    pub fn participation_for(&self, holder: Holder, kind: ParticipationKind) -> Participation {
        Participation::new(
            holder,
            kind,
            self.product.id,
            date(2024, 1, 1),
            date(2024, 12, 31),
            self.product.base_price,
            "USD",
        )
        .unwrap()
    }

    pub async fn insert(&self, participation: Participation) -> Participation {
        if self.members.profile(&participation.holder).await.unwrap().is_none() {
            self.members.upsert(MemberProfile::new(participation.holder)).await;
        }
        self.backend.participations.insert(&participation).await.unwrap();
        participation
    }

    pub async fn prospect_membership(&self) -> Participation {
        let holder = Holder::Individual(MemberId::new());
        self.insert(self.participation_for(holder, ParticipationKind::Membership))
            .await
    }

    /// Active and paid through the end of 2024.
    pub async fn active_membership(&self) -> Participation {
        let holder = Holder::Individual(MemberId::new());
        self.insert(
            self.participation_for(holder, ParticipationKind::Membership)
                .activated_on_signup(date(2024, 12, 31)),
        )
        .await
    }

    pub async fn reload(&self, participation: &Participation) -> Participation {
        self.backend
            .participations
            .find_by_id(&participation.id)
            .await
            .unwrap()
            .unwrap()
    }
}
