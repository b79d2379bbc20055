//! Shared wiring for the integration tests.

#![allow(dead_code)]

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use std::sync::Arc;

use member_lifecycle::adapters::{InMemoryBackend, InMemoryEventBus, TracingBenefitHooks};
use member_lifecycle::application::handlers::{
    ProcessChangeRequestHandler, ProcessScheduledChangesHandler, RenewParticipationHandler,
    RunDailySweepHandler, SweepOptions, TransitionExecutor,
};
use member_lifecycle::domain::catalog::{SubscriptionProduct, TermLength};
use member_lifecycle::domain::foundation::{MemberId, ProductId};
use member_lifecycle::domain::lifecycle::{LifecycleEngine, LifecyclePolicy};
use member_lifecycle::domain::member::{Holder, MemberProfile};
use member_lifecycle::domain::participation::{Participation, ParticipationKind};
use member_lifecycle::ports::ParticipationRepository;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub struct Harness {
    pub backend: InMemoryBackend,
    pub bus: Arc<InMemoryEventBus>,
    pub hooks: Arc<TracingBenefitHooks>,
    pub policy: LifecyclePolicy,
    /// Regular Membership, 300.00 USD a year.
    pub product: SubscriptionProduct,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_policy(LifecyclePolicy::default()).await
    }

    pub async fn with_policy(policy: LifecyclePolicy) -> Self {
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
            backend,
            bus: Arc::new(InMemoryEventBus::new()),
            hooks: Arc::new(TracingBenefitHooks::new()),
            policy,
            product,
        }
    }

    pub fn executor(&self) -> TransitionExecutor {
        TransitionExecutor::new(
            LifecycleEngine::new(self.policy.clone()),
            self.backend.participations.clone(),
            self.bus.clone(),
            self.hooks.clone(),
            self.backend.members.clone(),
        )
    }

    pub fn process_handler(&self) -> Arc<ProcessChangeRequestHandler> {
        Arc::new(ProcessChangeRequestHandler::new(
            self.executor(),
            self.backend.change_requests.clone(),
            self.backend.catalog.clone(),
            self.backend.members.clone(),
        ))
    }

    pub fn renewal_handler(&self) -> RenewParticipationHandler {
        RenewParticipationHandler::new(
            self.executor(),
            self.backend.catalog.clone(),
            self.backend.members.clone(),
        )
    }

    /// Sweep wired the way the binary wires it, auto-renew off.
    pub fn sweep(&self) -> RunDailySweepHandler {
        let scheduled = Arc::new(ProcessScheduledChangesHandler::new(
            self.backend.change_requests.clone(),
            self.process_handler(),
        ));
        RunDailySweepHandler::new(self.executor(), SweepOptions::default())
            .with_scheduled_changes(scheduled)
            .with_renewals(Arc::new(self.renewal_handler()))
    }

    /// Registers a fresh individual member.
    pub async fn member(&self) -> Holder {
        let holder = Holder::Individual(MemberId::new());
        self.backend.members.upsert(MemberProfile::new(holder)).await;
        holder
    }

    /// A membership on the harness product for calendar year 2024.
    pub fn membership_2024(&self, holder: Holder) -> Participation {
        Participation::new(
            holder,
            ParticipationKind::Membership,
            self.product.id,
            date(2024, 1, 1),
            date(2024, 12, 31),
            self.product.base_price,
            "USD",
        )
        .unwrap()
    }

    pub async fn insert(&self, participation: Participation) -> Participation {
        self.backend.participations.insert(&participation).await.unwrap();
        participation
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
