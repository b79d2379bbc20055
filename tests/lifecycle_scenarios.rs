//! End-to-end lifecycle scenarios over the in-memory adapters.
//!
//! Each test drives the handlers the way the sweep binary does and checks
//! the stored participation, its history and the published events.

mod common;

use rust_decimal_macros::dec;

use common::{date, Harness};
use member_lifecycle::application::handlers::{
    RenewParticipationCommand, RenewalPayment, ResolvePriceHandler, ResolvePriceQuery,
    ReviewChangeRequestCommand, ReviewChangeRequestHandler, ReviewDecision,
    RunDailySweepCommand, SubmitChangeRequestCommand, SubmitChangeRequestHandler,
};
use member_lifecycle::domain::billing::{ProrationCalculator, ProrationInput};
use member_lifecycle::domain::catalog::{PricingTier, SubscriptionProduct, TermLength};
use member_lifecycle::domain::change_request::{ChangeKind, ChangeRequestStatus};
use member_lifecycle::domain::foundation::{MemberType, ProductId, TierId};
use member_lifecycle::domain::participation::{CancellationReason, ParticipationStatus};
use member_lifecycle::ports::ParticipationRepository;

// =============================================================================
// Lapse, grace and termination
// =============================================================================

#[tokio::test]
async fn unpaid_membership_enters_grace_then_terminates() {
    let h = Harness::new().await;
    let holder = h.member().await;
    let p = h
        .insert(h.membership_2024(holder).activated_on_signup(date(2023, 12, 31)))
        .await;
    let sweep = h.sweep();

    let report = sweep
        .handle(RunDailySweepCommand { as_of: date(2024, 1, 1) })
        .await
        .unwrap();
    let in_grace = h.reload(&p).await;
    assert_eq!(report.transitioned, 1);
    assert_eq!(in_grace.status, ParticipationStatus::Grace);
    assert_eq!(in_grace.grace_end, Some(date(2024, 1, 31)));
    assert!(in_grace.has_access(date(2024, 1, 15)));

    sweep
        .handle(RunDailySweepCommand { as_of: date(2024, 2, 1) })
        .await
        .unwrap();
    let ended = h.reload(&p).await;
    assert_eq!(ended.status, ParticipationStatus::Terminated);
    assert_eq!(ended.terminated_date, Some(date(2024, 2, 1)));
    assert_eq!(ended.cancellation_reason, Some(CancellationReason::grace_expired()));
    assert!(!ended.has_access(date(2024, 2, 1)));

    let history = h.backend.participations.history_for(&p.id).await.unwrap();
    let steps: Vec<_> = history.iter().map(|r| (r.old_status, r.new_status)).collect();
    assert_eq!(
        steps,
        vec![
            (ParticipationStatus::Active, ParticipationStatus::Grace),
            (ParticipationStatus::Grace, ParticipationStatus::Terminated),
        ]
    );
    assert!(history.iter().all(|r| r.automated));
    assert_eq!(h.bus.events_for_aggregate(&p.id.to_string()).len(), 2);
}

#[tokio::test]
async fn sweep_rerun_on_same_date_adds_nothing() {
    let h = Harness::new().await;
    let holder = h.member().await;
    let p = h
        .insert(h.membership_2024(holder).activated_on_signup(date(2023, 12, 31)))
        .await;
    let sweep = h.sweep();
    let as_of = date(2024, 1, 1);

    sweep.handle(RunDailySweepCommand { as_of }).await.unwrap();
    let events = h.bus.event_count();
    let again = sweep.handle(RunDailySweepCommand { as_of }).await.unwrap();

    assert_eq!(again.transitioned, 0);
    assert_eq!(h.bus.event_count(), events);
    assert_eq!(h.backend.participations.history_for(&p.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn paid_membership_is_left_alone() {
    let h = Harness::new().await;
    let holder = h.member().await;
    let p = h
        .insert(h.membership_2024(holder).activated_on_signup(date(2024, 12, 31)))
        .await;

    let report = h
        .sweep()
        .handle(RunDailySweepCommand { as_of: date(2024, 6, 1) })
        .await
        .unwrap();

    assert_eq!(report.evaluated, 1);
    assert_eq!(report.transitioned, 0);
    assert_eq!(h.reload(&p).await.status, ParticipationStatus::Active);
}

// =============================================================================
// Mid-term plan change with proration
// =============================================================================

#[test]
fn mid_term_upgrade_prorates_remaining_days() {
    let result = ProrationCalculator::default().calculate(&ProrationInput {
        old_price: dec!(300),
        new_price: dec!(450),
        term_start: date(2024, 1, 1),
        term_end: date(2024, 12, 31),
        effective_date: date(2024, 7, 1),
        today: date(2024, 7, 1),
        change_fee: None,
    });

    assert_eq!(result.remaining_days, 184);
    assert_eq!(result.total_days, 365);
    assert_eq!(result.credit, dec!(151.23));
    assert_eq!(result.charge, dec!(226.85));
    assert_eq!(result.net_adjustment, dec!(75.62));
    assert!(result.is_charge());
}

#[tokio::test]
async fn approved_plan_change_is_applied_by_the_sweep_on_its_effective_date() {
    let h = Harness::new().await;
    let premium = SubscriptionProduct::new(
        ProductId::new(),
        "Premium Membership",
        dec!(450.00),
        "USD",
        TermLength::years(1),
    );
    h.backend.catalog.add_product(premium.clone()).await.unwrap();
    let holder = h.member().await;
    let p = h
        .insert(h.membership_2024(holder).activated_on_signup(date(2024, 12, 31)))
        .await;

    let submitted = SubmitChangeRequestHandler::new(
        h.backend.participations.clone(),
        h.backend.change_requests.clone(),
        h.backend.catalog.clone(),
        h.backend.members.clone(),
    )
    .handle(SubmitChangeRequestCommand {
        participation_id: p.id,
        kind: ChangeKind::PlanChange {
            target_product: premium.id,
        },
        effective_date: date(2024, 7, 1),
        requested_by: Some("member portal".to_string()),
        today: date(2024, 6, 15),
    })
    .await
    .unwrap()
    .request;
    assert_eq!(submitted.status, ChangeRequestStatus::Submitted);
    assert_eq!(submitted.proration.as_ref().map(|r| r.net_adjustment), Some(dec!(75.62)));

    ReviewChangeRequestHandler::new(h.backend.change_requests.clone())
        .handle(ReviewChangeRequestCommand {
            request_id: submitted.id,
            decision: ReviewDecision::Approve,
            note: None,
        })
        .await
        .unwrap();

    let sweep = h.sweep();
    let early = sweep
        .handle(RunDailySweepCommand { as_of: date(2024, 6, 30) })
        .await
        .unwrap();
    assert_eq!(early.scheduled_changes.map(|r| r.due), Some(0));
    assert_eq!(h.reload(&p).await.product_id, h.product.id);

    let due = sweep
        .handle(RunDailySweepCommand { as_of: date(2024, 7, 1) })
        .await
        .unwrap();
    assert_eq!(due.scheduled_changes.map(|r| r.processed), Some(1));

    let changed = h.reload(&p).await;
    assert_eq!(changed.product_id, premium.id);
    assert_eq!(changed.unit_price, dec!(450.00));
    assert_eq!(changed.status, ParticipationStatus::Active);
}

// =============================================================================
// Tier resolution
// =============================================================================

#[tokio::test]
async fn overlapping_tiers_resolve_to_the_earliest_created() {
    let h = Harness::new().await;
    let student = MemberType::new("student").unwrap();
    for (label, price, seq) in [("Student 2024", dec!(120.00), 9), ("Student", dec!(150.00), 3)] {
        h.backend
            .catalog
            .add_tier(PricingTier {
                id: TierId::new(),
                product_id: h.product.id,
                member_type: student.clone(),
                label: label.to_string(),
                price,
                valid_from: Some(date(2024, 1, 1)),
                valid_to: None,
                requires_verification: false,
                created_seq: seq,
            })
            .await;
    }
    let handler = ResolvePriceHandler::new(h.backend.catalog.clone(), h.backend.members.clone());
    let query = ResolvePriceQuery {
        member_type: Some(student),
        ..ResolvePriceQuery::standard(h.product.id, date(2024, 3, 1))
    };

    let first = handler.handle(query.clone()).await.unwrap().price;
    for _ in 0..10 {
        assert_eq!(handler.handle(query.clone()).await.unwrap().price, first);
    }
    assert_eq!(first.price, dec!(150.00));
    assert_eq!(first.tier_label, "Student");
}

// =============================================================================
// Renewal
// =============================================================================

#[tokio::test]
async fn renewal_replay_returns_the_existing_successor() {
    let h = Harness::new().await;
    let holder = h.member().await;
    let p = h
        .insert(h.membership_2024(holder).activated_on_signup(date(2024, 12, 31)))
        .await;
    let handler = h.renewal_handler();
    let command = RenewParticipationCommand {
        participation_id: p.id,
        renewing_term_end: Some(p.term_end),
        payment: RenewalPayment::FullTerm {
            funding_ref: Some("inv-2025".to_string()),
        },
        today: date(2024, 12, 1),
    };

    let first = handler.handle(command.clone()).await.unwrap();
    let replay = handler.handle(command).await.unwrap();

    assert!(first.created);
    assert!(!replay.created);
    assert_eq!(first.participation.id, replay.participation.id);
    assert_eq!(first.participation.renewed_from, Some(p.id));
    assert_eq!(first.participation.term_begin, date(2025, 1, 1));
    assert_eq!(first.participation.term_end, date(2025, 12, 31));
    assert_eq!(first.participation.status, ParticipationStatus::Active);
    assert_eq!(h.backend.participations.find_by_holder(&holder).await.unwrap().len(), 2);

    // The old term is superseded once it ends, the successor carries on.
    h.sweep()
        .handle(RunDailySweepCommand { as_of: date(2025, 1, 1) })
        .await
        .unwrap();
    let old = h.reload(&p).await;
    assert_eq!(old.status, ParticipationStatus::Terminated);
    assert_eq!(old.cancellation_reason, Some(CancellationReason::superseded()));
    assert_eq!(h.reload(&first.participation).await.status, ParticipationStatus::Active);
}
