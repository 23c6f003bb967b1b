//! Integration tests for the scheduling engine.
//!
//! Covers slot uniqueness, rescheduling, exclusion gating, trust promotion
//! and the emitted events.

mod common;

use crate::common::{
    create_test_approved_item, date, schedule_input, schedule_test_item, TestHarness, SURFACE,
};
use corpus_core::common::{ActivitySource, CorpusError, CorpusErrorKind};
use corpus_core::domains::approved_items::actions::{create_approved_item, has_trusted_domain};
use corpus_core::domains::domain_policy::actions::{add_excluded_domain, is_trusted};
use corpus_core::domains::schedule_reviews::actions::mark_reviewed;
use corpus_core::domains::scheduled_items::actions::{
    create_scheduled_item, delete_scheduled_item, get_scheduled_item, list_scheduled_items,
    reschedule_scheduled_item,
};
use corpus_core::domains::scheduled_items::{RemovalReason, ScheduledItemReason, SchedulingNote};
use corpus_core::kernel::{CorpusEventType, NotificationStatus};
use test_context::test_context;

// =============================================================================
// Create
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn create_assigns_a_slot_and_emits_added_event(ctx: &TestHarness) {
    let item = create_test_approved_item(&ctx.deps, "https://a.example/x").await;

    let mut input = schedule_input(&item, SURFACE, date("2030-01-01"));
    input.reasons = vec![ScheduledItemReason::Trending, ScheduledItemReason::Evergreen];
    input.reason_comment = Some("big week".to_string());

    let committed = create_scheduled_item(input, &ctx.curator(), &ctx.deps)
        .await
        .expect("create should succeed");

    assert_eq!(committed.notification, NotificationStatus::Delivered);
    let scheduled = committed.value;
    assert_eq!(scheduled.approved_item_id, item.id);
    assert_eq!(scheduled.scheduled_surface_guid, SURFACE);
    assert_eq!(scheduled.scheduled_date, date("2030-01-01"));
    assert_eq!(scheduled.source, ActivitySource::Manual);
    assert_eq!(scheduled.created_by, "curator|ada");

    let event = ctx.events().pop().expect("an event was published");
    assert_eq!(event.event_type, CorpusEventType::ScheduledItemAdded);
    let payload = event.scheduled_item().expect("scheduled item payload");
    assert_eq!(payload.scheduled_item.external_id, scheduled.external_id);
    assert_eq!(payload.approved_item.external_id, item.external_id);
    assert_eq!(payload.reasons, vec!["TRENDING", "EVERGREEN"]);
    assert_eq!(payload.reason_comment.as_deref(), Some("big week"));
    assert!(payload.original_scheduled_item_external_id.is_none());
    assert!(ctx
        .nats()
        .was_published_to("curated_corpus.scheduled_item_added"));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn create_same_slot_twice_is_a_conflict_and_writes_nothing(ctx: &TestHarness) {
    let item = create_test_approved_item(&ctx.deps, "https://a.example/x").await;
    schedule_test_item(&ctx.deps, &item, SURFACE, date("2030-01-01")).await;
    let events_before = ctx.events().len();

    let err = create_scheduled_item(
        schedule_input(&item, SURFACE, date("2030-01-01")),
        &ctx.curator(),
        &ctx.deps,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CorpusError::AlreadyScheduled { .. }));
    assert_eq!(err.kind(), CorpusErrorKind::Conflict);
    assert!(err.to_string().contains(SURFACE));
    assert!(err.to_string().contains("2030-01-01"));
    assert_eq!(ctx.store().scheduled_item_count(), 1);
    assert_eq!(ctx.events().len(), events_before);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn same_item_may_occupy_other_dates_and_surfaces(ctx: &TestHarness) {
    let item = create_test_approved_item(&ctx.deps, "https://a.example/x").await;
    schedule_test_item(&ctx.deps, &item, SURFACE, date("2030-01-01")).await;
    schedule_test_item(&ctx.deps, &item, SURFACE, date("2030-01-02")).await;
    schedule_test_item(&ctx.deps, &item, "NEW_TAB_EN_GB", date("2030-01-01")).await;

    assert_eq!(ctx.store().scheduled_item_count(), 3);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn create_checks_item_before_surface(ctx: &TestHarness) {
    let item = create_test_approved_item(&ctx.deps, "https://a.example/x").await;

    let mut missing = schedule_input(&item, "NOT_A_SURFACE", date("2030-01-01"));
    missing.approved_item_external_id = Default::default();
    let err = create_scheduled_item(missing, &ctx.curator(), &ctx.deps)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CorpusErrorKind::NotFound);

    let err = create_scheduled_item(
        schedule_input(&item, "NOT_A_SURFACE", date("2030-01-01")),
        &ctx.curator(),
        &ctx.deps,
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind(), CorpusErrorKind::Validation);
    assert!(err.to_string().contains("NOT_A_SURFACE"));
}

// =============================================================================
// Domain exclusion and trust
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn excluded_domain_cannot_be_scheduled(ctx: &TestHarness) {
    let item = create_test_approved_item(&ctx.deps, "https://www.spam.example/story").await;
    add_excluded_domain("spam.example", &ctx.curator(), &ctx.deps)
        .await
        .expect("exclude domain");

    let err = create_scheduled_item(
        schedule_input(&item, SURFACE, date("2030-01-01")),
        &ctx.curator(),
        &ctx.deps,
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), CorpusErrorKind::Excluded);
    assert!(err.to_string().contains("spam.example"));
    assert_eq!(ctx.store().scheduled_item_count(), 0);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn domain_becomes_trusted_after_an_earlier_assignment(ctx: &TestHarness) {
    let first = create_test_approved_item(&ctx.deps, "https://news.example/one").await;
    let second = create_test_approved_item(&ctx.deps, "https://news.example/two").await;

    schedule_test_item(&ctx.deps, &first, SURFACE, date("2030-01-01")).await;
    assert!(!is_trusted("news.example", &ctx.deps).await.unwrap());
    assert!(!has_trusted_domain(&first, &ctx.deps).await.unwrap());

    schedule_test_item(&ctx.deps, &second, SURFACE, date("2030-01-05")).await;
    assert!(is_trusted("news.example", &ctx.deps).await.unwrap());
    assert!(has_trusted_domain(&second, &ctx.deps).await.unwrap());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn later_assignment_alone_does_not_grant_trust(ctx: &TestHarness) {
    let first = create_test_approved_item(&ctx.deps, "https://fresh.example/one").await;
    let second = create_test_approved_item(&ctx.deps, "https://fresh.example/two").await;

    schedule_test_item(&ctx.deps, &first, SURFACE, date("2030-01-05")).await;
    // Same day is not strictly before.
    schedule_test_item(&ctx.deps, &second, SURFACE, date("2030-01-05")).await;

    assert!(!is_trusted("fresh.example", &ctx.deps).await.unwrap());
}

// =============================================================================
// Reschedule
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn reschedule_to_same_date_changes_nothing(ctx: &TestHarness) {
    let item = create_test_approved_item(&ctx.deps, "https://a.example/x").await;
    let scheduled = schedule_test_item(&ctx.deps, &item, SURFACE, date("2030-01-01")).await;
    let events_before = ctx.events().len();

    let committed = reschedule_scheduled_item(
        scheduled.external_id,
        date("2030-01-01"),
        ActivitySource::Manual,
        SchedulingNote::none(),
        &ctx.curator(),
        &ctx.deps,
    )
    .await
    .expect("same-date reschedule succeeds");

    assert_eq!(committed.notification, NotificationStatus::Skipped);
    assert_eq!(committed.value.external_id, scheduled.external_id);
    assert_eq!(committed.value.updated_at, scheduled.updated_at);
    assert_eq!(committed.value.created_by, scheduled.created_by);
    assert_eq!(ctx.events().len(), events_before);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn reschedule_replaces_the_row_and_links_it_in_the_event(ctx: &TestHarness) {
    let item = create_test_approved_item(&ctx.deps, "https://a.example/x").await;
    let scheduled = schedule_test_item(&ctx.deps, &item, SURFACE, date("2030-01-01")).await;

    let committed = reschedule_scheduled_item(
        scheduled.external_id,
        date("2030-01-03"),
        ActivitySource::Ml,
        SchedulingNote::new(vec![ScheduledItemReason::Timely], None),
        &ctx.curator(),
        &ctx.deps,
    )
    .await
    .expect("reschedule succeeds");

    let moved = committed.value;
    assert_ne!(moved.external_id, scheduled.external_id);
    assert_eq!(moved.scheduled_date, date("2030-01-03"));
    assert_eq!(moved.source, ActivitySource::Ml);
    assert_eq!(moved.created_by, "curator|ada");
    assert_eq!(ctx.store().scheduled_item_count(), 1);

    let err = get_scheduled_item(scheduled.external_id, &ctx.deps)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CorpusErrorKind::NotFound);

    let event = ctx.events().pop().expect("reschedule event");
    assert_eq!(event.event_type, CorpusEventType::ScheduledItemRescheduled);
    let payload = event.scheduled_item().expect("scheduled item payload");
    assert_eq!(payload.scheduled_item.external_id, moved.external_id);
    assert_eq!(
        payload.original_scheduled_item_external_id,
        Some(scheduled.external_id)
    );
    assert_eq!(payload.reasons, vec!["TIMELY"]);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn reschedule_onto_an_occupied_slot_is_a_conflict(ctx: &TestHarness) {
    let item = create_test_approved_item(&ctx.deps, "https://a.example/x").await;
    let first = schedule_test_item(&ctx.deps, &item, SURFACE, date("2030-01-01")).await;
    schedule_test_item(&ctx.deps, &item, SURFACE, date("2030-01-02")).await;

    let err = reschedule_scheduled_item(
        first.external_id,
        date("2030-01-02"),
        ActivitySource::Manual,
        SchedulingNote::none(),
        &ctx.curator(),
        &ctx.deps,
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), CorpusErrorKind::Conflict);
    // The original assignment survives the failed move.
    let still_there = get_scheduled_item(first.external_id, &ctx.deps)
        .await
        .expect("original row kept");
    assert_eq!(still_there.scheduled.scheduled_date, date("2030-01-01"));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn reschedule_unknown_assignment_is_not_found(ctx: &TestHarness) {
    let err = reschedule_scheduled_item(
        Default::default(),
        date("2030-01-02"),
        ActivitySource::Manual,
        SchedulingNote::none(),
        &ctx.curator(),
        &ctx.deps,
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), CorpusErrorKind::NotFound);
}

// =============================================================================
// Delete
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn delete_emits_removal_event_with_fresh_event_id(ctx: &TestHarness) {
    let item = create_test_approved_item(&ctx.deps, "https://a.example/x").await;
    let scheduled = schedule_test_item(&ctx.deps, &item, SURFACE, date("2030-01-01")).await;

    let committed = delete_scheduled_item(
        scheduled.external_id,
        SchedulingNote::new(vec![RemovalReason::Paywall], Some("hard paywall".to_string())),
        &ctx.curator(),
        &ctx.deps,
    )
    .await
    .expect("delete succeeds");

    assert_eq!(committed.value.external_id, scheduled.external_id);
    assert_eq!(ctx.store().scheduled_item_count(), 0);

    let event = ctx.events().pop().expect("removal event");
    assert_eq!(event.event_type, CorpusEventType::ScheduledItemRemoved);
    assert_ne!(
        event.event_id.into_uuid(),
        scheduled.external_id.into_uuid()
    );
    let payload = event.scheduled_item().expect("scheduled item payload");
    assert_eq!(payload.scheduled_item.external_id, scheduled.external_id);
    assert_eq!(payload.reasons, vec!["PAYWALL"]);
    assert_eq!(payload.reason_comment.as_deref(), Some("hard paywall"));

    let err = delete_scheduled_item(
        scheduled.external_id,
        SchedulingNote::none(),
        &ctx.curator(),
        &ctx.deps,
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind(), CorpusErrorKind::NotFound);
}

// =============================================================================
// End to end
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn schedule_conflict_reschedule_delete_and_reuse(ctx: &TestHarness) {
    let item = create_test_approved_item(&ctx.deps, "https://a.example/x").await;

    let e1 = schedule_test_item(&ctx.deps, &item, SURFACE, date("2030-01-01")).await;

    let err = create_scheduled_item(
        schedule_input(&item, SURFACE, date("2030-01-01")),
        &ctx.curator(),
        &ctx.deps,
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind(), CorpusErrorKind::Conflict);

    let e2 = reschedule_scheduled_item(
        e1.external_id,
        date("2030-01-02"),
        ActivitySource::Manual,
        SchedulingNote::none(),
        &ctx.curator(),
        &ctx.deps,
    )
    .await
    .expect("reschedule")
    .value;
    assert_ne!(e2.external_id, e1.external_id);

    delete_scheduled_item(
        e2.external_id,
        SchedulingNote::none(),
        &ctx.curator(),
        &ctx.deps,
    )
    .await
    .expect("delete");

    let again = create_scheduled_item(
        schedule_input(&item, SURFACE, date("2030-01-02")),
        &ctx.curator(),
        &ctx.deps,
    )
    .await
    .expect("slot is free again");
    assert_eq!(again.value.scheduled_date, date("2030-01-02"));
}

// =============================================================================
// Degraded success
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn failed_event_delivery_keeps_the_write(ctx: &TestHarness) {
    let item = create_test_approved_item(&ctx.deps, "https://a.example/x").await;
    ctx.break_event_delivery();

    let committed = create_scheduled_item(
        schedule_input(&item, SURFACE, date("2030-01-01")),
        &ctx.curator(),
        &ctx.deps,
    )
    .await
    .expect("write succeeds even when events cannot be delivered");

    assert!(committed.is_degraded());
    assert!(matches!(
        committed.notification,
        NotificationStatus::Failed(_)
    ));
    assert_eq!(ctx.store().scheduled_item_count(), 1);
}

// =============================================================================
// Listing
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn list_groups_by_date_with_counts_and_reviews(ctx: &TestHarness) {
    let plain = create_test_approved_item(&ctx.deps, "https://a.example/plain").await;

    let mut syndicated_input = common::approved_item_input("https://b.example/syndicated");
    syndicated_input.is_syndicated = true;
    syndicated_input.is_collection = true;
    let syndicated = create_approved_item(syndicated_input, &ctx.curator(), &ctx.deps)
        .await
        .expect("create syndicated item")
        .value;

    let other = create_test_approved_item(&ctx.deps, "https://c.example/other").await;

    let first = schedule_test_item(&ctx.deps, &plain, SURFACE, date("2030-01-01")).await;
    let second = schedule_test_item(&ctx.deps, &syndicated, SURFACE, date("2030-01-01")).await;
    schedule_test_item(&ctx.deps, &other, SURFACE, date("2030-01-03")).await;
    // Outside the range and on another surface.
    schedule_test_item(&ctx.deps, &other, SURFACE, date("2030-01-10")).await;
    schedule_test_item(&ctx.deps, &plain, "NEW_TAB_DE_DE", date("2030-01-01")).await;

    mark_reviewed(SURFACE, date("2030-01-01"), &ctx.curator(), &ctx.deps)
        .await
        .expect("review");

    let days = list_scheduled_items(SURFACE, date("2030-01-01"), date("2030-01-05"), &ctx.deps)
        .await
        .expect("list");

    assert_eq!(days.len(), 2);

    let day_one = &days[0];
    assert_eq!(day_one.scheduled_date, date("2030-01-01"));
    assert_eq!(day_one.total_count, 2);
    assert_eq!(day_one.syndicated_count, 1);
    assert_eq!(day_one.collection_count, 1);
    assert_eq!(
        day_one.review.as_ref().map(|r| r.reviewed_by.as_str()),
        Some("curator|ada")
    );
    let order: Vec<_> = day_one
        .items
        .iter()
        .map(|i| i.scheduled.external_id)
        .collect();
    assert_eq!(order, vec![first.external_id, second.external_id]);

    let day_three = &days[1];
    assert_eq!(day_three.scheduled_date, date("2030-01-03"));
    assert_eq!(day_three.total_count, 1);
    assert!(day_three.review.is_none());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn list_rejects_unknown_surface_and_inverted_range(ctx: &TestHarness) {
    let err = list_scheduled_items("NOPE", date("2030-01-01"), date("2030-01-02"), &ctx.deps)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CorpusErrorKind::Validation);

    let err = list_scheduled_items(SURFACE, date("2030-01-02"), date("2030-01-01"), &ctx.deps)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CorpusErrorKind::Validation);
}
