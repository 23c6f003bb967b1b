//! Integration tests for the content item repository.

mod common;

use crate::common::{
    approved_item_input, create_test_approved_item, date, schedule_test_item, TestHarness, SURFACE,
};
use corpus_core::common::{CorpusErrorKind, RejectedItemExternalId, StoreError};
use corpus_core::domains::approved_items::actions::{
    create_approved_item, create_rejected_item, delete_approved_item, find_approved_item_by_url,
    get_approved_item, reject_approved_item, update_approved_item,
};
use corpus_core::domains::approved_items::models::{NewRejectedItem, URL_UNIQUE_CONSTRAINT};
use corpus_core::domains::approved_items::{
    ApprovedItem, ApprovedItemUpdate, Author, RejectedItemInput,
};
use corpus_core::domains::domain_policy::actions::upsert_publisher_domain;
use corpus_core::domains::scheduled_items::actions::delete_scheduled_item;
use corpus_core::domains::scheduled_items::SchedulingNote;
use corpus_core::kernel::{BaseApprovedItemStore, CorpusEventType, EventPayload};
use test_context::test_context;

fn update_of(item: &ApprovedItem) -> ApprovedItemUpdate {
    ApprovedItemUpdate {
        title: item.title.clone(),
        excerpt: item.excerpt.clone(),
        image_url: item.image_url.clone(),
        publisher: item.publisher.clone(),
        authors: item.authors.0.clone(),
        status: item.status,
        language: item.language,
        topic: item.topic,
        grade: item.grade,
        is_collection: item.is_collection,
        is_syndicated: item.is_syndicated,
        is_time_sensitive: item.is_time_sensitive,
        date_published: item.date_published,
    }
}

fn rejected_input(url: &str, reason: &str) -> RejectedItemInput {
    RejectedItemInput {
        prospect_id: Some("prospect-1".to_string()),
        url: url.to_string(),
        title: Some("Not for us".to_string()),
        topic: None,
        language: None,
        publisher: None,
        reason: reason.to_string(),
    }
}

// =============================================================================
// Create
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn create_derives_domain_and_emits_event(ctx: &TestHarness) {
    let mut input = approved_item_input("https://www.Example.org/story?id=1");
    input.authors = vec![
        Author {
            name: "Second".to_string(),
            sort_order: 7,
        },
        Author {
            name: "First".to_string(),
            sort_order: 2,
        },
    ];

    let committed = create_approved_item(input, &ctx.curator(), &ctx.deps)
        .await
        .expect("create approved item");
    let item = committed.value;

    assert_eq!(item.domain_name, "example.org");
    assert_eq!(item.created_by, "curator|ada");
    let authors: Vec<_> = item
        .authors
        .0
        .iter()
        .map(|a| (a.name.as_str(), a.sort_order))
        .collect();
    assert_eq!(authors, vec![("First", 1), ("Second", 2)]);

    let event = ctx.events().pop().expect("added event");
    assert_eq!(event.event_type, CorpusEventType::ApprovedItemAdded);
    match event.payload {
        EventPayload::ApprovedItem { approved_item } => {
            assert_eq!(approved_item.external_id, item.external_id)
        }
        other => panic!("unexpected payload: {:?}", other),
    }

    let found = find_approved_item_by_url(&item.url, &ctx.deps)
        .await
        .unwrap()
        .expect("found by url");
    assert_eq!(found.id, item.id);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn create_rejects_non_http_urls(ctx: &TestHarness) {
    for bad in ["ftp://example.org/file", "not a url", "https://127.0.0.1/x"] {
        let err = create_approved_item(approved_item_input(bad), &ctx.curator(), &ctx.deps)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), CorpusErrorKind::Validation, "input {:?}", bad);
    }
}

#[test_context(TestHarness)]
#[tokio::test]
async fn publisher_falls_back_to_the_domain_mapping(ctx: &TestHarness) {
    let mut input = approved_item_input("https://mapped.example/story");
    input.publisher = None;
    let err = create_approved_item(input.clone(), &ctx.curator(), &ctx.deps)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CorpusErrorKind::Validation);

    upsert_publisher_domain("mapped.example", "Mapped Media", &ctx.curator(), &ctx.deps)
        .await
        .expect("map publisher");

    let item = create_approved_item(input, &ctx.curator(), &ctx.deps)
        .await
        .expect("publisher comes from the mapping")
        .value;
    assert_eq!(item.publisher, "Mapped Media");
}

// =============================================================================
// URL uniqueness
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn url_is_unique_across_approved_and_rejected(ctx: &TestHarness) {
    create_test_approved_item(&ctx.deps, "https://a.example/x").await;

    let err = create_approved_item(
        approved_item_input("https://a.example/x"),
        &ctx.curator(),
        &ctx.deps,
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind(), CorpusErrorKind::Conflict);

    let err = create_rejected_item(
        rejected_input("https://a.example/x", "PAYWALL"),
        &ctx.curator(),
        &ctx.deps,
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind(), CorpusErrorKind::Conflict);

    create_rejected_item(
        rejected_input("https://b.example/y", "OTHER"),
        &ctx.curator(),
        &ctx.deps,
    )
    .await
    .expect("reject a prospect");

    let err = create_approved_item(
        approved_item_input("https://b.example/y"),
        &ctx.curator(),
        &ctx.deps,
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind(), CorpusErrorKind::Conflict);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn store_refuses_a_rejected_row_for_an_approved_url(ctx: &TestHarness) {
    let item = create_test_approved_item(&ctx.deps, "https://a.example/x").await;

    let row = NewRejectedItem {
        external_id: RejectedItemExternalId::new(),
        prospect_id: None,
        url: item.url.clone(),
        title: None,
        topic: None,
        language: None,
        publisher: None,
        reason: "OTHER".to_string(),
        created_by: "curator|ada".to_string(),
    };
    match ctx.store().insert_rejected_item(row).await {
        Err(StoreError::UniqueViolation(constraint)) => {
            assert_eq!(constraint, URL_UNIQUE_CONSTRAINT)
        }
        other => panic!("expected a URL unique violation, got {:?}", other),
    }
}

// =============================================================================
// Update
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn update_changes_metadata_only(ctx: &TestHarness) {
    let item = create_test_approved_item(&ctx.deps, "https://a.example/x").await;

    let mut update = update_of(&item);
    update.title = "  A Better Headline ".to_string();
    update.is_time_sensitive = true;

    let updated = update_approved_item(item.external_id, update, &ctx.curator(), &ctx.deps)
        .await
        .expect("update")
        .value;

    assert_eq!(updated.title, "A Better Headline");
    assert!(updated.is_time_sensitive);
    assert_eq!(updated.url, item.url);
    assert_eq!(updated.external_id, item.external_id);
    assert_eq!(updated.domain_name, item.domain_name);
    assert_eq!(updated.updated_by.as_deref(), Some("curator|ada"));
    assert_eq!(
        ctx.events().pop().map(|e| e.event_type),
        Some(CorpusEventType::ApprovedItemUpdated)
    );

    let err = update_approved_item(
        Default::default(),
        update_of(&item),
        &ctx.curator(),
        &ctx.deps,
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind(), CorpusErrorKind::NotFound);
}

// =============================================================================
// Reject and delete
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn reject_moves_the_story_to_the_rejected_table(ctx: &TestHarness) {
    let item = create_test_approved_item(&ctx.deps, "https://a.example/x").await;

    let rejected = reject_approved_item(
        item.external_id,
        " PAYWALL,MISINFORMATION, PAYWALL ",
        &ctx.curator(),
        &ctx.deps,
    )
    .await
    .expect("reject")
    .value;

    assert_eq!(rejected.url, item.url);
    assert_eq!(rejected.reason, "PAYWALL,MISINFORMATION");
    assert_eq!(rejected.publisher.as_deref(), Some(item.publisher.as_str()));

    let err = get_approved_item(item.external_id, &ctx.deps)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CorpusErrorKind::NotFound);

    let event = ctx.events().pop().expect("rejected event");
    assert_eq!(event.event_type, CorpusEventType::RejectedItemAdded);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn reject_rejects_unknown_reason_codes(ctx: &TestHarness) {
    let item = create_test_approved_item(&ctx.deps, "https://a.example/x").await;

    for bad in ["CLICKBAIT", " , "] {
        let err = reject_approved_item(item.external_id, bad, &ctx.curator(), &ctx.deps)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), CorpusErrorKind::Validation, "input {:?}", bad);
    }

    get_approved_item(item.external_id, &ctx.deps)
        .await
        .expect("story is untouched");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn scheduled_story_cannot_be_rejected_or_deleted(ctx: &TestHarness) {
    let item = create_test_approved_item(&ctx.deps, "https://a.example/x").await;
    let scheduled = schedule_test_item(&ctx.deps, &item, SURFACE, date("2030-01-01")).await;

    let err = reject_approved_item(item.external_id, "OTHER", &ctx.curator(), &ctx.deps)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CorpusErrorKind::Validation);

    let err = delete_approved_item(item.external_id, &ctx.curator(), &ctx.deps)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CorpusErrorKind::Validation);
    assert!(err.to_string().contains("scheduled"));

    delete_scheduled_item(
        scheduled.external_id,
        SchedulingNote::none(),
        &ctx.curator(),
        &ctx.deps,
    )
    .await
    .expect("unschedule");

    let deleted = delete_approved_item(item.external_id, &ctx.curator(), &ctx.deps)
        .await
        .expect("delete once unscheduled")
        .value;
    assert_eq!(deleted.external_id, item.external_id);
    assert_eq!(
        ctx.events().pop().map(|e| e.event_type),
        Some(CorpusEventType::ApprovedItemRemoved)
    );
}
