//! Integration tests for the domain policy store.

mod common;

use crate::common::TestHarness;
use corpus_core::common::{Actor, CorpusErrorKind};
use corpus_core::domains::domain_policy::actions::{
    add_excluded_domain, find_publisher_domain, is_excluded, list_excluded_domains,
    promote_if_eligible, remove_excluded_domain, upsert_publisher_domain,
};
use test_context::test_context;

// =============================================================================
// Publisher mappings
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn upsert_normalizes_hostname(ctx: &TestHarness) {
    let mapping = upsert_publisher_domain("WWW.Example.ORG", "Example Press", &ctx.curator(), &ctx.deps)
        .await
        .expect("upsert mapping");

    assert_eq!(mapping.domain_name, "example.org");
    assert_eq!(mapping.publisher, "Example Press");
    assert_eq!(mapping.created_by, "curator|ada");
    assert!(mapping.updated_by.is_none());

    let found = find_publisher_domain("example.org", &ctx.deps)
        .await
        .unwrap()
        .expect("mapping stored under the normalized key");
    assert_eq!(found.publisher, "Example Press");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn upsert_keeps_creation_audit_on_update(ctx: &TestHarness) {
    let created = upsert_publisher_domain("example.org", "Example Press", &ctx.curator(), &ctx.deps)
        .await
        .expect("create mapping");

    let updated = upsert_publisher_domain(
        "example.org",
        "Example Media Group",
        &Actor::new("curator|grace"),
        &ctx.deps,
    )
    .await
    .expect("remap");

    assert_eq!(updated.publisher, "Example Media Group");
    assert_eq!(updated.created_by, "curator|ada");
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(updated.updated_by.as_deref(), Some("curator|grace"));
    assert!(updated.updated_at >= created.updated_at);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn upsert_rejects_invalid_hostnames(ctx: &TestHarness) {
    for bad in [
        "https://example.org/path",
        "*.example.org",
        "192.168.0.1",
        "localhost",
        "co.uk",
        "example.org:8080",
        "",
    ] {
        let err = upsert_publisher_domain(bad, "Anyone", &ctx.curator(), &ctx.deps)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), CorpusErrorKind::Validation, "input {:?}", bad);
    }

    let err = upsert_publisher_domain("example.org", "  ", &ctx.curator(), &ctx.deps)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CorpusErrorKind::Validation);
}

// =============================================================================
// Exclusions
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn exclusion_list_add_list_remove(ctx: &TestHarness) {
    add_excluded_domain("www.spam.example", &ctx.curator(), &ctx.deps)
        .await
        .expect("exclude");
    add_excluded_domain("ads.example", &ctx.curator(), &ctx.deps)
        .await
        .expect("exclude");

    assert!(is_excluded("spam.example", &ctx.deps).await.unwrap());

    let listed: Vec<_> = list_excluded_domains(&ctx.deps)
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.domain_name)
        .collect();
    assert_eq!(listed, vec!["ads.example", "spam.example"]);

    let err = add_excluded_domain("spam.example", &ctx.curator(), &ctx.deps)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CorpusErrorKind::Conflict);

    let removed = remove_excluded_domain("spam.example", &ctx.curator(), &ctx.deps)
        .await
        .expect("remove");
    assert_eq!(removed.domain_name, "spam.example");
    assert!(!is_excluded("spam.example", &ctx.deps).await.unwrap());

    let err = remove_excluded_domain("spam.example", &ctx.curator(), &ctx.deps)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), CorpusErrorKind::NotFound);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn promotion_without_history_is_a_no_op(ctx: &TestHarness) {
    let promoted = promote_if_eligible("quiet.example", common::date("2030-01-01"), &ctx.deps)
        .await
        .expect("promotion check");
    assert!(!promoted);
}
