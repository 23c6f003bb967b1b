//! Test fixtures for creating test data.
//!
//! These fixtures go through the public actions so that every row they create
//! is one the engine itself could have written.

use chrono::NaiveDate;
use corpus_core::common::{ActivitySource, Actor};
use corpus_core::domains::approved_items::actions::create_approved_item;
use corpus_core::domains::approved_items::{
    ApprovedItem, ApprovedItemGrade, ApprovedItemInput, Author, CorpusItemSource, CorpusLanguage,
    CuratedStatus, Topic,
};
use corpus_core::domains::scheduled_items::actions::create_scheduled_item;
use corpus_core::domains::scheduled_items::{ScheduleItemInput, ScheduledItem};
use corpus_core::domains::sections::CustomSectionInput;
use corpus_core::kernel::CorpusDeps;

pub const SURFACE: &str = "NEW_TAB_EN_US";

/// Parse a `YYYY-MM-DD` date
pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid test date")
}

/// Approved item input with every required field filled in
pub fn approved_item_input(url: &str) -> ApprovedItemInput {
    ApprovedItemInput {
        prospect_id: None,
        url: url.to_string(),
        title: "A Story Worth Reading".to_string(),
        excerpt: "Why this story is worth your time.".to_string(),
        image_url: Some("https://images.example.org/story.jpg".to_string()),
        publisher: Some("Example Press".to_string()),
        authors: vec![Author {
            name: "Jo Writer".to_string(),
            sort_order: 1,
        }],
        status: CuratedStatus::Recommendation,
        language: CorpusLanguage::En,
        topic: Some(Topic::Technology),
        source: CorpusItemSource::Manual,
        grade: Some(ApprovedItemGrade::A),
        is_collection: false,
        is_syndicated: false,
        is_time_sensitive: false,
        date_published: None,
    }
}

/// Create an approved item with the given URL
pub async fn create_test_approved_item(deps: &CorpusDeps, url: &str) -> ApprovedItem {
    create_approved_item(approved_item_input(url), &Actor::new("fixture"), deps)
        .await
        .expect("Failed to create approved item")
        .value
}

pub fn schedule_input(item: &ApprovedItem, surface: &str, on: NaiveDate) -> ScheduleItemInput {
    ScheduleItemInput {
        approved_item_external_id: item.external_id,
        scheduled_surface_guid: surface.to_string(),
        scheduled_date: on,
        source: ActivitySource::Manual,
        reasons: Vec::new(),
        reason_comment: None,
    }
}

/// Schedule an item as MANUAL
pub async fn schedule_test_item(
    deps: &CorpusDeps,
    item: &ApprovedItem,
    surface: &str,
    on: NaiveDate,
) -> ScheduledItem {
    create_scheduled_item(schedule_input(item, surface, on), &Actor::new("fixture"), deps)
        .await
        .expect("Failed to schedule item")
        .value
}

/// Custom section input with a start date and no end date
pub fn custom_section_input(title: &str, start: NaiveDate) -> CustomSectionInput {
    CustomSectionInput {
        title: title.to_string(),
        description: "Hand-picked stories".to_string(),
        hero_title: None,
        hero_description: None,
        scheduled_surface_guid: SURFACE.to_string(),
        iab: None,
        sort: None,
        active: true,
        start_date: start,
        end_date: None,
        create_source: ActivitySource::Manual,
    }
}
