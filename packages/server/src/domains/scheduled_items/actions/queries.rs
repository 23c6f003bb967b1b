use chrono::NaiveDate;
use std::collections::HashMap;

use crate::common::{ApprovedItemId, CorpusError, CorpusResult, ScheduledItemExternalId};
use crate::domains::approved_items::models::ApprovedItem;
use crate::domains::scheduled_items::types::{ScheduleDay, ScheduledItemWithStory};
use crate::kernel::CorpusDeps;

pub async fn get_scheduled_item(
    external_id: ScheduledItemExternalId,
    deps: &CorpusDeps,
) -> CorpusResult<ScheduledItemWithStory> {
    let scheduled = deps
        .store
        .find_scheduled_item(external_id)
        .await?
        .ok_or_else(|| CorpusError::not_found("ScheduledItem", external_id))?;

    let approved_item = deps
        .store
        .find_approved_items_by_ids(&[scheduled.approved_item_id])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| CorpusError::not_found("ApprovedItem", scheduled.approved_item_id))?;

    Ok(ScheduledItemWithStory {
        scheduled,
        approved_item,
    })
}

/// A surface's schedule between two dates (inclusive), one entry per date
/// that has assignments. Within a date, earliest-touched items come first.
pub async fn list_scheduled_items(
    surface_guid: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
    deps: &CorpusDeps,
) -> CorpusResult<Vec<ScheduleDay>> {
    let surface = deps.surfaces.require(surface_guid)?;
    if start_date > end_date {
        return Err(CorpusError::validation(format!(
            "Start date {} is after end date {}",
            start_date, end_date
        )));
    }

    let scheduled = deps
        .store
        .list_scheduled_items(surface.guid, start_date, end_date)
        .await?;
    if scheduled.is_empty() {
        return Ok(Vec::new());
    }

    let mut ids: Vec<ApprovedItemId> = scheduled.iter().map(|s| s.approved_item_id).collect();
    ids.sort();
    ids.dedup();
    let stories: HashMap<ApprovedItemId, ApprovedItem> = deps
        .store
        .find_approved_items_by_ids(&ids)
        .await?
        .into_iter()
        .map(|item| (item.id, item))
        .collect();

    let mut reviews: HashMap<NaiveDate, _> = deps
        .store
        .list_reviews(surface.guid, start_date, end_date)
        .await?
        .into_iter()
        .map(|review| (review.scheduled_date, review))
        .collect();

    let mut days: Vec<ScheduleDay> = Vec::new();
    for item in scheduled {
        let Some(approved_item) = stories.get(&item.approved_item_id).cloned() else {
            continue;
        };

        if days.last().map(|d| d.scheduled_date) != Some(item.scheduled_date) {
            days.push(ScheduleDay {
                scheduled_date: item.scheduled_date,
                total_count: 0,
                syndicated_count: 0,
                collection_count: 0,
                review: reviews.remove(&item.scheduled_date),
                items: Vec::new(),
            });
        }

        if let Some(day) = days.last_mut() {
            day.total_count += 1;
            if approved_item.is_syndicated {
                day.syndicated_count += 1;
            }
            if approved_item.is_collection {
                day.collection_count += 1;
            }
            day.items.push(ScheduledItemWithStory {
                scheduled: item,
                approved_item,
            });
        }
    }

    Ok(days)
}
