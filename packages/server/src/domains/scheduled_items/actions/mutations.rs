//! Scheduling mutations
//!
//! Slot uniqueness is enforced twice: a pre-check that produces a readable
//! error, and the store's unique index, which settles concurrent races. Both
//! paths yield `CorpusError::AlreadyScheduled`.

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::common::{
    ActivitySource, Actor, CorpusError, CorpusResult, ScheduledItemExternalId, StoreError,
};
use crate::domains::approved_items::models::ApprovedItem;
use crate::domains::domain_policy::actions::promote_if_eligible;
use crate::domains::scheduled_items::models::{
    NewScheduledItem, ScheduledItem, SLOT_UNIQUE_CONSTRAINT,
};
use crate::domains::scheduled_items::types::{
    RemovalReason, ScheduleItemInput, ScheduledItemReason, SchedulingNote,
};
use crate::kernel::{
    notify, Committed, CorpusDeps, CorpusEvent, CorpusEventType, EventPayload,
    ScheduledItemPayload,
};

fn already_scheduled(surface: &str, date: NaiveDate) -> CorpusError {
    CorpusError::AlreadyScheduled {
        surface: surface.to_string(),
        date,
    }
}

fn map_slot_error(err: StoreError, surface: &str, date: NaiveDate) -> CorpusError {
    match err {
        StoreError::UniqueViolation(constraint) if constraint == SLOT_UNIQUE_CONSTRAINT => {
            already_scheduled(surface, date)
        }
        other => other.into(),
    }
}

async fn ensure_slot_free(
    approved_item: &ApprovedItem,
    surface: &str,
    date: NaiveDate,
    deps: &CorpusDeps,
) -> CorpusResult<()> {
    if deps
        .store
        .find_scheduled_item_in_slot(approved_item.id, surface, date)
        .await?
        .is_some()
    {
        return Err(already_scheduled(surface, date));
    }
    Ok(())
}

async fn story_for(scheduled: &ScheduledItem, deps: &CorpusDeps) -> CorpusResult<ApprovedItem> {
    deps.store
        .find_approved_items_by_ids(&[scheduled.approved_item_id])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| CorpusError::not_found("ApprovedItem", scheduled.approved_item_id))
}

/// Trust promotion runs after the write committed, so its failure is logged
/// rather than returned.
async fn promote_domain(domain_name: &str, as_of: NaiveDate, deps: &CorpusDeps) {
    if let Err(e) = promote_if_eligible(domain_name, as_of, deps).await {
        warn!(domain = %domain_name, error = %e, "Domain trust promotion failed");
    }
}

/// Put a story on a surface for one date.
///
/// Checks run in order: the story exists, the surface is known, the story's
/// domain is not excluded, the slot is free.
pub async fn create_scheduled_item(
    input: ScheduleItemInput,
    actor: &Actor,
    deps: &CorpusDeps,
) -> CorpusResult<Committed<ScheduledItem>> {
    let approved_item = deps
        .store
        .find_approved_item(input.approved_item_external_id)
        .await?
        .ok_or_else(|| {
            CorpusError::not_found("ApprovedItem", input.approved_item_external_id)
        })?;

    let surface = deps.surfaces.require(&input.scheduled_surface_guid)?;

    if deps.store.is_excluded(&approved_item.domain_name).await? {
        return Err(CorpusError::ExcludedDomain {
            domain: approved_item.domain_name.clone(),
        });
    }

    ensure_slot_free(&approved_item, surface.guid, input.scheduled_date, deps).await?;

    info!(
        approved_item = %approved_item.external_id,
        surface = %surface.guid,
        date = %input.scheduled_date,
        source = %input.source,
        actor = %actor,
        "Scheduling item"
    );

    let new = NewScheduledItem {
        external_id: ScheduledItemExternalId::new(),
        approved_item_id: approved_item.id,
        scheduled_surface_guid: surface.guid.to_string(),
        scheduled_date: input.scheduled_date,
        source: input.source,
        created_by: actor.to_string(),
    };

    let scheduled = deps
        .store
        .insert_scheduled_item(new)
        .await
        .map_err(|e| map_slot_error(e, surface.guid, input.scheduled_date))?;

    promote_domain(&approved_item.domain_name, scheduled.scheduled_date, deps).await;

    let note = SchedulingNote::<ScheduledItemReason>::new(input.reasons, input.reason_comment);
    let event = CorpusEvent::new(
        CorpusEventType::ScheduledItemAdded,
        actor,
        EventPayload::ScheduledItem(Box::new(ScheduledItemPayload {
            scheduled_item: scheduled.clone(),
            approved_item,
            original_scheduled_item_external_id: None,
            reasons: note.codes(),
            reason_comment: note.comment,
        })),
    );
    Ok(notify(deps.events.as_ref(), scheduled, event).await)
}

/// Take a story off a surface.
///
/// The removal event gets its own fresh `event_id`; the payload carries the
/// deleted row, external id included.
pub async fn delete_scheduled_item(
    external_id: ScheduledItemExternalId,
    note: SchedulingNote<RemovalReason>,
    actor: &Actor,
    deps: &CorpusDeps,
) -> CorpusResult<Committed<ScheduledItem>> {
    let existing = deps
        .store
        .find_scheduled_item(external_id)
        .await?
        .ok_or_else(|| CorpusError::not_found("ScheduledItem", external_id))?;
    let approved_item = story_for(&existing, deps).await?;

    info!(
        scheduled_item = %external_id,
        surface = %existing.scheduled_surface_guid,
        date = %existing.scheduled_date,
        actor = %actor,
        "Unscheduling item"
    );

    let deleted = deps
        .store
        .delete_scheduled_item(external_id)
        .await?
        .ok_or_else(|| CorpusError::not_found("ScheduledItem", external_id))?;

    let event = CorpusEvent::new(
        CorpusEventType::ScheduledItemRemoved,
        actor,
        EventPayload::ScheduledItem(Box::new(ScheduledItemPayload {
            scheduled_item: deleted.clone(),
            approved_item,
            original_scheduled_item_external_id: None,
            reasons: note.codes(),
            reason_comment: note.comment,
        })),
    );
    Ok(notify(deps.events.as_ref(), deleted, event).await)
}

/// Move an assignment to another date on the same surface.
///
/// Moving to the date it already has changes nothing: the row comes back as
/// is and no event is emitted. Otherwise the row is replaced by a new one with
/// a new external id and fresh audit columns; the event links the two through
/// `original_scheduled_item_external_id`.
pub async fn reschedule_scheduled_item(
    external_id: ScheduledItemExternalId,
    new_date: NaiveDate,
    source: ActivitySource,
    note: SchedulingNote<ScheduledItemReason>,
    actor: &Actor,
    deps: &CorpusDeps,
) -> CorpusResult<Committed<ScheduledItem>> {
    let existing = deps
        .store
        .find_scheduled_item(external_id)
        .await?
        .ok_or_else(|| CorpusError::not_found("ScheduledItem", external_id))?;

    if existing.scheduled_date == new_date {
        info!(scheduled_item = %external_id, date = %new_date, "Reschedule to the same date; nothing to do");
        return Ok(Committed::skipped(existing));
    }

    let approved_item = story_for(&existing, deps).await?;
    let surface = existing.scheduled_surface_guid.clone();

    ensure_slot_free(&approved_item, &surface, new_date, deps).await?;

    info!(
        scheduled_item = %external_id,
        surface = %surface,
        from = %existing.scheduled_date,
        to = %new_date,
        actor = %actor,
        "Rescheduling item"
    );

    let replacement = NewScheduledItem {
        external_id: ScheduledItemExternalId::new(),
        approved_item_id: existing.approved_item_id,
        scheduled_surface_guid: surface.clone(),
        scheduled_date: new_date,
        source,
        created_by: actor.to_string(),
    };

    let rescheduled = deps
        .store
        .replace_scheduled_item(external_id, replacement)
        .await
        .map_err(|e| map_slot_error(e, &surface, new_date))?
        .ok_or_else(|| CorpusError::not_found("ScheduledItem", external_id))?;

    promote_domain(&approved_item.domain_name, new_date, deps).await;

    let event = CorpusEvent::new(
        CorpusEventType::ScheduledItemRescheduled,
        actor,
        EventPayload::ScheduledItem(Box::new(ScheduledItemPayload {
            scheduled_item: rescheduled.clone(),
            approved_item,
            original_scheduled_item_external_id: Some(external_id),
            reasons: note.codes(),
            reason_comment: note.comment,
        })),
    );
    Ok(notify(deps.events.as_ref(), rescheduled, event).await)
}
