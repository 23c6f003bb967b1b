//! Approved/rejected item mutations
//!
//! Each mutation commits first and emits its event afterwards. The returned
//! `Committed` tells the caller whether the event went out.

use tracing::info;

use crate::common::{
    Actor, ApprovedItemExternalId, CorpusError, CorpusResult, RejectedItemExternalId, StoreError,
};
use crate::domains::approved_items::inputs::{ApprovedItemInput, RejectedItemInput};
use crate::domains::approved_items::models::{
    ApprovedItem, ApprovedItemUpdate, NewApprovedItem, NewRejectedItem, RejectedItem,
    URL_UNIQUE_CONSTRAINT,
};
use crate::domains::approved_items::types::{
    join_rejection_reasons, normalize_authors, parse_rejection_reasons,
};
use crate::domains::domain_policy::domain_name_from_url;
use crate::kernel::{notify, Committed, CorpusDeps, CorpusEvent, CorpusEventType, EventPayload};

fn require_text(value: &str, field: &str) -> CorpusResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CorpusError::validation(format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}

fn duplicate_url(url: &str) -> CorpusError {
    CorpusError::Conflict(format!(
        "An approved or rejected item with the URL \"{}\" already exists",
        url
    ))
}

/// Fail with CONFLICT when `url` exists as an approved or a rejected item.
async fn ensure_url_unused(url: &str, deps: &CorpusDeps) -> CorpusResult<()> {
    if deps.store.find_approved_item_by_url(url).await?.is_some()
        || deps.store.find_rejected_item_by_url(url).await?.is_some()
    {
        return Err(duplicate_url(url));
    }
    Ok(())
}

/// Fail with VALIDATION while any scheduled item still points at the story.
async fn ensure_unscheduled(item: &ApprovedItem, action: &str, deps: &CorpusDeps) -> CorpusResult<()> {
    let scheduled = deps.store.count_scheduled_for_item(item.id).await?;
    if scheduled > 0 {
        return Err(CorpusError::validation(format!(
            "Cannot {} this story: it is scheduled {} time(s). Unschedule it first.",
            action, scheduled
        )));
    }
    Ok(())
}

/// Maps a scheduling foreign key hit during a race to the same error the
/// pre-check produces.
fn still_scheduled(err: StoreError, action: &str) -> CorpusError {
    match err {
        StoreError::ForeignKeyViolation(_) => CorpusError::validation(format!(
            "Cannot {} this story: it is still scheduled. Unschedule it first.",
            action
        )),
        other => other.into(),
    }
}

pub async fn create_approved_item(
    input: ApprovedItemInput,
    actor: &Actor,
    deps: &CorpusDeps,
) -> CorpusResult<Committed<ApprovedItem>> {
    let url = input.url.trim().to_string();
    let domain_name = domain_name_from_url(&url)?;
    let title = require_text(&input.title, "Title")?;
    let excerpt = require_text(&input.excerpt, "Excerpt")?;

    let publisher = match input.publisher.as_deref().map(str::trim) {
        Some(publisher) if !publisher.is_empty() => publisher.to_string(),
        _ => deps
            .store
            .find_publisher_domain(&domain_name)
            .await?
            .map(|mapping| mapping.publisher)
            .ok_or_else(|| {
                CorpusError::validation(format!(
                    "A publisher is required: no publisher is mapped to {}",
                    domain_name
                ))
            })?,
    };

    ensure_url_unused(&url, deps).await?;

    info!(url = %url, domain = %domain_name, actor = %actor, "Creating approved item");

    let new = NewApprovedItem {
        external_id: ApprovedItemExternalId::new(),
        prospect_id: input.prospect_id,
        url: url.clone(),
        domain_name,
        title,
        excerpt,
        image_url: input.image_url,
        publisher,
        authors: normalize_authors(input.authors),
        status: input.status,
        language: input.language,
        topic: input.topic,
        source: input.source,
        grade: input.grade,
        is_collection: input.is_collection,
        is_syndicated: input.is_syndicated,
        is_time_sensitive: input.is_time_sensitive,
        date_published: input.date_published,
        created_by: actor.to_string(),
    };

    let item = match deps.store.insert_approved_item(new).await {
        Ok(item) => item,
        Err(StoreError::UniqueViolation(constraint)) if constraint == URL_UNIQUE_CONSTRAINT => {
            return Err(duplicate_url(&url))
        }
        Err(e) => return Err(e.into()),
    };

    let event = CorpusEvent::new(
        CorpusEventType::ApprovedItemAdded,
        actor,
        EventPayload::ApprovedItem {
            approved_item: Box::new(item.clone()),
        },
    );
    Ok(notify(deps.events.as_ref(), item, event).await)
}

/// Update the mutable metadata of a story. `url`, `domain_name` and the ids
/// never change.
pub async fn update_approved_item(
    external_id: ApprovedItemExternalId,
    mut update: ApprovedItemUpdate,
    actor: &Actor,
    deps: &CorpusDeps,
) -> CorpusResult<Committed<ApprovedItem>> {
    update.title = require_text(&update.title, "Title")?;
    update.excerpt = require_text(&update.excerpt, "Excerpt")?;
    update.publisher = require_text(&update.publisher, "Publisher")?;
    update.authors = normalize_authors(update.authors);

    info!(approved_item = %external_id, actor = %actor, "Updating approved item");

    let item = deps
        .store
        .update_approved_item(external_id, update, actor.as_str())
        .await?
        .ok_or_else(|| CorpusError::not_found("ApprovedItem", external_id))?;

    let event = CorpusEvent::new(
        CorpusEventType::ApprovedItemUpdated,
        actor,
        EventPayload::ApprovedItem {
            approved_item: Box::new(item.clone()),
        },
    );
    Ok(notify(deps.events.as_ref(), item, event).await)
}

/// Move an approved story to the rejected table.
pub async fn reject_approved_item(
    external_id: ApprovedItemExternalId,
    reasons: &str,
    actor: &Actor,
    deps: &CorpusDeps,
) -> CorpusResult<Committed<RejectedItem>> {
    let reasons = parse_rejection_reasons(reasons)?;

    let item = deps
        .store
        .find_approved_item(external_id)
        .await?
        .ok_or_else(|| CorpusError::not_found("ApprovedItem", external_id))?;
    ensure_unscheduled(&item, "reject", deps).await?;

    info!(
        approved_item = %external_id,
        reasons = %join_rejection_reasons(&reasons),
        actor = %actor,
        "Rejecting approved item"
    );

    let rejected = NewRejectedItem {
        external_id: RejectedItemExternalId::new(),
        prospect_id: item.prospect_id.clone(),
        url: item.url.clone(),
        title: Some(item.title.clone()),
        topic: item.topic,
        language: Some(item.language),
        publisher: Some(item.publisher.clone()),
        reason: join_rejection_reasons(&reasons),
        created_by: actor.to_string(),
    };

    let rejected = deps
        .store
        .reject_approved_item(external_id, rejected)
        .await
        .map_err(|e| still_scheduled(e, "reject"))?
        .ok_or_else(|| CorpusError::not_found("ApprovedItem", external_id))?;

    let event = CorpusEvent::new(
        CorpusEventType::RejectedItemAdded,
        actor,
        EventPayload::RejectedItem {
            rejected_item: rejected.clone(),
        },
    );
    Ok(notify(deps.events.as_ref(), rejected, event).await)
}

/// Reject a prospect that was never approved.
pub async fn create_rejected_item(
    input: RejectedItemInput,
    actor: &Actor,
    deps: &CorpusDeps,
) -> CorpusResult<Committed<RejectedItem>> {
    let url = input.url.trim().to_string();
    domain_name_from_url(&url)?;
    let reasons = parse_rejection_reasons(&input.reason)?;

    ensure_url_unused(&url, deps).await?;

    info!(url = %url, actor = %actor, "Creating rejected item");

    let new = NewRejectedItem {
        external_id: RejectedItemExternalId::new(),
        prospect_id: input.prospect_id,
        url: url.clone(),
        title: input.title,
        topic: input.topic,
        language: input.language,
        publisher: input.publisher,
        reason: join_rejection_reasons(&reasons),
        created_by: actor.to_string(),
    };

    let rejected = match deps.store.insert_rejected_item(new).await {
        Ok(rejected) => rejected,
        Err(StoreError::UniqueViolation(constraint)) if constraint == URL_UNIQUE_CONSTRAINT => {
            return Err(duplicate_url(&url))
        }
        Err(e) => return Err(e.into()),
    };

    let event = CorpusEvent::new(
        CorpusEventType::RejectedItemAdded,
        actor,
        EventPayload::RejectedItem {
            rejected_item: rejected.clone(),
        },
    );
    Ok(notify(deps.events.as_ref(), rejected, event).await)
}

/// Delete a story that is no longer scheduled anywhere. Section memberships
/// go with it.
pub async fn delete_approved_item(
    external_id: ApprovedItemExternalId,
    actor: &Actor,
    deps: &CorpusDeps,
) -> CorpusResult<Committed<ApprovedItem>> {
    let item = deps
        .store
        .find_approved_item(external_id)
        .await?
        .ok_or_else(|| CorpusError::not_found("ApprovedItem", external_id))?;
    ensure_unscheduled(&item, "delete", deps).await?;

    info!(approved_item = %external_id, actor = %actor, "Deleting approved item");

    let deleted = deps
        .store
        .delete_approved_item(external_id)
        .await
        .map_err(|e| still_scheduled(e, "delete"))?
        .ok_or_else(|| CorpusError::not_found("ApprovedItem", external_id))?;

    let event = CorpusEvent::new(
        CorpusEventType::ApprovedItemRemoved,
        actor,
        EventPayload::ApprovedItem {
            approved_item: Box::new(deleted.clone()),
        },
    );
    Ok(notify(deps.events.as_ref(), deleted, event).await)
}
