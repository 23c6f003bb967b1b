//! Section mutations
//!
//! ML sections are written only through [`create_or_replace_ml_section`];
//! custom (MANUAL) sections only through the `*_custom_section` actions.

use chrono::NaiveDate;
use tracing::info;

use crate::common::{
    ActivitySource, Actor, ApprovedItemExternalId, CorpusError, CorpusResult,
    SectionItemExternalId, StoreError,
};
use crate::domains::sections::inputs::{
    CustomSectionInput, CustomSectionUpdateInput, MlSectionInput,
};
use crate::domains::sections::models::{
    CustomSectionUpdate, MlSectionGeneration, NewSection, NewSectionItem, Section, SectionItem,
};
use crate::domains::sections::types::IabMetadata;
use crate::kernel::CorpusDeps;

fn require_text(value: &str, field: &str) -> CorpusResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CorpusError::validation(format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn require_manual(create_source: ActivitySource) -> CorpusResult<()> {
    if create_source != ActivitySource::Manual {
        return Err(CorpusError::validation(format!(
            "Cannot create or update a custom section with createSource {}; only MANUAL is allowed",
            create_source
        )));
    }
    Ok(())
}

fn validate_window(start_date: NaiveDate, end_date: Option<NaiveDate>) -> CorpusResult<()> {
    if let Some(end) = end_date {
        if end <= start_date {
            return Err(CorpusError::validation(format!(
                "End date {} must be after start date {}",
                end, start_date
            )));
        }
    }
    Ok(())
}

fn validate_iab(iab: Option<IabMetadata>) -> CorpusResult<Option<IabMetadata>> {
    iab.map(|iab| iab.validated()).transpose()
}

fn not_custom(external_id: &str) -> CorpusError {
    CorpusError::validation(format!(
        "Section \"{}\" is not a custom section",
        external_id
    ))
}

async fn find_section(external_id: &str, deps: &CorpusDeps) -> CorpusResult<Section> {
    deps.store
        .find_section(external_id)
        .await?
        .ok_or_else(|| CorpusError::not_found("Section", external_id))
}

/// Apply one ML generation of a section (generation swap).
///
/// The section row is created or overwritten, and every currently-active item
/// is retired with `deactivate_source = ML` whatever the incoming `active`
/// flag. Items that were already inactive are not touched. Fails VALIDATION
/// when the external id already names a custom section.
pub async fn create_or_replace_ml_section(
    input: MlSectionInput,
    deps: &CorpusDeps,
) -> CorpusResult<Section> {
    let external_id = require_text(&input.external_id, "Section external id")?;
    let title = require_text(&input.title, "Title")?;
    let surface = deps.surfaces.require(&input.scheduled_surface_guid)?;

    if let Some(existing) = deps.store.find_section(&external_id).await? {
        if existing.is_custom() {
            return Err(CorpusError::validation(format!(
                "Section \"{}\" is a custom section and cannot be replaced by an ML generation",
                external_id
            )));
        }
    }

    let generation = MlSectionGeneration {
        external_id: external_id.clone(),
        title,
        scheduled_surface_guid: surface.guid.to_string(),
        sort: input.sort,
        active: input.active,
        actor: Actor::ML.to_string(),
    };

    let (section, retired) = deps
        .store
        .apply_ml_generation(generation)
        .await?
        .ok_or_else(|| {
            CorpusError::validation(format!(
                "Section \"{}\" is a custom section and cannot be replaced by an ML generation",
                external_id
            ))
        })?;

    info!(
        section = %section.external_id,
        surface = %section.scheduled_surface_guid,
        active = section.active,
        retired_items = retired,
        "Applied ML section generation"
    );

    Ok(section)
}

pub async fn create_custom_section(
    input: CustomSectionInput,
    actor: &Actor,
    deps: &CorpusDeps,
) -> CorpusResult<Section> {
    require_manual(input.create_source)?;
    let surface = deps.surfaces.require(&input.scheduled_surface_guid)?;
    let title = require_text(&input.title, "Title")?;
    let description = require_text(&input.description, "Description")?;
    validate_window(input.start_date, input.end_date)?;
    let iab = validate_iab(input.iab)?;

    let new = NewSection {
        external_id: uuid::Uuid::new_v4().to_string(),
        title,
        description: Some(description),
        hero_title: optional_text(input.hero_title),
        hero_description: optional_text(input.hero_description),
        scheduled_surface_guid: surface.guid.to_string(),
        iab,
        sort: input.sort,
        create_source: ActivitySource::Manual,
        active: input.active,
        start_date: Some(input.start_date),
        end_date: input.end_date,
        created_by: actor.to_string(),
    };

    let section = deps.store.insert_section(new).await?;

    info!(
        section = %section.external_id,
        surface = %section.scheduled_surface_guid,
        actor = %actor,
        "Created custom section"
    );

    Ok(section)
}

pub async fn update_custom_section(
    external_id: &str,
    input: CustomSectionUpdateInput,
    actor: &Actor,
    deps: &CorpusDeps,
) -> CorpusResult<Section> {
    require_manual(input.create_source)?;
    let title = require_text(&input.title, "Title")?;
    let description = require_text(&input.description, "Description")?;
    validate_window(input.start_date, input.end_date)?;
    let iab = validate_iab(input.iab)?;

    let existing = find_section(external_id, deps).await?;
    if !existing.is_custom() {
        return Err(not_custom(external_id));
    }

    let update = CustomSectionUpdate {
        title,
        description: Some(description),
        hero_title: optional_text(input.hero_title),
        hero_description: optional_text(input.hero_description),
        iab,
        sort: input.sort,
        active: input.active,
        start_date: Some(input.start_date),
        end_date: input.end_date,
        updated_by: actor.to_string(),
    };

    let section = deps
        .store
        .update_custom_section(external_id, update)
        .await?
        .ok_or_else(|| not_custom(external_id))?;

    info!(section = %external_id, actor = %actor, "Updated custom section");

    Ok(section)
}

/// Soft-delete a custom section and deactivate all its items.
pub async fn delete_custom_section(
    external_id: &str,
    actor: &Actor,
    deps: &CorpusDeps,
) -> CorpusResult<Section> {
    let existing = find_section(external_id, deps).await?;
    if !existing.is_custom() {
        return Err(not_custom(external_id));
    }

    let section = deps
        .store
        .deactivate_section(external_id, ActivitySource::Manual, actor.as_str())
        .await?
        .ok_or_else(|| CorpusError::not_found("Section", external_id))?;

    info!(section = %external_id, actor = %actor, "Deleted custom section");

    Ok(section)
}

/// Toggle `disabled`, independent of `active`.
pub async fn set_section_disabled(
    external_id: &str,
    disabled: bool,
    actor: &Actor,
    deps: &CorpusDeps,
) -> CorpusResult<Section> {
    let section = deps
        .store
        .set_section_disabled(external_id, disabled, actor.as_str())
        .await?
        .ok_or_else(|| CorpusError::not_found("Section", external_id))?;

    info!(section = %external_id, disabled, actor = %actor, "Set section disabled flag");

    Ok(section)
}

/// Add a story to a section. The same story may be added more than once.
pub async fn add_section_item(
    section_external_id: &str,
    approved_item_external_id: ApprovedItemExternalId,
    rank: Option<i32>,
    deps: &CorpusDeps,
) -> CorpusResult<SectionItem> {
    let section = find_section(section_external_id, deps).await?;
    let approved_item = deps
        .store
        .find_approved_item(approved_item_external_id)
        .await?
        .ok_or_else(|| CorpusError::not_found("ApprovedItem", approved_item_external_id))?;

    let new = NewSectionItem {
        external_id: SectionItemExternalId::new(),
        section_id: section.id,
        approved_item_id: approved_item.id,
        rank,
    };

    let item = match deps.store.insert_section_item(new).await {
        Ok(item) => item,
        // Deleted between the lookup and the insert.
        Err(StoreError::ForeignKeyViolation(constraint)) => {
            return Err(if constraint.contains("section_id") {
                CorpusError::not_found("Section", section_external_id)
            } else {
                CorpusError::not_found("ApprovedItem", approved_item_external_id)
            });
        }
        Err(e) => return Err(e.into()),
    };

    info!(
        section = %section_external_id,
        approved_item = %approved_item_external_id,
        section_item = %item.external_id,
        "Added section item"
    );

    Ok(item)
}

/// Deactivate one membership. Manual removal is always attributed to MANUAL,
/// whatever created the section or retired the item before.
pub async fn remove_section_item(
    external_id: SectionItemExternalId,
    deps: &CorpusDeps,
) -> CorpusResult<SectionItem> {
    let item = deps
        .store
        .deactivate_section_item(external_id, ActivitySource::Manual)
        .await?
        .ok_or_else(|| CorpusError::not_found("SectionItem", external_id))?;

    info!(section_item = %external_id, "Removed section item");

    Ok(item)
}
