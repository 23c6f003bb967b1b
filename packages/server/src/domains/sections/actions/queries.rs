use chrono::Utc;

use crate::common::{CorpusError, CorpusResult};
use crate::domains::sections::types::{SectionDetail, SectionWithStatus};
use crate::kernel::CorpusDeps;

pub async fn get_section(external_id: &str, deps: &CorpusDeps) -> CorpusResult<SectionDetail> {
    let section = deps
        .store
        .find_section(external_id)
        .await?
        .ok_or_else(|| CorpusError::not_found("Section", external_id))?;

    let items = deps.store.list_section_items(section.id, true).await?;
    let status = section.status(Utc::now());

    Ok(SectionDetail {
        section,
        status,
        items,
    })
}

pub async fn list_sections(
    surface_guid: &str,
    include_inactive: bool,
    deps: &CorpusDeps,
) -> CorpusResult<Vec<SectionWithStatus>> {
    let surface = deps.surfaces.require(surface_guid)?;
    let now = Utc::now();

    let sections = deps
        .store
        .list_sections(surface.guid, include_inactive)
        .await?
        .into_iter()
        .map(|section| SectionWithStatus {
            status: section.status(now),
            section,
        })
        .collect();

    Ok(sections)
}
