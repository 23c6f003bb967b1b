use crate::common::{ApprovedItemExternalId, CorpusError, CorpusResult};
use crate::domains::approved_items::models::ApprovedItem;
use crate::kernel::CorpusDeps;

pub async fn get_approved_item(
    external_id: ApprovedItemExternalId,
    deps: &CorpusDeps,
) -> CorpusResult<ApprovedItem> {
    deps.store
        .find_approved_item(external_id)
        .await?
        .ok_or_else(|| CorpusError::not_found("ApprovedItem", external_id))
}

pub async fn find_approved_item_by_url(
    url: &str,
    deps: &CorpusDeps,
) -> CorpusResult<Option<ApprovedItem>> {
    Ok(deps.store.find_approved_item_by_url(url.trim()).await?)
}

/// The domain-trust signal curators see next to a story.
pub async fn has_trusted_domain(item: &ApprovedItem, deps: &CorpusDeps) -> CorpusResult<bool> {
    Ok(deps.store.is_trusted(&item.domain_name).await?)
}
