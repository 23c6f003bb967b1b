use chrono::NaiveDate;
use tracing::{debug, info};

use crate::common::{Actor, CorpusError, CorpusResult, StoreError};
use crate::domains::domain_policy::hostname::normalize_hostname;
use crate::domains::domain_policy::models::{ExcludedDomain, PublisherDomain};
use crate::kernel::CorpusDeps;

/// Mark `domain_name` trusted when a story on it is scheduled strictly before
/// `as_of`. Called after every successful scheduling write with the new
/// assignment's date. Returns whether the domain was newly trusted.
pub async fn promote_if_eligible(
    domain_name: &str,
    as_of: NaiveDate,
    deps: &CorpusDeps,
) -> CorpusResult<bool> {
    if !deps.store.domain_scheduled_before(domain_name, as_of).await? {
        debug!(domain = %domain_name, as_of = %as_of, "No earlier assignment; domain stays untrusted");
        return Ok(false);
    }

    let promoted = deps.store.trust_domain(domain_name).await?;
    if promoted {
        info!(domain = %domain_name, as_of = %as_of, "Domain promoted to trusted");
    }
    Ok(promoted)
}

/// Map a hostname to a publisher name.
///
/// The hostname is validated and normalized first. Re-mapping an existing
/// hostname keeps its creation audit columns and stamps `updated_by`.
pub async fn upsert_publisher_domain(
    domain: &str,
    publisher: &str,
    actor: &Actor,
    deps: &CorpusDeps,
) -> CorpusResult<PublisherDomain> {
    let domain_name = normalize_hostname(domain)?;
    let publisher = publisher.trim();
    if publisher.is_empty() {
        return Err(CorpusError::validation("Publisher name must not be empty"));
    }

    info!(domain = %domain_name, publisher = %publisher, actor = %actor, "Upserting publisher domain");

    Ok(deps
        .store
        .upsert_publisher_domain(&domain_name, publisher, actor.as_str())
        .await?)
}

pub async fn add_excluded_domain(
    domain: &str,
    actor: &Actor,
    deps: &CorpusDeps,
) -> CorpusResult<ExcludedDomain> {
    let domain_name = normalize_hostname(domain)?;

    info!(domain = %domain_name, actor = %actor, "Excluding domain");

    match deps
        .store
        .insert_excluded_domain(&domain_name, actor.as_str())
        .await
    {
        Ok(excluded) => Ok(excluded),
        Err(StoreError::UniqueViolation(_)) => Err(CorpusError::Conflict(format!(
            "{} is already on the excluded domains list",
            domain_name
        ))),
        Err(e) => Err(e.into()),
    }
}

pub async fn remove_excluded_domain(
    domain: &str,
    actor: &Actor,
    deps: &CorpusDeps,
) -> CorpusResult<ExcludedDomain> {
    let domain_name = normalize_hostname(domain)?;

    info!(domain = %domain_name, actor = %actor, "Removing domain exclusion");

    deps.store
        .delete_excluded_domain(&domain_name)
        .await?
        .ok_or_else(|| CorpusError::not_found("ExcludedDomain", &domain_name))
}
