use crate::common::CorpusResult;
use crate::domains::domain_policy::hostname::normalize_hostname;
use crate::domains::domain_policy::models::{ExcludedDomain, PublisherDomain};
use crate::kernel::CorpusDeps;

/// `domain_name` must already be normalized (as stored on approved items).
pub async fn is_excluded(domain_name: &str, deps: &CorpusDeps) -> CorpusResult<bool> {
    Ok(deps.store.is_excluded(domain_name).await?)
}

/// `domain_name` must already be normalized (as stored on approved items).
pub async fn is_trusted(domain_name: &str, deps: &CorpusDeps) -> CorpusResult<bool> {
    Ok(deps.store.is_trusted(domain_name).await?)
}

pub async fn list_excluded_domains(deps: &CorpusDeps) -> CorpusResult<Vec<ExcludedDomain>> {
    Ok(deps.store.list_excluded_domains().await?)
}

/// Look up the publisher mapped to an operator-supplied hostname.
pub async fn find_publisher_domain(
    domain: &str,
    deps: &CorpusDeps,
) -> CorpusResult<Option<PublisherDomain>> {
    let domain_name = normalize_hostname(domain)?;
    Ok(deps.store.find_publisher_domain(&domain_name).await?)
}
