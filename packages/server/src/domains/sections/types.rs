use serde::{Deserialize, Serialize};

use crate::common::{CorpusError, CorpusResult};

use super::models::{Section, SectionItem};
use super::status::SectionStatus;

/// IAB taxonomy versions custom sections may be tagged with.
pub const IAB_TAXONOMY_VERSIONS: &[&str] = &["IAB-3.0"];

/// IAB content-taxonomy tagging of a custom section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IabMetadata {
    pub taxonomy: String,
    pub categories: Vec<String>,
}

impl IabMetadata {
    /// Validates the taxonomy version and returns a copy with trimmed,
    /// de-duplicated category codes.
    pub fn validated(&self) -> CorpusResult<Self> {
        let taxonomy = self.taxonomy.trim();
        if !IAB_TAXONOMY_VERSIONS.contains(&taxonomy) {
            return Err(CorpusError::validation(format!(
                "Unsupported IAB taxonomy version: \"{}\"",
                self.taxonomy
            )));
        }

        let mut categories: Vec<String> = Vec::new();
        for code in self.categories.iter().map(|c| c.trim()) {
            if !code.is_empty() && !categories.iter().any(|c| c == code) {
                categories.push(code.to_string());
            }
        }

        if categories.is_empty() {
            return Err(CorpusError::validation(
                "IAB metadata requires at least one category code",
            ));
        }

        Ok(Self {
            taxonomy: taxonomy.to_string(),
            categories,
        })
    }
}

/// A section with its status derived at read time.
#[derive(Debug, Clone, Serialize)]
pub struct SectionWithStatus {
    #[serde(flatten)]
    pub section: Section,
    pub status: SectionStatus,
}

/// A section, its status and its active items in display order.
#[derive(Debug, Clone, Serialize)]
pub struct SectionDetail {
    #[serde(flatten)]
    pub section: Section,
    pub status: SectionStatus,
    pub items: Vec<SectionItem>,
}
