use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::types::{
    ApprovedItemGrade, Author, CorpusItemSource, CorpusLanguage, CuratedStatus, Topic,
};

/// Caller input for a new approved item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovedItemInput {
    pub prospect_id: Option<String>,
    pub url: String,
    pub title: String,
    pub excerpt: String,
    pub image_url: Option<String>,
    /// Falls back to the publisher mapped to the URL's domain when blank.
    pub publisher: Option<String>,
    #[serde(default)]
    pub authors: Vec<Author>,
    pub status: CuratedStatus,
    pub language: CorpusLanguage,
    pub topic: Option<Topic>,
    pub source: CorpusItemSource,
    pub grade: Option<ApprovedItemGrade>,
    #[serde(default)]
    pub is_collection: bool,
    #[serde(default)]
    pub is_syndicated: bool,
    #[serde(default)]
    pub is_time_sensitive: bool,
    pub date_published: Option<NaiveDate>,
}

/// Caller input for a story rejected without ever being approved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectedItemInput {
    pub prospect_id: Option<String>,
    pub url: String,
    pub title: Option<String>,
    pub topic: Option<Topic>,
    pub language: Option<CorpusLanguage>,
    pub publisher: Option<String>,
    /// Comma-separated rejection reason codes.
    pub reason: String,
}
