use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::common::ActivitySource;

use super::types::IabMetadata;

/// One generation of an ML section as delivered by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MlSectionInput {
    pub external_id: String,
    pub title: String,
    pub scheduled_surface_guid: String,
    pub sort: Option<i32>,
    pub active: bool,
}

/// A curator-built section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomSectionInput {
    pub title: String,
    pub description: String,
    pub hero_title: Option<String>,
    pub hero_description: Option<String>,
    pub scheduled_surface_guid: String,
    pub iab: Option<IabMetadata>,
    pub sort: Option<i32>,
    #[serde(default = "default_active")]
    pub active: bool,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    /// Must be MANUAL; ML sections go through the generation path.
    pub create_source: ActivitySource,
}

/// Replacement values for a custom section. The surface cannot change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomSectionUpdateInput {
    pub title: String,
    pub description: String,
    pub hero_title: Option<String>,
    pub hero_description: Option<String>,
    pub iab: Option<IabMetadata>,
    pub sort: Option<i32>,
    #[serde(default = "default_active")]
    pub active: bool,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub create_source: ActivitySource,
}

fn default_active() -> bool {
    true
}
