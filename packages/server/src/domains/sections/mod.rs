//! Section lifecycle engine - ranked groupings of stories per surface
//!
//! Two kinds of section share one table:
//! - ML sections, fully replaced by each pipeline generation (generation swap)
//! - custom (MANUAL) sections, curated by hand inside a start/end window
//!
//! Status (DISABLED / SCHEDULED / LIVE / EXPIRED) is derived at read time.

pub mod actions;
pub mod inputs;
pub mod models;
pub mod status;
pub mod types;

pub use inputs::{CustomSectionInput, CustomSectionUpdateInput, MlSectionInput};
pub use models::{Section, SectionItem};
pub use status::{derive_status, SectionStatus};
pub use types::{IabMetadata, SectionDetail, SectionWithStatus, IAB_TAXONOMY_VERSIONS};
