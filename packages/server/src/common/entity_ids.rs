//! Typed ids for every corpus entity.
//!
//! Internal primary keys use `V7`; ids exposed to callers use `V4`.
//! Sections are the exception: their external id is free text because the
//! machine-learning pipeline names its own sections.

pub use super::id::{Id, V4, V7};

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for approved corpus items.
pub struct ApprovedItemEntity;

/// Marker type for rejected corpus items.
pub struct RejectedItemEntity;

/// Marker type for scheduled (surface, date) assignments.
pub struct ScheduledItemEntity;

/// Marker type for schedule reviews.
pub struct ScheduleReviewEntity;

/// Marker type for sections.
pub struct SectionEntity;

/// Marker type for section memberships.
pub struct SectionItemEntity;

/// Marker type for emitted events.
pub struct CorpusEventEntity;

// ============================================================================
// Type aliases
// ============================================================================

pub type ApprovedItemId = Id<ApprovedItemEntity>;
pub type ApprovedItemExternalId = Id<ApprovedItemEntity, V4>;

pub type RejectedItemId = Id<RejectedItemEntity>;
pub type RejectedItemExternalId = Id<RejectedItemEntity, V4>;

pub type ScheduledItemId = Id<ScheduledItemEntity>;
pub type ScheduledItemExternalId = Id<ScheduledItemEntity, V4>;

pub type ScheduleReviewId = Id<ScheduleReviewEntity>;

pub type SectionId = Id<SectionEntity>;

pub type SectionItemId = Id<SectionItemEntity>;
pub type SectionItemExternalId = Id<SectionItemEntity, V4>;

/// Fresh correlation id carried by every emitted event.
pub type EventId = Id<CorpusEventEntity, V4>;
