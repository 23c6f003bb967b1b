// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Business rules (slot conflicts, trust promotion, generation swaps) live in the
// domain actions that call these traits.
//
// Naming convention: Base* for trait names (e.g., BaseScheduleStore, BaseEventSink)

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::common::{
    ActivitySource, ApprovedItemExternalId, ApprovedItemId, ScheduledItemExternalId, SectionId,
    SectionItemExternalId, StoreError,
};
use crate::domains::approved_items::models::{
    ApprovedItem, ApprovedItemUpdate, NewApprovedItem, NewRejectedItem, RejectedItem,
};
use crate::domains::domain_policy::models::{ExcludedDomain, PublisherDomain};
use crate::domains::schedule_reviews::models::{NewScheduleReview, ScheduleReview};
use crate::domains::scheduled_items::models::{NewScheduledItem, ScheduledItem};
use crate::domains::sections::models::{
    CustomSectionUpdate, MlSectionGeneration, NewSection, NewSectionItem, Section, SectionItem,
};
use crate::kernel::events::CorpusEvent;

pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Content Item Repository
// =============================================================================

#[async_trait]
pub trait BaseApprovedItemStore: Send + Sync {
    async fn find_approved_item(
        &self,
        external_id: ApprovedItemExternalId,
    ) -> StoreResult<Option<ApprovedItem>>;

    async fn find_approved_items_by_ids(
        &self,
        ids: &[ApprovedItemId],
    ) -> StoreResult<Vec<ApprovedItem>>;

    async fn find_approved_item_by_url(&self, url: &str) -> StoreResult<Option<ApprovedItem>>;

    async fn find_rejected_item_by_url(&self, url: &str) -> StoreResult<Option<RejectedItem>>;

    /// Fails with a unique violation when the URL is already approved or rejected.
    async fn insert_approved_item(&self, new: NewApprovedItem) -> StoreResult<ApprovedItem>;

    async fn update_approved_item(
        &self,
        external_id: ApprovedItemExternalId,
        update: ApprovedItemUpdate,
        updated_by: &str,
    ) -> StoreResult<Option<ApprovedItem>>;

    /// Fails with a foreign key violation while scheduled items reference it.
    async fn delete_approved_item(
        &self,
        external_id: ApprovedItemExternalId,
    ) -> StoreResult<Option<ApprovedItem>>;

    /// Delete the approved row and insert the rejected one atomically.
    async fn reject_approved_item(
        &self,
        external_id: ApprovedItemExternalId,
        rejected: NewRejectedItem,
    ) -> StoreResult<Option<RejectedItem>>;

    async fn insert_rejected_item(&self, new: NewRejectedItem) -> StoreResult<RejectedItem>;
}

// =============================================================================
// Scheduling
// =============================================================================

#[async_trait]
pub trait BaseScheduleStore: Send + Sync {
    async fn find_scheduled_item(
        &self,
        external_id: ScheduledItemExternalId,
    ) -> StoreResult<Option<ScheduledItem>>;

    async fn find_scheduled_item_in_slot(
        &self,
        approved_item_id: ApprovedItemId,
        surface: &str,
        date: NaiveDate,
    ) -> StoreResult<Option<ScheduledItem>>;

    /// Ordered by date, then `updated_at` ascending.
    async fn list_scheduled_items(
        &self,
        surface: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> StoreResult<Vec<ScheduledItem>>;

    async fn count_scheduled_for_item(&self, approved_item_id: ApprovedItemId)
        -> StoreResult<i64>;

    /// Whether a story on `domain_name` is scheduled strictly before `before`.
    async fn domain_scheduled_before(
        &self,
        domain_name: &str,
        before: NaiveDate,
    ) -> StoreResult<bool>;

    /// Fails with `UniqueViolation(SLOT_UNIQUE_CONSTRAINT)` when the slot is taken.
    async fn insert_scheduled_item(&self, new: NewScheduledItem) -> StoreResult<ScheduledItem>;

    async fn delete_scheduled_item(
        &self,
        external_id: ScheduledItemExternalId,
    ) -> StoreResult<Option<ScheduledItem>>;

    /// Delete + insert in one transaction.
    async fn replace_scheduled_item(
        &self,
        old_external_id: ScheduledItemExternalId,
        new: NewScheduledItem,
    ) -> StoreResult<Option<ScheduledItem>>;
}

// =============================================================================
// Schedule Reviews
// =============================================================================

#[async_trait]
pub trait BaseReviewStore: Send + Sync {
    async fn find_review(&self, surface: &str, date: NaiveDate)
        -> StoreResult<Option<ScheduleReview>>;

    async fn list_reviews(
        &self,
        surface: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> StoreResult<Vec<ScheduleReview>>;

    async fn insert_review(&self, new: NewScheduleReview) -> StoreResult<ScheduleReview>;
}

// =============================================================================
// Sections
// =============================================================================

#[async_trait]
pub trait BaseSectionStore: Send + Sync {
    async fn find_section(&self, external_id: &str) -> StoreResult<Option<Section>>;

    async fn list_sections(
        &self,
        surface: &str,
        include_inactive: bool,
    ) -> StoreResult<Vec<Section>>;

    async fn insert_section(&self, new: NewSection) -> StoreResult<Section>;

    /// Only MANUAL sections are updated; `None` otherwise.
    async fn update_custom_section(
        &self,
        external_id: &str,
        update: CustomSectionUpdate,
    ) -> StoreResult<Option<Section>>;

    /// Upsert an ML section and retire its active items in one transaction.
    /// `None` when the external id belongs to a MANUAL section.
    async fn apply_ml_generation(
        &self,
        generation: MlSectionGeneration,
    ) -> StoreResult<Option<(Section, u64)>>;

    /// Mark a section inactive and cascade to its active items.
    async fn deactivate_section(
        &self,
        external_id: &str,
        source: ActivitySource,
        actor: &str,
    ) -> StoreResult<Option<Section>>;

    async fn set_section_disabled(
        &self,
        external_id: &str,
        disabled: bool,
        actor: &str,
    ) -> StoreResult<Option<Section>>;

    async fn find_section_item(
        &self,
        external_id: SectionItemExternalId,
    ) -> StoreResult<Option<SectionItem>>;

    /// Ordered by rank (nulls last), then creation time.
    async fn list_section_items(
        &self,
        section_id: SectionId,
        active_only: bool,
    ) -> StoreResult<Vec<SectionItem>>;

    async fn insert_section_item(&self, new: NewSectionItem) -> StoreResult<SectionItem>;

    async fn deactivate_section_item(
        &self,
        external_id: SectionItemExternalId,
        source: ActivitySource,
    ) -> StoreResult<Option<SectionItem>>;
}

// =============================================================================
// Domain Policy
// =============================================================================

#[async_trait]
pub trait BaseDomainPolicyStore: Send + Sync {
    async fn is_excluded(&self, domain_name: &str) -> StoreResult<bool>;

    async fn is_trusted(&self, domain_name: &str) -> StoreResult<bool>;

    /// Returns whether the domain was newly trusted.
    async fn trust_domain(&self, domain_name: &str) -> StoreResult<bool>;

    async fn list_excluded_domains(&self) -> StoreResult<Vec<ExcludedDomain>>;

    async fn insert_excluded_domain(
        &self,
        domain_name: &str,
        created_by: &str,
    ) -> StoreResult<ExcludedDomain>;

    async fn delete_excluded_domain(&self, domain_name: &str)
        -> StoreResult<Option<ExcludedDomain>>;

    async fn find_publisher_domain(&self, domain_name: &str)
        -> StoreResult<Option<PublisherDomain>>;

    async fn upsert_publisher_domain(
        &self,
        domain_name: &str,
        publisher: &str,
        actor: &str,
    ) -> StoreResult<PublisherDomain>;
}

/// Everything the corpus actions need from persistence.
pub trait BaseCorpusStore:
    BaseApprovedItemStore + BaseScheduleStore + BaseReviewStore + BaseSectionStore + BaseDomainPolicyStore
{
}

impl<T> BaseCorpusStore for T where
    T: BaseApprovedItemStore
        + BaseScheduleStore
        + BaseReviewStore
        + BaseSectionStore
        + BaseDomainPolicyStore
{
}

// =============================================================================
// Event Sink (Infrastructure - fire-and-forget notifications)
// =============================================================================

#[async_trait]
pub trait BaseEventSink: Send + Sync {
    /// Deliver one event. Called only after the write it describes committed.
    async fn emit(&self, event: &CorpusEvent) -> anyhow::Result<()>;
}
