//! Postgres-backed store. Every method delegates to the SQL on the model types.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::common::{
    ActivitySource, ApprovedItemExternalId, ApprovedItemId, ScheduledItemExternalId, SectionId,
    SectionItemExternalId,
};
use crate::domains::approved_items::models::{
    ApprovedItem, ApprovedItemUpdate, NewApprovedItem, NewRejectedItem, RejectedItem,
};
use crate::domains::domain_policy::models::{ExcludedDomain, PublisherDomain, TrustedDomain};
use crate::domains::schedule_reviews::models::{NewScheduleReview, ScheduleReview};
use crate::domains::scheduled_items::models::{NewScheduledItem, ScheduledItem};
use crate::domains::sections::models::{
    CustomSectionUpdate, MlSectionGeneration, NewSection, NewSectionItem, Section, SectionItem,
};
use crate::kernel::traits::{
    BaseApprovedItemStore, BaseDomainPolicyStore, BaseReviewStore, BaseScheduleStore,
    BaseSectionStore, StoreResult,
};

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

#[derive(Clone)]
pub struct PgCorpusStore {
    pool: PgPool,
}

impl PgCorpusStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        MIGRATOR.run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl BaseApprovedItemStore for PgCorpusStore {
    async fn find_approved_item(
        &self,
        external_id: ApprovedItemExternalId,
    ) -> StoreResult<Option<ApprovedItem>> {
        ApprovedItem::find_by_external_id(external_id, &self.pool).await
    }

    async fn find_approved_items_by_ids(
        &self,
        ids: &[ApprovedItemId],
    ) -> StoreResult<Vec<ApprovedItem>> {
        ApprovedItem::find_by_ids(ids, &self.pool).await
    }

    async fn find_approved_item_by_url(&self, url: &str) -> StoreResult<Option<ApprovedItem>> {
        ApprovedItem::find_by_url(url, &self.pool).await
    }

    async fn find_rejected_item_by_url(&self, url: &str) -> StoreResult<Option<RejectedItem>> {
        RejectedItem::find_by_url(url, &self.pool).await
    }

    async fn insert_approved_item(&self, new: NewApprovedItem) -> StoreResult<ApprovedItem> {
        ApprovedItem::create(new, &self.pool).await
    }

    async fn update_approved_item(
        &self,
        external_id: ApprovedItemExternalId,
        update: ApprovedItemUpdate,
        updated_by: &str,
    ) -> StoreResult<Option<ApprovedItem>> {
        ApprovedItem::update(external_id, update, updated_by, &self.pool).await
    }

    async fn delete_approved_item(
        &self,
        external_id: ApprovedItemExternalId,
    ) -> StoreResult<Option<ApprovedItem>> {
        ApprovedItem::delete(external_id, &self.pool).await
    }

    async fn reject_approved_item(
        &self,
        external_id: ApprovedItemExternalId,
        rejected: NewRejectedItem,
    ) -> StoreResult<Option<RejectedItem>> {
        ApprovedItem::reject(external_id, rejected, &self.pool).await
    }

    async fn insert_rejected_item(&self, new: NewRejectedItem) -> StoreResult<RejectedItem> {
        RejectedItem::create(new, &self.pool).await
    }
}

#[async_trait]
impl BaseScheduleStore for PgCorpusStore {
    async fn find_scheduled_item(
        &self,
        external_id: ScheduledItemExternalId,
    ) -> StoreResult<Option<ScheduledItem>> {
        ScheduledItem::find_by_external_id(external_id, &self.pool).await
    }

    async fn find_scheduled_item_in_slot(
        &self,
        approved_item_id: ApprovedItemId,
        surface: &str,
        date: NaiveDate,
    ) -> StoreResult<Option<ScheduledItem>> {
        ScheduledItem::find_by_slot(approved_item_id, surface, date, &self.pool).await
    }

    async fn list_scheduled_items(
        &self,
        surface: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> StoreResult<Vec<ScheduledItem>> {
        ScheduledItem::find_for_surface(surface, start_date, end_date, &self.pool).await
    }

    async fn count_scheduled_for_item(
        &self,
        approved_item_id: ApprovedItemId,
    ) -> StoreResult<i64> {
        ScheduledItem::count_for_approved_item(approved_item_id, &self.pool).await
    }

    async fn domain_scheduled_before(
        &self,
        domain_name: &str,
        before: NaiveDate,
    ) -> StoreResult<bool> {
        ScheduledItem::exists_for_domain_before(domain_name, before, &self.pool).await
    }

    async fn insert_scheduled_item(&self, new: NewScheduledItem) -> StoreResult<ScheduledItem> {
        ScheduledItem::create(new, &self.pool).await
    }

    async fn delete_scheduled_item(
        &self,
        external_id: ScheduledItemExternalId,
    ) -> StoreResult<Option<ScheduledItem>> {
        ScheduledItem::delete(external_id, &self.pool).await
    }

    async fn replace_scheduled_item(
        &self,
        old_external_id: ScheduledItemExternalId,
        new: NewScheduledItem,
    ) -> StoreResult<Option<ScheduledItem>> {
        ScheduledItem::replace(old_external_id, new, &self.pool).await
    }
}

#[async_trait]
impl BaseReviewStore for PgCorpusStore {
    async fn find_review(
        &self,
        surface: &str,
        date: NaiveDate,
    ) -> StoreResult<Option<ScheduleReview>> {
        ScheduleReview::find(surface, date, &self.pool).await
    }

    async fn list_reviews(
        &self,
        surface: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> StoreResult<Vec<ScheduleReview>> {
        ScheduleReview::find_for_surface(surface, start_date, end_date, &self.pool).await
    }

    async fn insert_review(&self, new: NewScheduleReview) -> StoreResult<ScheduleReview> {
        ScheduleReview::create(new, &self.pool).await
    }
}

#[async_trait]
impl BaseSectionStore for PgCorpusStore {
    async fn find_section(&self, external_id: &str) -> StoreResult<Option<Section>> {
        Section::find_by_external_id(external_id, &self.pool).await
    }

    async fn list_sections(
        &self,
        surface: &str,
        include_inactive: bool,
    ) -> StoreResult<Vec<Section>> {
        Section::find_for_surface(surface, include_inactive, &self.pool).await
    }

    async fn insert_section(&self, new: NewSection) -> StoreResult<Section> {
        Section::create(new, &self.pool).await
    }

    async fn update_custom_section(
        &self,
        external_id: &str,
        update: CustomSectionUpdate,
    ) -> StoreResult<Option<Section>> {
        Section::update_custom(external_id, update, &self.pool).await
    }

    async fn apply_ml_generation(
        &self,
        generation: MlSectionGeneration,
    ) -> StoreResult<Option<(Section, u64)>> {
        Section::apply_ml_generation(generation, &self.pool).await
    }

    async fn deactivate_section(
        &self,
        external_id: &str,
        source: ActivitySource,
        actor: &str,
    ) -> StoreResult<Option<Section>> {
        Section::deactivate_with_items(external_id, source, actor, &self.pool).await
    }

    async fn set_section_disabled(
        &self,
        external_id: &str,
        disabled: bool,
        actor: &str,
    ) -> StoreResult<Option<Section>> {
        Section::set_disabled(external_id, disabled, actor, &self.pool).await
    }

    async fn find_section_item(
        &self,
        external_id: SectionItemExternalId,
    ) -> StoreResult<Option<SectionItem>> {
        SectionItem::find_by_external_id(external_id, &self.pool).await
    }

    async fn list_section_items(
        &self,
        section_id: SectionId,
        active_only: bool,
    ) -> StoreResult<Vec<SectionItem>> {
        SectionItem::find_for_section(section_id, active_only, &self.pool).await
    }

    async fn insert_section_item(&self, new: NewSectionItem) -> StoreResult<SectionItem> {
        SectionItem::create(new, &self.pool).await
    }

    async fn deactivate_section_item(
        &self,
        external_id: SectionItemExternalId,
        source: ActivitySource,
    ) -> StoreResult<Option<SectionItem>> {
        SectionItem::deactivate_by_external_id(external_id, source, &self.pool).await
    }
}

#[async_trait]
impl BaseDomainPolicyStore for PgCorpusStore {
    async fn is_excluded(&self, domain_name: &str) -> StoreResult<bool> {
        ExcludedDomain::exists(domain_name, &self.pool).await
    }

    async fn is_trusted(&self, domain_name: &str) -> StoreResult<bool> {
        TrustedDomain::exists(domain_name, &self.pool).await
    }

    async fn trust_domain(&self, domain_name: &str) -> StoreResult<bool> {
        TrustedDomain::create_if_missing(domain_name, &self.pool).await
    }

    async fn list_excluded_domains(&self) -> StoreResult<Vec<ExcludedDomain>> {
        ExcludedDomain::list(&self.pool).await
    }

    async fn insert_excluded_domain(
        &self,
        domain_name: &str,
        created_by: &str,
    ) -> StoreResult<ExcludedDomain> {
        ExcludedDomain::create(domain_name, created_by, &self.pool).await
    }

    async fn delete_excluded_domain(
        &self,
        domain_name: &str,
    ) -> StoreResult<Option<ExcludedDomain>> {
        ExcludedDomain::delete(domain_name, &self.pool).await
    }

    async fn find_publisher_domain(
        &self,
        domain_name: &str,
    ) -> StoreResult<Option<PublisherDomain>> {
        PublisherDomain::find(domain_name, &self.pool).await
    }

    async fn upsert_publisher_domain(
        &self,
        domain_name: &str,
        publisher: &str,
        actor: &str,
    ) -> StoreResult<PublisherDomain> {
        PublisherDomain::upsert(domain_name, publisher, actor, &self.pool).await
    }
}
