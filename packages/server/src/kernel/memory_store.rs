//! In-memory store with the same uniqueness and foreign-key rules as the
//! Postgres schema. All tables sit behind one mutex, so every method is a
//! single atomic unit, like a transaction.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use crate::common::{
    ActivitySource, ApprovedItemExternalId, ApprovedItemId, RejectedItemId,
    ScheduleReviewId, ScheduledItemExternalId, ScheduledItemId, SectionId, SectionItemExternalId,
    SectionItemId, StoreError,
};
use crate::domains::approved_items::models::{
    ApprovedItem, ApprovedItemUpdate, NewApprovedItem, NewRejectedItem, RejectedItem,
    URL_UNIQUE_CONSTRAINT,
};
use crate::domains::domain_policy::models::{ExcludedDomain, PublisherDomain};
use crate::domains::schedule_reviews::models::{NewScheduleReview, ScheduleReview};
use crate::domains::scheduled_items::models::{
    NewScheduledItem, ScheduledItem, SLOT_UNIQUE_CONSTRAINT,
};
use crate::domains::sections::models::{
    CustomSectionUpdate, MlSectionGeneration, NewSection, NewSectionItem, Section, SectionItem,
};
use crate::kernel::traits::{
    BaseApprovedItemStore, BaseDomainPolicyStore, BaseReviewStore, BaseScheduleStore,
    BaseSectionStore, StoreResult,
};

#[derive(Default)]
struct Tables {
    approved_items: Vec<ApprovedItem>,
    rejected_items: Vec<RejectedItem>,
    scheduled_items: Vec<ScheduledItem>,
    schedule_reviews: Vec<ScheduleReview>,
    sections: Vec<Section>,
    section_items: Vec<SectionItem>,
    trusted_domains: BTreeMap<String, DateTime<Utc>>,
    excluded_domains: BTreeMap<String, ExcludedDomain>,
    publisher_domains: BTreeMap<String, PublisherDomain>,
}

fn unique(constraint: &str) -> StoreError {
    StoreError::UniqueViolation(constraint.to_string())
}

fn foreign_key(constraint: &str) -> StoreError {
    StoreError::ForeignKeyViolation(constraint.to_string())
}

impl Tables {
    /// Mirrors the `corpus_urls` claim: one URL, at most one item of either kind.
    fn check_url_free(&self, url: &str) -> StoreResult<()> {
        if self.approved_items.iter().any(|i| i.url == url)
            || self.rejected_items.iter().any(|i| i.url == url)
        {
            return Err(unique(URL_UNIQUE_CONSTRAINT));
        }
        Ok(())
    }

    fn insert_rejected(&mut self, new: NewRejectedItem, now: DateTime<Utc>) -> RejectedItem {
        let item = new.into_item(RejectedItemId::new(), now);
        self.rejected_items.push(item.clone());
        item
    }

    fn insert_scheduled(
        &mut self,
        new: NewScheduledItem,
        now: DateTime<Utc>,
    ) -> StoreResult<ScheduledItem> {
        if !self
            .approved_items
            .iter()
            .any(|i| i.id == new.approved_item_id)
        {
            return Err(foreign_key("scheduled_items_approved_item_id_fkey"));
        }
        if self.scheduled_items.iter().any(|s| {
            s.occupies(
                new.approved_item_id,
                &new.scheduled_surface_guid,
                new.scheduled_date,
            )
        }) {
            return Err(unique(SLOT_UNIQUE_CONSTRAINT));
        }
        let item = new.into_item(ScheduledItemId::new(), now);
        self.scheduled_items.push(item.clone());
        Ok(item)
    }

    fn remove_approved(&mut self, external_id: ApprovedItemExternalId) -> StoreResult<Option<ApprovedItem>> {
        let Some(pos) = self
            .approved_items
            .iter()
            .position(|i| i.external_id == external_id)
        else {
            return Ok(None);
        };
        let id = self.approved_items[pos].id;
        if self.scheduled_items.iter().any(|s| s.approved_item_id == id) {
            return Err(foreign_key("scheduled_items_approved_item_id_fkey"));
        }
        self.section_items.retain(|si| si.approved_item_id != id);
        Ok(Some(self.approved_items.remove(pos)))
    }

    /// Deactivate the still-active items of a section; inactive rows are not touched.
    fn retire_items(&mut self, section_id: SectionId, source: ActivitySource, now: DateTime<Utc>) -> u64 {
        let mut retired = 0;
        for item in self
            .section_items
            .iter_mut()
            .filter(|i| i.section_id == section_id && i.active)
        {
            item.deactivate(source, now);
            retired += 1;
        }
        retired
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Every section item of a section, active or not. Test inspection only.
    pub fn section_items_snapshot(&self, section_id: SectionId) -> Vec<SectionItem> {
        self.lock()
            .section_items
            .iter()
            .filter(|i| i.section_id == section_id)
            .cloned()
            .collect()
    }

    pub fn scheduled_item_count(&self) -> usize {
        self.lock().scheduled_items.len()
    }
}

#[async_trait]
impl BaseApprovedItemStore for MemoryStore {
    async fn find_approved_item(
        &self,
        external_id: ApprovedItemExternalId,
    ) -> StoreResult<Option<ApprovedItem>> {
        Ok(self
            .lock()
            .approved_items
            .iter()
            .find(|i| i.external_id == external_id)
            .cloned())
    }

    async fn find_approved_items_by_ids(
        &self,
        ids: &[ApprovedItemId],
    ) -> StoreResult<Vec<ApprovedItem>> {
        Ok(self
            .lock()
            .approved_items
            .iter()
            .filter(|i| ids.contains(&i.id))
            .cloned()
            .collect())
    }

    async fn find_approved_item_by_url(&self, url: &str) -> StoreResult<Option<ApprovedItem>> {
        Ok(self
            .lock()
            .approved_items
            .iter()
            .find(|i| i.url == url)
            .cloned())
    }

    async fn find_rejected_item_by_url(&self, url: &str) -> StoreResult<Option<RejectedItem>> {
        Ok(self
            .lock()
            .rejected_items
            .iter()
            .find(|i| i.url == url)
            .cloned())
    }

    async fn insert_approved_item(&self, new: NewApprovedItem) -> StoreResult<ApprovedItem> {
        let mut tables = self.lock();
        tables.check_url_free(&new.url)?;
        let item = new.into_item(ApprovedItemId::new(), Utc::now());
        tables.approved_items.push(item.clone());
        Ok(item)
    }

    async fn update_approved_item(
        &self,
        external_id: ApprovedItemExternalId,
        update: ApprovedItemUpdate,
        updated_by: &str,
    ) -> StoreResult<Option<ApprovedItem>> {
        let mut tables = self.lock();
        let Some(item) = tables
            .approved_items
            .iter_mut()
            .find(|i| i.external_id == external_id)
        else {
            return Ok(None);
        };
        item.apply_update(update, updated_by, Utc::now());
        Ok(Some(item.clone()))
    }

    async fn delete_approved_item(
        &self,
        external_id: ApprovedItemExternalId,
    ) -> StoreResult<Option<ApprovedItem>> {
        self.lock().remove_approved(external_id)
    }

    async fn reject_approved_item(
        &self,
        external_id: ApprovedItemExternalId,
        rejected: NewRejectedItem,
    ) -> StoreResult<Option<RejectedItem>> {
        let mut tables = self.lock();
        if tables.remove_approved(external_id)?.is_none() {
            return Ok(None);
        }
        Ok(Some(tables.insert_rejected(rejected, Utc::now())))
    }

    async fn insert_rejected_item(&self, new: NewRejectedItem) -> StoreResult<RejectedItem> {
        let mut tables = self.lock();
        tables.check_url_free(&new.url)?;
        Ok(tables.insert_rejected(new, Utc::now()))
    }
}

#[async_trait]
impl BaseScheduleStore for MemoryStore {
    async fn find_scheduled_item(
        &self,
        external_id: ScheduledItemExternalId,
    ) -> StoreResult<Option<ScheduledItem>> {
        Ok(self
            .lock()
            .scheduled_items
            .iter()
            .find(|s| s.external_id == external_id)
            .cloned())
    }

    async fn find_scheduled_item_in_slot(
        &self,
        approved_item_id: ApprovedItemId,
        surface: &str,
        date: NaiveDate,
    ) -> StoreResult<Option<ScheduledItem>> {
        Ok(self
            .lock()
            .scheduled_items
            .iter()
            .find(|s| s.occupies(approved_item_id, surface, date))
            .cloned())
    }

    async fn list_scheduled_items(
        &self,
        surface: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> StoreResult<Vec<ScheduledItem>> {
        let mut items: Vec<ScheduledItem> = self
            .lock()
            .scheduled_items
            .iter()
            .filter(|s| {
                s.scheduled_surface_guid == surface
                    && s.scheduled_date >= start_date
                    && s.scheduled_date <= end_date
            })
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            a.scheduled_date
                .cmp(&b.scheduled_date)
                .then(a.updated_at.cmp(&b.updated_at))
        });
        Ok(items)
    }

    async fn count_scheduled_for_item(
        &self,
        approved_item_id: ApprovedItemId,
    ) -> StoreResult<i64> {
        let count = self
            .lock()
            .scheduled_items
            .iter()
            .filter(|s| s.approved_item_id == approved_item_id)
            .count();
        Ok(count as i64)
    }

    async fn domain_scheduled_before(
        &self,
        domain_name: &str,
        before: NaiveDate,
    ) -> StoreResult<bool> {
        let tables = self.lock();
        let exists = tables
            .scheduled_items
            .iter()
            .filter(|s| s.scheduled_date < before)
            .any(|s| {
                tables
                    .approved_items
                    .iter()
                    .any(|i| i.id == s.approved_item_id && i.domain_name == domain_name)
            });
        Ok(exists)
    }

    async fn insert_scheduled_item(&self, new: NewScheduledItem) -> StoreResult<ScheduledItem> {
        self.lock().insert_scheduled(new, Utc::now())
    }

    async fn delete_scheduled_item(
        &self,
        external_id: ScheduledItemExternalId,
    ) -> StoreResult<Option<ScheduledItem>> {
        let mut tables = self.lock();
        let removed = tables
            .scheduled_items
            .iter()
            .position(|s| s.external_id == external_id)
            .map(|pos| tables.scheduled_items.remove(pos));
        Ok(removed)
    }

    async fn replace_scheduled_item(
        &self,
        old_external_id: ScheduledItemExternalId,
        new: NewScheduledItem,
    ) -> StoreResult<Option<ScheduledItem>> {
        let mut tables = self.lock();
        let Some(pos) = tables
            .scheduled_items
            .iter()
            .position(|s| s.external_id == old_external_id)
        else {
            return Ok(None);
        };

        // Roll back the delete if the insert is rejected.
        let old = tables.scheduled_items.remove(pos);
        match tables.insert_scheduled(new, Utc::now()) {
            Ok(item) => Ok(Some(item)),
            Err(e) => {
                tables.scheduled_items.insert(pos, old);
                Err(e)
            }
        }
    }
}

#[async_trait]
impl BaseReviewStore for MemoryStore {
    async fn find_review(
        &self,
        surface: &str,
        date: NaiveDate,
    ) -> StoreResult<Option<ScheduleReview>> {
        Ok(self
            .lock()
            .schedule_reviews
            .iter()
            .find(|r| r.scheduled_surface_guid == surface && r.scheduled_date == date)
            .cloned())
    }

    async fn list_reviews(
        &self,
        surface: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> StoreResult<Vec<ScheduleReview>> {
        let mut reviews: Vec<ScheduleReview> = self
            .lock()
            .schedule_reviews
            .iter()
            .filter(|r| {
                r.scheduled_surface_guid == surface
                    && r.scheduled_date >= start_date
                    && r.scheduled_date <= end_date
            })
            .cloned()
            .collect();
        reviews.sort_by_key(|r| r.scheduled_date);
        Ok(reviews)
    }

    async fn insert_review(&self, new: NewScheduleReview) -> StoreResult<ScheduleReview> {
        let mut tables = self.lock();
        if tables.schedule_reviews.iter().any(|r| {
            r.scheduled_surface_guid == new.scheduled_surface_guid
                && r.scheduled_date == new.scheduled_date
        }) {
            return Err(unique("schedule_reviews_slot_key"));
        }
        let review = new.into_review(ScheduleReviewId::new(), Utc::now());
        tables.schedule_reviews.push(review.clone());
        Ok(review)
    }
}

#[async_trait]
impl BaseSectionStore for MemoryStore {
    async fn find_section(&self, external_id: &str) -> StoreResult<Option<Section>> {
        Ok(self
            .lock()
            .sections
            .iter()
            .find(|s| s.external_id == external_id)
            .cloned())
    }

    async fn list_sections(
        &self,
        surface: &str,
        include_inactive: bool,
    ) -> StoreResult<Vec<Section>> {
        let mut sections: Vec<Section> = self
            .lock()
            .sections
            .iter()
            .filter(|s| s.scheduled_surface_guid == surface && (include_inactive || s.active))
            .cloned()
            .collect();
        sections.sort_by(|a, b| {
            let by_sort = match (a.sort, b.sort) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            };
            by_sort.then(a.created_at.cmp(&b.created_at))
        });
        Ok(sections)
    }

    async fn insert_section(&self, new: NewSection) -> StoreResult<Section> {
        let mut tables = self.lock();
        if tables.sections.iter().any(|s| s.external_id == new.external_id) {
            return Err(unique("sections_external_id_key"));
        }
        let section = Section::from_new(new, SectionId::new(), Utc::now());
        tables.sections.push(section.clone());
        Ok(section)
    }

    async fn update_custom_section(
        &self,
        external_id: &str,
        update: CustomSectionUpdate,
    ) -> StoreResult<Option<Section>> {
        let mut tables = self.lock();
        let now = Utc::now();
        let Some(section) = tables
            .sections
            .iter_mut()
            .find(|s| s.external_id == external_id && s.is_custom())
        else {
            return Ok(None);
        };
        let deactivated = section.apply_custom_update(update, now);
        let section = section.clone();
        if deactivated {
            tables.retire_items(section.id, ActivitySource::Manual, now);
        }
        Ok(Some(section))
    }

    async fn apply_ml_generation(
        &self,
        generation: MlSectionGeneration,
    ) -> StoreResult<Option<(Section, u64)>> {
        let mut tables = self.lock();
        let now = Utc::now();

        let section = match tables
            .sections
            .iter_mut()
            .find(|s| s.external_id == generation.external_id)
        {
            Some(existing) if existing.is_custom() => return Ok(None),
            Some(existing) => {
                existing.apply_generation(generation, now);
                existing.clone()
            }
            None => {
                let created = Section::from_generation(generation, SectionId::new(), now);
                tables.sections.push(created.clone());
                created
            }
        };

        let retired = tables.retire_items(section.id, ActivitySource::Ml, now);
        Ok(Some((section, retired)))
    }

    async fn deactivate_section(
        &self,
        external_id: &str,
        source: ActivitySource,
        actor: &str,
    ) -> StoreResult<Option<Section>> {
        let mut tables = self.lock();
        let now = Utc::now();
        let Some(section) = tables
            .sections
            .iter_mut()
            .find(|s| s.external_id == external_id)
        else {
            return Ok(None);
        };
        section.active = false;
        section.deactivated_at.get_or_insert(now);
        section.deactivate_source = Some(source);
        section.updated_at = now;
        section.updated_by = Some(actor.to_string());
        let section = section.clone();

        tables.retire_items(section.id, source, now);
        Ok(Some(section))
    }

    async fn set_section_disabled(
        &self,
        external_id: &str,
        disabled: bool,
        actor: &str,
    ) -> StoreResult<Option<Section>> {
        let mut tables = self.lock();
        let Some(section) = tables
            .sections
            .iter_mut()
            .find(|s| s.external_id == external_id)
        else {
            return Ok(None);
        };
        section.disabled = disabled;
        section.updated_at = Utc::now();
        section.updated_by = Some(actor.to_string());
        Ok(Some(section.clone()))
    }

    async fn find_section_item(
        &self,
        external_id: SectionItemExternalId,
    ) -> StoreResult<Option<SectionItem>> {
        Ok(self
            .lock()
            .section_items
            .iter()
            .find(|i| i.external_id == external_id)
            .cloned())
    }

    async fn list_section_items(
        &self,
        section_id: SectionId,
        active_only: bool,
    ) -> StoreResult<Vec<SectionItem>> {
        let mut items: Vec<SectionItem> = self
            .lock()
            .section_items
            .iter()
            .filter(|i| i.section_id == section_id && (!active_only || i.active))
            .cloned()
            .collect();
        items.sort_by(SectionItem::display_order);
        Ok(items)
    }

    async fn insert_section_item(&self, new: NewSectionItem) -> StoreResult<SectionItem> {
        let mut tables = self.lock();
        if !tables.sections.iter().any(|s| s.id == new.section_id) {
            return Err(foreign_key("section_items_section_id_fkey"));
        }
        if !tables
            .approved_items
            .iter()
            .any(|i| i.id == new.approved_item_id)
        {
            return Err(foreign_key("section_items_approved_item_id_fkey"));
        }
        let item = new.into_item(SectionItemId::new(), Utc::now());
        tables.section_items.push(item.clone());
        Ok(item)
    }

    async fn deactivate_section_item(
        &self,
        external_id: SectionItemExternalId,
        source: ActivitySource,
    ) -> StoreResult<Option<SectionItem>> {
        let mut tables = self.lock();
        let Some(item) = tables
            .section_items
            .iter_mut()
            .find(|i| i.external_id == external_id)
        else {
            return Ok(None);
        };
        item.deactivate(source, Utc::now());
        Ok(Some(item.clone()))
    }
}

#[async_trait]
impl BaseDomainPolicyStore for MemoryStore {
    async fn is_excluded(&self, domain_name: &str) -> StoreResult<bool> {
        Ok(self.lock().excluded_domains.contains_key(domain_name))
    }

    async fn is_trusted(&self, domain_name: &str) -> StoreResult<bool> {
        Ok(self.lock().trusted_domains.contains_key(domain_name))
    }

    async fn trust_domain(&self, domain_name: &str) -> StoreResult<bool> {
        let mut tables = self.lock();
        if tables.trusted_domains.contains_key(domain_name) {
            return Ok(false);
        }
        tables
            .trusted_domains
            .insert(domain_name.to_string(), Utc::now());
        Ok(true)
    }

    async fn list_excluded_domains(&self) -> StoreResult<Vec<ExcludedDomain>> {
        Ok(self.lock().excluded_domains.values().cloned().collect())
    }

    async fn insert_excluded_domain(
        &self,
        domain_name: &str,
        created_by: &str,
    ) -> StoreResult<ExcludedDomain> {
        let mut tables = self.lock();
        if tables.excluded_domains.contains_key(domain_name) {
            return Err(unique("excluded_domains_pkey"));
        }
        let domain = ExcludedDomain {
            domain_name: domain_name.to_string(),
            created_at: Utc::now(),
            created_by: created_by.to_string(),
        };
        tables
            .excluded_domains
            .insert(domain_name.to_string(), domain.clone());
        Ok(domain)
    }

    async fn delete_excluded_domain(
        &self,
        domain_name: &str,
    ) -> StoreResult<Option<ExcludedDomain>> {
        Ok(self.lock().excluded_domains.remove(domain_name))
    }

    async fn find_publisher_domain(
        &self,
        domain_name: &str,
    ) -> StoreResult<Option<PublisherDomain>> {
        Ok(self.lock().publisher_domains.get(domain_name).cloned())
    }

    async fn upsert_publisher_domain(
        &self,
        domain_name: &str,
        publisher: &str,
        actor: &str,
    ) -> StoreResult<PublisherDomain> {
        let mut tables = self.lock();
        let now = Utc::now();
        let mapping = tables
            .publisher_domains
            .entry(domain_name.to_string())
            .and_modify(|m| m.remap(publisher.to_string(), actor, now))
            .or_insert_with(|| {
                PublisherDomain::new(domain_name.to_string(), publisher.to_string(), actor, now)
            });
        Ok(mapping.clone())
    }
}
