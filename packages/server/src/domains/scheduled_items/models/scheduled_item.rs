use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};

use crate::common::{
    ActivitySource, ApprovedItemId, ScheduledItemExternalId, ScheduledItemId, StoreError,
};

/// Name of the unique index guarding one assignment per slot.
pub const SLOT_UNIQUE_CONSTRAINT: &str = "scheduled_items_slot_key";

/// The binding of one approved item to one (surface, date) slot.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ScheduledItem {
    pub id: ScheduledItemId,
    pub external_id: ScheduledItemExternalId,
    pub approved_item_id: ApprovedItemId,
    pub scheduled_surface_guid: String,
    pub scheduled_date: NaiveDate,
    pub source: ActivitySource,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewScheduledItem {
    pub external_id: ScheduledItemExternalId,
    pub approved_item_id: ApprovedItemId,
    pub scheduled_surface_guid: String,
    pub scheduled_date: NaiveDate,
    pub source: ActivitySource,
    pub created_by: String,
}

impl NewScheduledItem {
    pub fn into_item(self, id: ScheduledItemId, now: DateTime<Utc>) -> ScheduledItem {
        ScheduledItem {
            id,
            external_id: self.external_id,
            approved_item_id: self.approved_item_id,
            scheduled_surface_guid: self.scheduled_surface_guid,
            scheduled_date: self.scheduled_date,
            source: self.source,
            created_at: now,
            created_by: self.created_by,
            updated_at: now,
            updated_by: None,
        }
    }
}

impl ScheduledItem {
    /// Whether this assignment occupies the given slot.
    pub fn occupies(&self, approved_item_id: ApprovedItemId, surface: &str, date: NaiveDate) -> bool {
        self.approved_item_id == approved_item_id
            && self.scheduled_surface_guid == surface
            && self.scheduled_date == date
    }
}

// =============================================================================
// SQL Queries
// =============================================================================

impl ScheduledItem {
    pub async fn find_by_external_id(
        external_id: ScheduledItemExternalId,
        pool: &PgPool,
    ) -> Result<Option<Self>, StoreError> {
        let item = sqlx::query_as::<_, ScheduledItem>(
            "SELECT * FROM scheduled_items WHERE external_id = $1",
        )
        .bind(external_id)
        .fetch_optional(pool)
        .await?;
        Ok(item)
    }

    pub async fn find_by_slot(
        approved_item_id: ApprovedItemId,
        surface: &str,
        date: NaiveDate,
        pool: &PgPool,
    ) -> Result<Option<Self>, StoreError> {
        let item = sqlx::query_as::<_, ScheduledItem>(
            r#"
            SELECT * FROM scheduled_items
            WHERE approved_item_id = $1
              AND scheduled_surface_guid = $2
              AND scheduled_date = $3
            "#,
        )
        .bind(approved_item_id)
        .bind(surface)
        .bind(date)
        .fetch_optional(pool)
        .await?;
        Ok(item)
    }

    /// Assignments for a surface within an inclusive date range, grouped by
    /// date and, within a date, earliest-touched first.
    pub async fn find_for_surface(
        surface: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        pool: &PgPool,
    ) -> Result<Vec<Self>, StoreError> {
        let items = sqlx::query_as::<_, ScheduledItem>(
            r#"
            SELECT * FROM scheduled_items
            WHERE scheduled_surface_guid = $1
              AND scheduled_date BETWEEN $2 AND $3
            ORDER BY scheduled_date ASC, updated_at ASC
            "#,
        )
        .bind(surface)
        .bind(start_date)
        .bind(end_date)
        .fetch_all(pool)
        .await?;
        Ok(items)
    }

    pub async fn count_for_approved_item(
        approved_item_id: ApprovedItemId,
        pool: &PgPool,
    ) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM scheduled_items WHERE approved_item_id = $1",
        )
        .bind(approved_item_id)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// Whether any assignment for a story on `domain_name` is dated strictly
    /// before `before`.
    pub async fn exists_for_domain_before(
        domain_name: &str,
        before: NaiveDate,
        pool: &PgPool,
    ) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1
                FROM scheduled_items si
                JOIN approved_items ai ON ai.id = si.approved_item_id
                WHERE ai.domain_name = $1
                  AND si.scheduled_date < $2
            )
            "#,
        )
        .bind(domain_name)
        .bind(before)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }

    /// Insert an assignment. A taken slot surfaces as
    /// `StoreError::UniqueViolation(SLOT_UNIQUE_CONSTRAINT)`.
    pub async fn create(new: NewScheduledItem, pool: &PgPool) -> Result<Self, StoreError> {
        let mut conn = pool.acquire().await?;
        Self::insert(&new, &mut conn).await
    }

    async fn insert(new: &NewScheduledItem, conn: &mut PgConnection) -> Result<Self, StoreError> {
        let item = sqlx::query_as::<_, ScheduledItem>(
            r#"
            INSERT INTO scheduled_items (
                id, external_id, approved_item_id, scheduled_surface_guid,
                scheduled_date, source, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(ScheduledItemId::new())
        .bind(new.external_id)
        .bind(new.approved_item_id)
        .bind(&new.scheduled_surface_guid)
        .bind(new.scheduled_date)
        .bind(new.source)
        .bind(&new.created_by)
        .fetch_one(conn)
        .await?;
        Ok(item)
    }

    pub async fn delete(
        external_id: ScheduledItemExternalId,
        pool: &PgPool,
    ) -> Result<Option<Self>, StoreError> {
        let item = sqlx::query_as::<_, ScheduledItem>(
            "DELETE FROM scheduled_items WHERE external_id = $1 RETURNING *",
        )
        .bind(external_id)
        .fetch_optional(pool)
        .await?;
        Ok(item)
    }

    /// Replace an assignment with a new row (new identity, fresh audit columns)
    /// in one transaction. Returns `None` when the old row no longer exists.
    pub async fn replace(
        old_external_id: ScheduledItemExternalId,
        new: NewScheduledItem,
        pool: &PgPool,
    ) -> Result<Option<Self>, StoreError> {
        let mut tx = pool.begin().await?;

        let deleted = sqlx::query_scalar::<_, ScheduledItemId>(
            "DELETE FROM scheduled_items WHERE external_id = $1 RETURNING id",
        )
        .bind(old_external_id)
        .fetch_optional(&mut *tx)
        .await?;

        if deleted.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        let item = Self::insert(&new, &mut *tx).await?;

        tx.commit().await?;
        Ok(Some(item))
    }
}
