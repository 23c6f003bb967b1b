use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{
    ActivitySource, ApprovedItemId, SectionId, SectionItemExternalId, SectionItemId, StoreError,
};

/// Membership of one approved item in one section. Duplicate memberships of
/// the same item are allowed.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SectionItem {
    pub id: SectionItemId,
    pub external_id: SectionItemExternalId,
    pub section_id: SectionId,
    pub approved_item_id: ApprovedItemId,
    pub rank: Option<i32>,
    pub active: bool,
    pub deactivated_at: Option<DateTime<Utc>>,
    pub deactivate_source: Option<ActivitySource>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSectionItem {
    pub external_id: SectionItemExternalId,
    pub section_id: SectionId,
    pub approved_item_id: ApprovedItemId,
    pub rank: Option<i32>,
}

impl NewSectionItem {
    pub fn into_item(self, id: SectionItemId, now: DateTime<Utc>) -> SectionItem {
        SectionItem {
            id,
            external_id: self.external_id,
            section_id: self.section_id,
            approved_item_id: self.approved_item_id,
            rank: self.rank,
            active: true,
            deactivated_at: None,
            deactivate_source: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl SectionItem {
    pub fn deactivate(&mut self, source: ActivitySource, now: DateTime<Utc>) {
        self.active = false;
        self.deactivated_at = Some(now);
        self.deactivate_source = Some(source);
        self.updated_at = now;
    }

    /// Ordering for display: rank ascending with unranked items last, then
    /// oldest first.
    pub fn display_order(a: &SectionItem, b: &SectionItem) -> std::cmp::Ordering {
        match (a.rank, b.rank) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }
        .then(a.created_at.cmp(&b.created_at))
    }
}

// =============================================================================
// SQL Queries
// =============================================================================

impl SectionItem {
    pub async fn find_by_external_id(
        external_id: SectionItemExternalId,
        pool: &PgPool,
    ) -> Result<Option<Self>, StoreError> {
        let item = sqlx::query_as::<_, SectionItem>(
            "SELECT * FROM section_items WHERE external_id = $1",
        )
        .bind(external_id)
        .fetch_optional(pool)
        .await?;
        Ok(item)
    }

    pub async fn find_for_section(
        section_id: SectionId,
        active_only: bool,
        pool: &PgPool,
    ) -> Result<Vec<Self>, StoreError> {
        let items = sqlx::query_as::<_, SectionItem>(
            r#"
            SELECT * FROM section_items
            WHERE section_id = $1
              AND (NOT $2 OR active = true)
            ORDER BY rank ASC NULLS LAST, created_at ASC
            "#,
        )
        .bind(section_id)
        .bind(active_only)
        .fetch_all(pool)
        .await?;
        Ok(items)
    }

    pub async fn create(new: NewSectionItem, pool: &PgPool) -> Result<Self, StoreError> {
        let item = sqlx::query_as::<_, SectionItem>(
            r#"
            INSERT INTO section_items (id, external_id, section_id, approved_item_id, rank)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(SectionItemId::new())
        .bind(new.external_id)
        .bind(new.section_id)
        .bind(new.approved_item_id)
        .bind(new.rank)
        .fetch_one(pool)
        .await?;
        Ok(item)
    }

    /// Deactivate one membership, stamping `source` and the current time even
    /// when the row was already retired.
    pub async fn deactivate_by_external_id(
        external_id: SectionItemExternalId,
        source: ActivitySource,
        pool: &PgPool,
    ) -> Result<Option<Self>, StoreError> {
        let item = sqlx::query_as::<_, SectionItem>(
            r#"
            UPDATE section_items
            SET
                active = false,
                deactivated_at = NOW(),
                deactivate_source = $2,
                updated_at = NOW()
            WHERE external_id = $1
            RETURNING *
            "#,
        )
        .bind(external_id)
        .bind(source)
        .fetch_optional(pool)
        .await?;
        Ok(item)
    }
}
