use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::common::{ApprovedItemExternalId, ApprovedItemId, StoreError};
use crate::domains::approved_items::types::{
    ApprovedItemGrade, Author, CorpusItemSource, CorpusLanguage, CuratedStatus, Topic,
};

use super::corpus_url::CorpusUrl;
use super::rejected_item::{NewRejectedItem, RejectedItem};

/// A reviewed story that may be scheduled onto surfaces and sections.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ApprovedItem {
    pub id: ApprovedItemId,
    pub external_id: ApprovedItemExternalId,
    pub prospect_id: Option<String>,
    pub url: String,
    /// Normalized hostname of `url`; the key for every domain policy lookup.
    pub domain_name: String,
    pub title: String,
    pub excerpt: String,
    pub image_url: Option<String>,
    pub publisher: String,
    pub authors: Json<Vec<Author>>,
    pub status: CuratedStatus,
    pub language: CorpusLanguage,
    pub topic: Option<Topic>,
    pub source: CorpusItemSource,
    pub grade: Option<ApprovedItemGrade>,
    pub is_collection: bool,
    pub is_syndicated: bool,
    pub is_time_sensitive: bool,
    pub date_published: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<String>,
}

/// Row values for a new approved item. The internal id is minted on insert.
#[derive(Debug, Clone)]
pub struct NewApprovedItem {
    pub external_id: ApprovedItemExternalId,
    pub prospect_id: Option<String>,
    pub url: String,
    pub domain_name: String,
    pub title: String,
    pub excerpt: String,
    pub image_url: Option<String>,
    pub publisher: String,
    pub authors: Vec<Author>,
    pub status: CuratedStatus,
    pub language: CorpusLanguage,
    pub topic: Option<Topic>,
    pub source: CorpusItemSource,
    pub grade: Option<ApprovedItemGrade>,
    pub is_collection: bool,
    pub is_syndicated: bool,
    pub is_time_sensitive: bool,
    pub date_published: Option<NaiveDate>,
    pub created_by: String,
}

/// Mutable metadata of an approved item. `url`, `domain_name` and the ids are
/// fixed at creation.
#[derive(Debug, Clone)]
pub struct ApprovedItemUpdate {
    pub title: String,
    pub excerpt: String,
    pub image_url: Option<String>,
    pub publisher: String,
    pub authors: Vec<Author>,
    pub status: CuratedStatus,
    pub language: CorpusLanguage,
    pub topic: Option<Topic>,
    pub grade: Option<ApprovedItemGrade>,
    pub is_collection: bool,
    pub is_syndicated: bool,
    pub is_time_sensitive: bool,
    pub date_published: Option<NaiveDate>,
}

impl NewApprovedItem {
    /// Materializes the row the store will hold.
    pub fn into_item(self, id: ApprovedItemId, now: DateTime<Utc>) -> ApprovedItem {
        ApprovedItem {
            id,
            external_id: self.external_id,
            prospect_id: self.prospect_id,
            url: self.url,
            domain_name: self.domain_name,
            title: self.title,
            excerpt: self.excerpt,
            image_url: self.image_url,
            publisher: self.publisher,
            authors: Json(self.authors),
            status: self.status,
            language: self.language,
            topic: self.topic,
            source: self.source,
            grade: self.grade,
            is_collection: self.is_collection,
            is_syndicated: self.is_syndicated,
            is_time_sensitive: self.is_time_sensitive,
            date_published: self.date_published,
            created_at: now,
            created_by: self.created_by,
            updated_at: now,
            updated_by: None,
        }
    }
}

impl ApprovedItem {
    /// Applies an update in place, stamping the audit columns.
    pub fn apply_update(&mut self, update: ApprovedItemUpdate, updated_by: &str, now: DateTime<Utc>) {
        self.title = update.title;
        self.excerpt = update.excerpt;
        self.image_url = update.image_url;
        self.publisher = update.publisher;
        self.authors = Json(update.authors);
        self.status = update.status;
        self.language = update.language;
        self.topic = update.topic;
        self.grade = update.grade;
        self.is_collection = update.is_collection;
        self.is_syndicated = update.is_syndicated;
        self.is_time_sensitive = update.is_time_sensitive;
        self.date_published = update.date_published;
        self.updated_at = now;
        self.updated_by = Some(updated_by.to_string());
    }
}

// =============================================================================
// SQL Queries
// =============================================================================

impl ApprovedItem {
    pub async fn find_by_id(id: ApprovedItemId, pool: &PgPool) -> Result<Option<Self>, StoreError> {
        let item = sqlx::query_as::<_, ApprovedItem>("SELECT * FROM approved_items WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(item)
    }

    pub async fn find_by_external_id(
        external_id: ApprovedItemExternalId,
        pool: &PgPool,
    ) -> Result<Option<Self>, StoreError> {
        let item = sqlx::query_as::<_, ApprovedItem>(
            "SELECT * FROM approved_items WHERE external_id = $1",
        )
        .bind(external_id)
        .fetch_optional(pool)
        .await?;
        Ok(item)
    }

    pub async fn find_by_url(url: &str, pool: &PgPool) -> Result<Option<Self>, StoreError> {
        let item = sqlx::query_as::<_, ApprovedItem>("SELECT * FROM approved_items WHERE url = $1")
            .bind(url)
            .fetch_optional(pool)
            .await?;
        Ok(item)
    }

    pub async fn find_by_ids(
        ids: &[ApprovedItemId],
        pool: &PgPool,
    ) -> Result<Vec<Self>, StoreError> {
        let items = sqlx::query_as::<_, ApprovedItem>(
            "SELECT * FROM approved_items WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(pool)
        .await?;
        Ok(items)
    }

    /// Insert a new approved item, claiming its URL in the same transaction.
    ///
    /// A URL already held by an approved or rejected item fails with
    /// `UniqueViolation(URL_UNIQUE_CONSTRAINT)`.
    pub async fn create(new: NewApprovedItem, pool: &PgPool) -> Result<Self, StoreError> {
        let mut tx = pool.begin().await?;

        CorpusUrl::claim(&new.url, &mut *tx).await?;

        let item = sqlx::query_as::<_, ApprovedItem>(
            r#"
            INSERT INTO approved_items (
                id, external_id, prospect_id, url, domain_name, title, excerpt,
                image_url, publisher, authors, status, language, topic, source,
                grade, is_collection, is_syndicated, is_time_sensitive,
                date_published, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                    $15, $16, $17, $18, $19, $20)
            RETURNING *
            "#,
        )
        .bind(ApprovedItemId::new())
        .bind(new.external_id)
        .bind(&new.prospect_id)
        .bind(&new.url)
        .bind(&new.domain_name)
        .bind(&new.title)
        .bind(&new.excerpt)
        .bind(&new.image_url)
        .bind(&new.publisher)
        .bind(Json(&new.authors))
        .bind(new.status)
        .bind(new.language)
        .bind(new.topic)
        .bind(new.source)
        .bind(new.grade)
        .bind(new.is_collection)
        .bind(new.is_syndicated)
        .bind(new.is_time_sensitive)
        .bind(new.date_published)
        .bind(&new.created_by)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(item)
    }

    pub async fn update(
        external_id: ApprovedItemExternalId,
        update: ApprovedItemUpdate,
        updated_by: &str,
        pool: &PgPool,
    ) -> Result<Option<Self>, StoreError> {
        let item = sqlx::query_as::<_, ApprovedItem>(
            r#"
            UPDATE approved_items
            SET
                title = $2,
                excerpt = $3,
                image_url = $4,
                publisher = $5,
                authors = $6,
                status = $7,
                language = $8,
                topic = $9,
                grade = $10,
                is_collection = $11,
                is_syndicated = $12,
                is_time_sensitive = $13,
                date_published = $14,
                updated_by = $15,
                updated_at = NOW()
            WHERE external_id = $1
            RETURNING *
            "#,
        )
        .bind(external_id)
        .bind(&update.title)
        .bind(&update.excerpt)
        .bind(&update.image_url)
        .bind(&update.publisher)
        .bind(Json(&update.authors))
        .bind(update.status)
        .bind(update.language)
        .bind(update.topic)
        .bind(update.grade)
        .bind(update.is_collection)
        .bind(update.is_syndicated)
        .bind(update.is_time_sensitive)
        .bind(update.date_published)
        .bind(updated_by)
        .fetch_optional(pool)
        .await?;
        Ok(item)
    }

    /// Delete an approved item and release its URL. Section memberships
    /// cascade; scheduled items hold a restricting foreign key.
    pub async fn delete(
        external_id: ApprovedItemExternalId,
        pool: &PgPool,
    ) -> Result<Option<Self>, StoreError> {
        let mut tx = pool.begin().await?;

        let item = sqlx::query_as::<_, ApprovedItem>(
            "DELETE FROM approved_items WHERE external_id = $1 RETURNING *",
        )
        .bind(external_id)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(item) = &item {
            CorpusUrl::release(&item.url, &mut *tx).await?;
        }

        tx.commit().await?;
        Ok(item)
    }

    /// Move an approved item to the rejected table in one transaction. The URL
    /// claim passes to the rejected row untouched.
    pub async fn reject(
        external_id: ApprovedItemExternalId,
        rejected: NewRejectedItem,
        pool: &PgPool,
    ) -> Result<Option<RejectedItem>, StoreError> {
        let mut tx = pool.begin().await?;

        let deleted = sqlx::query_as::<_, ApprovedItem>(
            "DELETE FROM approved_items WHERE external_id = $1 RETURNING *",
        )
        .bind(external_id)
        .fetch_optional(&mut *tx)
        .await?;

        if deleted.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        let rejected = RejectedItem::insert(&rejected, &mut *tx).await?;

        tx.commit().await?;
        Ok(Some(rejected))
    }
}
