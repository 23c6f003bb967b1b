use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};

use crate::common::{RejectedItemExternalId, RejectedItemId, StoreError};
use crate::domains::approved_items::types::{CorpusLanguage, Topic};

use super::corpus_url::CorpusUrl;

/// Terminal record of a story that failed review. Never updated.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RejectedItem {
    pub id: RejectedItemId,
    pub external_id: RejectedItemExternalId,
    pub prospect_id: Option<String>,
    pub url: String,
    pub title: Option<String>,
    pub topic: Option<Topic>,
    pub language: Option<CorpusLanguage>,
    pub publisher: Option<String>,
    /// Comma-separated, de-duplicated `RejectionReason` codes.
    pub reason: String,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

#[derive(Debug, Clone)]
pub struct NewRejectedItem {
    pub external_id: RejectedItemExternalId,
    pub prospect_id: Option<String>,
    pub url: String,
    pub title: Option<String>,
    pub topic: Option<Topic>,
    pub language: Option<CorpusLanguage>,
    pub publisher: Option<String>,
    pub reason: String,
    pub created_by: String,
}

impl NewRejectedItem {
    pub fn into_item(self, id: RejectedItemId, now: DateTime<Utc>) -> RejectedItem {
        RejectedItem {
            id,
            external_id: self.external_id,
            prospect_id: self.prospect_id,
            url: self.url,
            title: self.title,
            topic: self.topic,
            language: self.language,
            publisher: self.publisher,
            reason: self.reason,
            created_at: now,
            created_by: self.created_by,
        }
    }
}

impl RejectedItem {
    pub async fn find_by_url(url: &str, pool: &PgPool) -> Result<Option<Self>, StoreError> {
        let item = sqlx::query_as::<_, RejectedItem>("SELECT * FROM rejected_items WHERE url = $1")
            .bind(url)
            .fetch_optional(pool)
            .await?;
        Ok(item)
    }

    /// Insert a rejected item for a URL that was never approved, claiming the
    /// URL in the same transaction.
    pub async fn create(new: NewRejectedItem, pool: &PgPool) -> Result<Self, StoreError> {
        let mut tx = pool.begin().await?;

        CorpusUrl::claim(&new.url, &mut *tx).await?;

        let item = Self::insert(&new, &mut *tx).await?;

        tx.commit().await?;
        Ok(item)
    }

    pub(super) async fn insert(
        new: &NewRejectedItem,
        conn: &mut PgConnection,
    ) -> Result<Self, StoreError> {
        let item = sqlx::query_as::<_, RejectedItem>(
            r#"
            INSERT INTO rejected_items (
                id, external_id, prospect_id, url, title, topic, language,
                publisher, reason, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(RejectedItemId::new())
        .bind(new.external_id)
        .bind(&new.prospect_id)
        .bind(&new.url)
        .bind(&new.title)
        .bind(new.topic)
        .bind(new.language)
        .bind(&new.publisher)
        .bind(&new.reason)
        .bind(&new.created_by)
        .fetch_one(conn)
        .await?;
        Ok(item)
    }
}
