use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::StoreError;

/// Maps a hostname to the canonical publisher name shown to readers.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PublisherDomain {
    pub domain_name: String,
    pub publisher: String,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<String>,
}

impl PublisherDomain {
    pub fn new(domain_name: String, publisher: String, actor: &str, now: DateTime<Utc>) -> Self {
        Self {
            domain_name,
            publisher,
            created_at: now,
            created_by: actor.to_string(),
            updated_at: now,
            updated_by: None,
        }
    }

    /// Re-point an existing mapping. Creation audit columns are kept.
    pub fn remap(&mut self, publisher: String, actor: &str, now: DateTime<Utc>) {
        self.publisher = publisher;
        self.updated_at = now;
        self.updated_by = Some(actor.to_string());
    }

    pub async fn find(domain_name: &str, pool: &PgPool) -> Result<Option<Self>, StoreError> {
        let mapping = sqlx::query_as::<_, PublisherDomain>(
            "SELECT * FROM publisher_domains WHERE domain_name = $1",
        )
        .bind(domain_name)
        .fetch_optional(pool)
        .await?;
        Ok(mapping)
    }

    /// Insert or re-point a mapping. On update `created_at`/`created_by` are
    /// left alone and `updated_by` is stamped.
    pub async fn upsert(
        domain_name: &str,
        publisher: &str,
        actor: &str,
        pool: &PgPool,
    ) -> Result<Self, StoreError> {
        let mapping = sqlx::query_as::<_, PublisherDomain>(
            r#"
            INSERT INTO publisher_domains (domain_name, publisher, created_by)
            VALUES ($1, $2, $3)
            ON CONFLICT (domain_name) DO UPDATE
            SET
                publisher = EXCLUDED.publisher,
                updated_by = $3,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(domain_name)
        .bind(publisher)
        .bind(actor)
        .fetch_one(pool)
        .await?;
        Ok(mapping)
    }
}
