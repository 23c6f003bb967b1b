use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::StoreError;

/// A hostname whose stories may never be scheduled.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ExcludedDomain {
    pub domain_name: String,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

impl ExcludedDomain {
    pub async fn exists(domain_name: &str, pool: &PgPool) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM excluded_domains WHERE domain_name = $1)",
        )
        .bind(domain_name)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, StoreError> {
        let domains = sqlx::query_as::<_, ExcludedDomain>(
            "SELECT * FROM excluded_domains ORDER BY domain_name ASC",
        )
        .fetch_all(pool)
        .await?;
        Ok(domains)
    }

    /// A duplicate surfaces as `StoreError::UniqueViolation("excluded_domains_pkey")`.
    pub async fn create(
        domain_name: &str,
        created_by: &str,
        pool: &PgPool,
    ) -> Result<Self, StoreError> {
        let domain = sqlx::query_as::<_, ExcludedDomain>(
            r#"
            INSERT INTO excluded_domains (domain_name, created_by)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(domain_name)
        .bind(created_by)
        .fetch_one(pool)
        .await?;
        Ok(domain)
    }

    pub async fn delete(domain_name: &str, pool: &PgPool) -> Result<Option<Self>, StoreError> {
        let domain = sqlx::query_as::<_, ExcludedDomain>(
            "DELETE FROM excluded_domains WHERE domain_name = $1 RETURNING *",
        )
        .bind(domain_name)
        .fetch_optional(pool)
        .await?;
        Ok(domain)
    }
}
