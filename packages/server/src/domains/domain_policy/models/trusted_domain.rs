use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::StoreError;

/// A hostname with a proven scheduling track record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TrustedDomain {
    pub domain_name: String,
    pub created_at: DateTime<Utc>,
}

impl TrustedDomain {
    pub async fn exists(domain_name: &str, pool: &PgPool) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM trusted_domains WHERE domain_name = $1)",
        )
        .bind(domain_name)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }

    /// Insert the domain unless it is already trusted. Returns whether a row
    /// was written.
    pub async fn create_if_missing(domain_name: &str, pool: &PgPool) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO trusted_domains (domain_name)
            VALUES ($1)
            ON CONFLICT (domain_name) DO NOTHING
            "#,
        )
        .bind(domain_name)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
