use sqlx::PgConnection;

use crate::common::StoreError;

/// Primary key of `corpus_urls`. A URL can be held by at most one approved or
/// rejected item, and a second claim fails on this constraint.
pub const URL_UNIQUE_CONSTRAINT: &str = "corpus_urls_pkey";

/// Ownership of a URL by the corpus. Approved and rejected rows reference it,
/// so a claim is taken before either insert and released when the last row
/// holding the URL is deleted. Rejecting an approved item keeps the claim.
pub struct CorpusUrl;

impl CorpusUrl {
    pub async fn claim(url: &str, conn: &mut PgConnection) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO corpus_urls (url) VALUES ($1)")
            .bind(url)
            .execute(conn)
            .await?;
        Ok(())
    }

    pub async fn release(url: &str, conn: &mut PgConnection) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM corpus_urls WHERE url = $1")
            .bind(url)
            .execute(conn)
            .await?;
        Ok(())
    }
}
