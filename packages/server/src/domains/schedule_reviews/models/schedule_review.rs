use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{ScheduleReviewId, StoreError};

/// Records that a curator reviewed the schedule of one (surface, date).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ScheduleReview {
    pub id: ScheduleReviewId,
    pub scheduled_surface_guid: String,
    pub scheduled_date: NaiveDate,
    pub reviewed_by: String,
    pub reviewed_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewScheduleReview {
    pub scheduled_surface_guid: String,
    pub scheduled_date: NaiveDate,
    pub reviewed_by: String,
}

impl NewScheduleReview {
    pub fn into_review(self, id: ScheduleReviewId, now: DateTime<Utc>) -> ScheduleReview {
        ScheduleReview {
            id,
            scheduled_surface_guid: self.scheduled_surface_guid,
            scheduled_date: self.scheduled_date,
            reviewed_by: self.reviewed_by,
            reviewed_at: now,
        }
    }
}

impl ScheduleReview {
    pub async fn find(
        surface: &str,
        date: NaiveDate,
        pool: &PgPool,
    ) -> Result<Option<Self>, StoreError> {
        let review = sqlx::query_as::<_, ScheduleReview>(
            r#"
            SELECT * FROM schedule_reviews
            WHERE scheduled_surface_guid = $1 AND scheduled_date = $2
            "#,
        )
        .bind(surface)
        .bind(date)
        .fetch_optional(pool)
        .await?;
        Ok(review)
    }

    pub async fn find_for_surface(
        surface: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        pool: &PgPool,
    ) -> Result<Vec<Self>, StoreError> {
        let reviews = sqlx::query_as::<_, ScheduleReview>(
            r#"
            SELECT * FROM schedule_reviews
            WHERE scheduled_surface_guid = $1
              AND scheduled_date BETWEEN $2 AND $3
            ORDER BY scheduled_date ASC
            "#,
        )
        .bind(surface)
        .bind(start_date)
        .bind(end_date)
        .fetch_all(pool)
        .await?;
        Ok(reviews)
    }

    /// Insert a review. A second review of the same slot surfaces as
    /// `StoreError::UniqueViolation("schedule_reviews_slot_key")`.
    pub async fn create(new: NewScheduleReview, pool: &PgPool) -> Result<Self, StoreError> {
        let review = sqlx::query_as::<_, ScheduleReview>(
            r#"
            INSERT INTO schedule_reviews (id, scheduled_surface_guid, scheduled_date, reviewed_by)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(ScheduleReviewId::new())
        .bind(&new.scheduled_surface_guid)
        .bind(new.scheduled_date)
        .bind(&new.reviewed_by)
        .fetch_one(pool)
        .await?;
        Ok(review)
    }
}
