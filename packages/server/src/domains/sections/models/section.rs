use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};

use crate::common::{ActivitySource, SectionId, StoreError};
use crate::domains::sections::status::{derive_status, SectionStatus};
use crate::domains::sections::types::IabMetadata;

/// A named, ranked grouping of stories on one surface.
///
/// ML sections are replaced wholesale by each generation; MANUAL ("custom")
/// sections carry a start/end window and are edited by curators.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Section {
    pub id: SectionId,
    pub external_id: String,
    pub title: String,
    pub description: Option<String>,
    pub hero_title: Option<String>,
    pub hero_description: Option<String>,
    pub scheduled_surface_guid: String,
    pub iab: Option<Json<IabMetadata>>,
    pub sort: Option<i32>,
    pub create_source: ActivitySource,
    pub active: bool,
    pub disabled: bool,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub deactivated_at: Option<DateTime<Utc>>,
    pub deactivate_source: Option<ActivitySource>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<String>,
}

/// A new MANUAL section.
#[derive(Debug, Clone)]
pub struct NewSection {
    pub external_id: String,
    pub title: String,
    pub description: Option<String>,
    pub hero_title: Option<String>,
    pub hero_description: Option<String>,
    pub scheduled_surface_guid: String,
    pub iab: Option<IabMetadata>,
    pub sort: Option<i32>,
    pub create_source: ActivitySource,
    pub active: bool,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_by: String,
}

/// Mutable fields of a MANUAL section.
#[derive(Debug, Clone)]
pub struct CustomSectionUpdate {
    pub title: String,
    pub description: Option<String>,
    pub hero_title: Option<String>,
    pub hero_description: Option<String>,
    pub iab: Option<IabMetadata>,
    pub sort: Option<i32>,
    pub active: bool,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub updated_by: String,
}

/// One ML generation of a section: the row to insert or overwrite.
#[derive(Debug, Clone)]
pub struct MlSectionGeneration {
    pub external_id: String,
    pub title: String,
    pub scheduled_surface_guid: String,
    pub sort: Option<i32>,
    pub active: bool,
    pub actor: String,
}

impl Section {
    pub fn status(&self, now: DateTime<Utc>) -> SectionStatus {
        derive_status(self.disabled, self.start_date, self.end_date, now)
    }

    pub fn is_custom(&self) -> bool {
        self.create_source == ActivitySource::Manual
    }

    pub fn from_new(new: NewSection, id: SectionId, now: DateTime<Utc>) -> Self {
        Section {
            id,
            external_id: new.external_id,
            title: new.title,
            description: new.description,
            hero_title: new.hero_title,
            hero_description: new.hero_description,
            scheduled_surface_guid: new.scheduled_surface_guid,
            iab: new.iab.map(Json),
            sort: new.sort,
            create_source: new.create_source,
            active: new.active,
            disabled: false,
            start_date: new.start_date,
            end_date: new.end_date,
            deactivated_at: None,
            deactivate_source: None,
            created_at: now,
            created_by: new.created_by,
            updated_at: now,
            updated_by: None,
        }
    }

    pub fn from_generation(gen: MlSectionGeneration, id: SectionId, now: DateTime<Utc>) -> Self {
        Section {
            id,
            external_id: gen.external_id,
            title: gen.title,
            description: None,
            hero_title: None,
            hero_description: None,
            scheduled_surface_guid: gen.scheduled_surface_guid,
            iab: None,
            sort: gen.sort,
            create_source: ActivitySource::Ml,
            active: gen.active,
            disabled: false,
            start_date: None,
            end_date: None,
            deactivated_at: (!gen.active).then_some(now),
            deactivate_source: (!gen.active).then_some(ActivitySource::Ml),
            created_at: now,
            created_by: gen.actor,
            updated_at: now,
            updated_by: None,
        }
    }

    /// Overwrites the mutable fields of an existing ML section with a new
    /// generation. Going inactive stamps `deactivate_source`; the original
    /// `deactivated_at` is kept when the section was already inactive.
    pub fn apply_generation(&mut self, gen: MlSectionGeneration, now: DateTime<Utc>) {
        if gen.active {
            self.deactivated_at = None;
            self.deactivate_source = None;
        } else {
            if self.active {
                self.deactivated_at = Some(now);
            }
            self.deactivate_source = Some(ActivitySource::Ml);
        }
        self.title = gen.title;
        self.scheduled_surface_guid = gen.scheduled_surface_guid;
        self.sort = gen.sort;
        self.active = gen.active;
        self.updated_at = now;
        self.updated_by = Some(gen.actor);
    }

    /// Applies a curator edit. Returns true when the edit took the section
    /// from active to inactive, in which case its items must be retired too.
    pub fn apply_custom_update(&mut self, update: CustomSectionUpdate, now: DateTime<Utc>) -> bool {
        let deactivated = self.active && !update.active;
        if update.active {
            self.deactivated_at = None;
            self.deactivate_source = None;
        } else if deactivated {
            self.deactivated_at = Some(now);
            self.deactivate_source = Some(ActivitySource::Manual);
        }
        self.title = update.title;
        self.description = update.description;
        self.hero_title = update.hero_title;
        self.hero_description = update.hero_description;
        self.iab = update.iab.map(Json);
        self.sort = update.sort;
        self.active = update.active;
        self.start_date = update.start_date;
        self.end_date = update.end_date;
        self.updated_at = now;
        self.updated_by = Some(update.updated_by);
        deactivated
    }
}

// =============================================================================
// SQL Queries
// =============================================================================

impl Section {
    pub async fn find_by_external_id(
        external_id: &str,
        pool: &PgPool,
    ) -> Result<Option<Self>, StoreError> {
        let section =
            sqlx::query_as::<_, Section>("SELECT * FROM sections WHERE external_id = $1")
                .bind(external_id)
                .fetch_optional(pool)
                .await?;
        Ok(section)
    }

    pub async fn find_for_surface(
        surface: &str,
        include_inactive: bool,
        pool: &PgPool,
    ) -> Result<Vec<Self>, StoreError> {
        let sections = sqlx::query_as::<_, Section>(
            r#"
            SELECT * FROM sections
            WHERE scheduled_surface_guid = $1
              AND ($2 OR active = true)
            ORDER BY sort ASC NULLS LAST, created_at ASC
            "#,
        )
        .bind(surface)
        .bind(include_inactive)
        .fetch_all(pool)
        .await?;
        Ok(sections)
    }

    pub async fn create(new: NewSection, pool: &PgPool) -> Result<Self, StoreError> {
        let section = sqlx::query_as::<_, Section>(
            r#"
            INSERT INTO sections (
                id, external_id, title, description, hero_title, hero_description,
                scheduled_surface_guid, iab, sort, create_source, active,
                start_date, end_date, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(SectionId::new())
        .bind(&new.external_id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.hero_title)
        .bind(&new.hero_description)
        .bind(&new.scheduled_surface_guid)
        .bind(new.iab.as_ref().map(Json))
        .bind(new.sort)
        .bind(new.create_source)
        .bind(new.active)
        .bind(new.start_date)
        .bind(new.end_date)
        .bind(&new.created_by)
        .fetch_one(pool)
        .await?;
        Ok(section)
    }

    /// Update a MANUAL section. Returns `None` when no MANUAL section has
    /// this external id.
    ///
    /// Switching `active` off is attributed to MANUAL and retires the
    /// section's active items in the same transaction; switching it on clears
    /// the deactivation stamp.
    pub async fn update_custom(
        external_id: &str,
        update: CustomSectionUpdate,
        pool: &PgPool,
    ) -> Result<Option<Self>, StoreError> {
        let mut tx = pool.begin().await?;

        let was_active = sqlx::query_scalar::<_, bool>(
            "SELECT active FROM sections WHERE external_id = $1 AND create_source = 'MANUAL' FOR UPDATE",
        )
        .bind(external_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(was_active) = was_active else {
            tx.rollback().await?;
            return Ok(None);
        };

        let section = sqlx::query_as::<_, Section>(
            r#"
            UPDATE sections
            SET
                title = $2,
                description = $3,
                hero_title = $4,
                hero_description = $5,
                iab = $6,
                sort = $7,
                active = $8,
                start_date = $9,
                end_date = $10,
                deactivated_at = CASE
                    WHEN $8 THEN NULL
                    WHEN active THEN NOW()
                    ELSE deactivated_at
                END,
                deactivate_source = CASE
                    WHEN $8 THEN NULL
                    WHEN active THEN 'MANUAL'::activity_source
                    ELSE deactivate_source
                END,
                updated_by = $11,
                updated_at = NOW()
            WHERE external_id = $1
            RETURNING *
            "#,
        )
        .bind(external_id)
        .bind(&update.title)
        .bind(&update.description)
        .bind(&update.hero_title)
        .bind(&update.hero_description)
        .bind(update.iab.as_ref().map(Json))
        .bind(update.sort)
        .bind(update.active)
        .bind(update.start_date)
        .bind(update.end_date)
        .bind(&update.updated_by)
        .fetch_one(&mut *tx)
        .await?;

        if was_active && !update.active {
            retire_active_items(section.id, ActivitySource::Manual, &mut *tx).await?;
        }

        tx.commit().await?;
        Ok(Some(section))
    }

    /// Apply one ML generation: upsert the section row, then retire every
    /// currently-active item. Both steps share one transaction.
    ///
    /// Returns `None` (and writes nothing) when the external id belongs to a
    /// MANUAL section. The `u64` is the number of items retired.
    pub async fn apply_ml_generation(
        gen: MlSectionGeneration,
        pool: &PgPool,
    ) -> Result<Option<(Self, u64)>, StoreError> {
        let mut tx = pool.begin().await?;

        let section = sqlx::query_as::<_, Section>(
            r#"
            INSERT INTO sections (
                id, external_id, title, scheduled_surface_guid, sort,
                create_source, active, deactivated_at, deactivate_source, created_by
            )
            VALUES (
                $1, $2, $3, $4, $5, 'ML', $6,
                CASE WHEN $6 THEN NULL ELSE NOW() END,
                CASE WHEN $6 THEN NULL ELSE 'ML'::activity_source END,
                $7
            )
            ON CONFLICT (external_id) DO UPDATE
            SET
                title = EXCLUDED.title,
                scheduled_surface_guid = EXCLUDED.scheduled_surface_guid,
                sort = EXCLUDED.sort,
                active = EXCLUDED.active,
                deactivated_at = CASE
                    WHEN EXCLUDED.active THEN NULL
                    WHEN sections.active THEN NOW()
                    ELSE sections.deactivated_at
                END,
                deactivate_source = CASE
                    WHEN EXCLUDED.active THEN NULL
                    ELSE 'ML'::activity_source
                END,
                updated_by = $7,
                updated_at = NOW()
            WHERE sections.create_source = 'ML'
            RETURNING *
            "#,
        )
        .bind(SectionId::new())
        .bind(&gen.external_id)
        .bind(&gen.title)
        .bind(&gen.scheduled_surface_guid)
        .bind(gen.sort)
        .bind(gen.active)
        .bind(&gen.actor)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(section) = section else {
            tx.rollback().await?;
            return Ok(None);
        };

        let retired = retire_active_items(section.id, ActivitySource::Ml, &mut *tx).await?;

        tx.commit().await?;
        Ok(Some((section, retired)))
    }

    /// Soft-delete a section and every active membership in one transaction.
    pub async fn deactivate_with_items(
        external_id: &str,
        source: ActivitySource,
        actor: &str,
        pool: &PgPool,
    ) -> Result<Option<Self>, StoreError> {
        let mut tx = pool.begin().await?;

        let section = sqlx::query_as::<_, Section>(
            r#"
            UPDATE sections
            SET
                active = false,
                deactivated_at = COALESCE(deactivated_at, NOW()),
                deactivate_source = $2,
                updated_by = $3,
                updated_at = NOW()
            WHERE external_id = $1
            RETURNING *
            "#,
        )
        .bind(external_id)
        .bind(source)
        .bind(actor)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(section) = section else {
            tx.rollback().await?;
            return Ok(None);
        };

        retire_active_items(section.id, source, &mut *tx).await?;

        tx.commit().await?;
        Ok(Some(section))
    }

    pub async fn set_disabled(
        external_id: &str,
        disabled: bool,
        actor: &str,
        pool: &PgPool,
    ) -> Result<Option<Self>, StoreError> {
        let section = sqlx::query_as::<_, Section>(
            r#"
            UPDATE sections
            SET disabled = $2, updated_by = $3, updated_at = NOW()
            WHERE external_id = $1
            RETURNING *
            "#,
        )
        .bind(external_id)
        .bind(disabled)
        .bind(actor)
        .fetch_optional(pool)
        .await?;
        Ok(section)
    }
}

/// Deactivate the still-active items of a section. Already-inactive rows are
/// not touched.
async fn retire_active_items(
    section_id: SectionId,
    source: ActivitySource,
    conn: &mut PgConnection,
) -> Result<u64, StoreError> {
    let result = sqlx::query(
        r#"
        UPDATE section_items
        SET
            active = false,
            deactivated_at = NOW(),
            deactivate_source = $2,
            updated_at = NOW()
        WHERE section_id = $1 AND active = true
        "#,
    )
    .bind(section_id)
    .bind(source)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}
