use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

/// Failures reported by a persistence backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A unique index rejected the write. Carries the constraint name.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    /// A foreign key rejected the write. Carries the constraint name.
    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            let constraint = db.constraint().unwrap_or("unknown").to_string();
            if db.is_unique_violation() {
                return StoreError::UniqueViolation(constraint);
            }
            if db.is_foreign_key_violation() {
                return StoreError::ForeignKeyViolation(constraint);
            }
        }
        StoreError::Database(err)
    }
}

/// Coarse classification callers use to render or route a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorpusErrorKind {
    NotFound,
    Validation,
    Conflict,
    AlreadyReviewed,
    Excluded,
    Internal,
}

/// Typed failure of a corpus operation.
#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("{0}")]
    Validation(String),

    #[error("This story is already scheduled to appear on {surface} on {date}.")]
    AlreadyScheduled { surface: String, date: NaiveDate },

    #[error("{0}")]
    Conflict(String),

    #[error(
        "The {surface} schedule for {date} has already been reviewed by {reviewed_by} at {reviewed_at}."
    )]
    AlreadyReviewed {
        surface: String,
        date: NaiveDate,
        reviewed_by: String,
        reviewed_at: DateTime<Utc>,
    },

    #[error("Cannot schedule this story: {domain} is on the excluded domains list.")]
    ExcludedDomain { domain: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CorpusError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        CorpusError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        CorpusError::Validation(message.into())
    }

    pub fn kind(&self) -> CorpusErrorKind {
        match self {
            CorpusError::NotFound { .. } => CorpusErrorKind::NotFound,
            CorpusError::Validation(_) => CorpusErrorKind::Validation,
            CorpusError::AlreadyScheduled { .. } | CorpusError::Conflict(_) => {
                CorpusErrorKind::Conflict
            }
            CorpusError::AlreadyReviewed { .. } => CorpusErrorKind::AlreadyReviewed,
            CorpusError::ExcludedDomain { .. } => CorpusErrorKind::Excluded,
            CorpusError::Store(StoreError::UniqueViolation(_)) => CorpusErrorKind::Conflict,
            CorpusError::Store(_) => CorpusErrorKind::Internal,
        }
    }
}

pub type CorpusResult<T> = Result<T, CorpusError>;
