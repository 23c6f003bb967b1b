//! Derived publication status of a section.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SectionStatus {
    Disabled,
    Scheduled,
    Live,
    Expired,
}

/// Derives a section's status at `now`.
///
/// Comparison happens on UTC calendar days. A missing start date means the
/// window is open in the past (every ML section); a missing end date means it
/// never closes. `disabled` overrides the window.
pub fn derive_status(
    disabled: bool,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    now: DateTime<Utc>,
) -> SectionStatus {
    if disabled {
        return SectionStatus::Disabled;
    }

    let today = now.date_naive();

    if start_date.is_some_and(|start| today < start) {
        return SectionStatus::Scheduled;
    }
    if end_date.is_some_and(|end| today >= end) {
        return SectionStatus::Expired;
    }

    SectionStatus::Live
}
