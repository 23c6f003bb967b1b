use chrono::NaiveDate;
use tracing::info;

use crate::common::{Actor, CorpusError, CorpusResult, StoreError};
use crate::domains::schedule_reviews::models::{NewScheduleReview, ScheduleReview};
use crate::kernel::{notify, Committed, CorpusDeps, CorpusEvent, CorpusEventType, EventPayload};

fn already_reviewed(review: ScheduleReview) -> CorpusError {
    CorpusError::AlreadyReviewed {
        surface: review.scheduled_surface_guid,
        date: review.scheduled_date,
        reviewed_by: review.reviewed_by,
        reviewed_at: review.reviewed_at,
    }
}

/// Record that `actor` reviewed the schedule of one surface for one date.
///
/// A slot can be reviewed once; a second attempt fails with
/// `AlreadyReviewed` naming the earlier reviewer.
pub async fn mark_reviewed(
    surface_guid: &str,
    date: NaiveDate,
    actor: &Actor,
    deps: &CorpusDeps,
) -> CorpusResult<Committed<ScheduleReview>> {
    let surface = deps.surfaces.require(surface_guid)?;

    if let Some(existing) = deps.store.find_review(surface.guid, date).await? {
        return Err(already_reviewed(existing));
    }

    info!(surface = %surface.guid, date = %date, actor = %actor, "Marking schedule reviewed");

    let new = NewScheduleReview {
        scheduled_surface_guid: surface.guid.to_string(),
        scheduled_date: date,
        reviewed_by: actor.to_string(),
    };

    let review = match deps.store.insert_review(new).await {
        Ok(review) => review,
        // Lost a race: report whoever got there first.
        Err(StoreError::UniqueViolation(_)) => {
            return match deps.store.find_review(surface.guid, date).await? {
                Some(existing) => Err(already_reviewed(existing)),
                None => Err(CorpusError::Conflict(format!(
                    "The {} schedule for {} has already been reviewed",
                    surface.guid, date
                ))),
            };
        }
        Err(e) => return Err(e.into()),
    };

    let event = CorpusEvent::new(
        CorpusEventType::ScheduleReviewed,
        actor,
        EventPayload::ScheduleReview {
            review: review.clone(),
        },
    );
    Ok(notify(deps.events.as_ref(), review, event).await)
}
