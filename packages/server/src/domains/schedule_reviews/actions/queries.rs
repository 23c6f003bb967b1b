use chrono::NaiveDate;

use crate::common::{CorpusError, CorpusResult};
use crate::domains::schedule_reviews::models::ScheduleReview;
use crate::kernel::CorpusDeps;

pub async fn list_reviews(
    surface_guid: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
    deps: &CorpusDeps,
) -> CorpusResult<Vec<ScheduleReview>> {
    let surface = deps.surfaces.require(surface_guid)?;
    if start_date > end_date {
        return Err(CorpusError::validation(format!(
            "Start date {} is after end date {}",
            start_date, end_date
        )));
    }
    Ok(deps
        .store
        .list_reviews(surface.guid, start_date, end_date)
        .await?)
}
