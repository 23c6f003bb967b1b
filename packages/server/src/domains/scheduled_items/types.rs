use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::common::{ActivitySource, ApprovedItemExternalId, CorpusResult};
use crate::domains::approved_items::models::ApprovedItem;
use crate::domains::schedule_reviews::models::ScheduleReview;

use super::models::ScheduledItem;

crate::corpus_enum!(
    /// Why a curator put a story on a surface.
    ScheduledItemReason, pg = "scheduled_item_reason", label = "scheduling reason" {
        Country => "COUNTRY",
        Evergreen => "EVERGREEN",
        FormatDiversity => "FORMAT_DIVERSITY",
        PublisherDiversity => "PUBLISHER_DIVERSITY",
        Timely => "TIMELY",
        TopicDiversity => "TOPIC_DIVERSITY",
        Trending => "TRENDING",
        UnderTheRadar => "UNDER_THE_RADAR",
    }
);

crate::corpus_enum!(
    /// Why a curator took a story off a surface.
    RemovalReason, pg = "removal_reason", label = "removal reason" {
        ArticleQuality => "ARTICLE_QUALITY",
        Commercial => "COMMERCIAL",
        Controversial => "CONTROVERSIAL",
        Dated => "DATED",
        HedDek => "HED_DEK",
        ImageQuality => "IMAGE_QUALITY",
        NoImage => "NO_IMAGE",
        OffTopic => "OFF_TOPIC",
        OneSided => "ONE_SIDED",
        Paywall => "PAYWALL",
        PublisherQuality => "PUBLISHER_QUALITY",
        SetDiversity => "SET_DIVERSITY",
        Other => "OTHER",
    }
);

/// Parses free-form reason codes, de-duplicating and trimming them.
pub fn parse_reasons<T>(codes: &[String]) -> CorpusResult<Vec<T>>
where
    T: std::str::FromStr<Err = crate::common::CorpusError> + PartialEq,
{
    let mut reasons = Vec::new();
    for code in codes.iter().map(|c| c.trim()).filter(|c| !c.is_empty()) {
        let reason: T = code.parse()?;
        if !reasons.contains(&reason) {
            reasons.push(reason);
        }
    }
    Ok(reasons)
}

/// Curator-supplied context carried into the scheduling event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulingNote<R> {
    pub reasons: Vec<R>,
    pub comment: Option<String>,
}

impl<R: Copy + ToString> SchedulingNote<R> {
    pub fn none() -> Self {
        Self {
            reasons: Vec::new(),
            comment: None,
        }
    }

    pub fn new(reasons: Vec<R>, comment: Option<String>) -> Self {
        Self { reasons, comment }
    }

    /// Reason codes as they appear in event payloads.
    pub fn codes(&self) -> Vec<String> {
        self.reasons.iter().map(ToString::to_string).collect()
    }
}

/// Caller input for putting a story on a surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleItemInput {
    pub approved_item_external_id: ApprovedItemExternalId,
    pub scheduled_surface_guid: String,
    pub scheduled_date: NaiveDate,
    pub source: ActivitySource,
    #[serde(default)]
    pub reasons: Vec<ScheduledItemReason>,
    pub reason_comment: Option<String>,
}

/// A scheduled item together with the story it points at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledItemWithStory {
    #[serde(flatten)]
    pub scheduled: ScheduledItem,
    pub approved_item: ApprovedItem,
}

/// One date of a surface's schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleDay {
    pub scheduled_date: NaiveDate,
    pub total_count: usize,
    pub syndicated_count: usize,
    pub collection_count: usize,
    pub review: Option<ScheduleReview>,
    pub items: Vec<ScheduledItemWithStory>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::CorpusErrorKind;

    #[test]
    fn test_parse_reasons_dedupes() {
        let reasons: Vec<ScheduledItemReason> = parse_reasons(&[
            " TRENDING".to_string(),
            "".to_string(),
            "TRENDING".to_string(),
            "UNDER_THE_RADAR".to_string(),
        ])
        .unwrap();
        assert_eq!(
            reasons,
            vec![ScheduledItemReason::Trending, ScheduledItemReason::UnderTheRadar]
        );
    }

    #[test]
    fn test_parse_reasons_rejects_unknown() {
        let err = parse_reasons::<RemovalReason>(&["BORING".to_string()]).unwrap_err();
        assert_eq!(err.kind(), CorpusErrorKind::Validation);
    }
}
