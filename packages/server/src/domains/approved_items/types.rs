use serde::{Deserialize, Serialize};

use crate::common::{CorpusError, CorpusResult};

crate::corpus_enum!(
    /// Where a story sits in the corpus.
    CuratedStatus, pg = "curated_status", label = "curated status" {
        Recommendation => "RECOMMENDATION",
        Corpus => "CORPUS",
    }
);

crate::corpus_enum!(
    CorpusLanguage, pg = "corpus_language", label = "language" {
        De => "DE",
        En => "EN",
        Es => "ES",
        Fr => "FR",
        It => "IT",
    }
);

crate::corpus_enum!(
    Topic, pg = "topic", label = "topic" {
        Business => "BUSINESS",
        Career => "CAREER",
        Coronavirus => "CORONAVIRUS",
        Education => "EDUCATION",
        Entertainment => "ENTERTAINMENT",
        Food => "FOOD",
        Gaming => "GAMING",
        HealthFitness => "HEALTH_FITNESS",
        Home => "HOME",
        Parenting => "PARENTING",
        PersonalFinance => "PERSONAL_FINANCE",
        Politics => "POLITICS",
        Science => "SCIENCE",
        SelfImprovement => "SELF_IMPROVEMENT",
        Sports => "SPORTS",
        Technology => "TECHNOLOGY",
        Travel => "TRAVEL",
    }
);

crate::corpus_enum!(
    /// How a story entered the corpus.
    CorpusItemSource, pg = "corpus_item_source", label = "corpus item source" {
        Prospect => "PROSPECT",
        Manual => "MANUAL",
        Backfill => "BACKFILL",
        Ml => "ML",
    }
);

crate::corpus_enum!(
    ApprovedItemGrade, pg = "approved_item_grade", label = "grade" {
        A => "A",
        B => "B",
        C => "C",
    }
);

crate::corpus_enum!(
    RejectionReason, pg = "rejection_reason", label = "rejection reason" {
        Paywall => "PAYWALL",
        PoliticalOpinion => "POLITICAL_OPINION",
        OffensiveMaterial => "OFFENSIVE_MATERIAL",
        TimeSensitive => "TIME_SENSITIVE",
        Misinformation => "MISINFORMATION",
        Other => "OTHER",
    }
);

/// An author credit on an approved story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub sort_order: i32,
}

/// Parses a comma-separated list of rejection reason codes.
///
/// Codes are trimmed and de-duplicated (first occurrence wins the position).
/// An unknown code or an empty list is a validation error.
pub fn parse_rejection_reasons(raw: &str) -> CorpusResult<Vec<RejectionReason>> {
    let mut reasons: Vec<RejectionReason> = Vec::new();
    for code in raw.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        let reason: RejectionReason = code.parse()?;
        if !reasons.contains(&reason) {
            reasons.push(reason);
        }
    }

    if reasons.is_empty() {
        return Err(CorpusError::validation(
            "At least one rejection reason is required",
        ));
    }

    Ok(reasons)
}

/// Serializes rejection reasons into the stored comma-separated form.
pub fn join_rejection_reasons(reasons: &[RejectionReason]) -> String {
    reasons
        .iter()
        .map(RejectionReason::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

/// Orders authors by `sort_order`, renumbering from 1 so that gaps and
/// duplicates submitted by callers do not leak into storage.
pub fn normalize_authors(mut authors: Vec<Author>) -> Vec<Author> {
    authors.retain(|a| !a.name.trim().is_empty());
    authors.sort_by_key(|a| a.sort_order);
    authors
        .into_iter()
        .enumerate()
        .map(|(i, a)| Author {
            name: a.name.trim().to_string(),
            sort_order: i as i32 + 1,
        })
        .collect()
}
