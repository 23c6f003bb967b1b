//! Schedule review actions

mod mutations;
mod queries;

pub use mutations::mark_reviewed;
pub use queries::list_reviews;
