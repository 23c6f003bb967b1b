pub mod schedule_review;

pub use schedule_review::*;
