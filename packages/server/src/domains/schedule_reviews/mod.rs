//! Schedule review tracker - one review per (surface, date)

pub mod actions;
pub mod models;

pub use models::{NewScheduleReview, ScheduleReview};
