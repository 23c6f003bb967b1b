//! Scheduling engine - stories assigned to (surface, date) slots
//!
//! One assignment per (approved item, surface, date). Rescheduling replaces
//! the row rather than editing it, so the external id changes.

pub mod actions;
pub mod models;
pub mod types;

pub use models::{NewScheduledItem, ScheduledItem, SLOT_UNIQUE_CONSTRAINT};
pub use types::*;
