//! Content item repository - approved and rejected stories

pub mod actions;
pub mod inputs;
pub mod models;
pub mod types;

pub use inputs::{ApprovedItemInput, RejectedItemInput};
pub use models::{ApprovedItem, ApprovedItemUpdate, RejectedItem};
pub use types::*;
