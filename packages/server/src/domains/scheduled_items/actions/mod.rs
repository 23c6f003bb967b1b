//! Scheduling engine actions - create, delete and reschedule assignments

mod mutations;
mod queries;

pub use mutations::{create_scheduled_item, delete_scheduled_item, reschedule_scheduled_item};
pub use queries::{get_scheduled_item, list_scheduled_items};
