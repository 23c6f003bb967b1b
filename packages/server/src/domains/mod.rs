pub mod approved_items;
pub mod domain_policy;
pub mod schedule_reviews;
pub mod scheduled_items;
pub mod sections;
pub mod surfaces;
