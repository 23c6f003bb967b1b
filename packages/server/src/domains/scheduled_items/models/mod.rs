pub mod scheduled_item;

pub use scheduled_item::*;
