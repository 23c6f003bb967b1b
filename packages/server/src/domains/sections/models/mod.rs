pub mod section;
pub mod section_item;

pub use section::*;
pub use section_item::*;
