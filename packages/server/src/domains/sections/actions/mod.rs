//! Section lifecycle actions

mod mutations;
mod queries;

pub use mutations::{
    add_section_item, create_custom_section, create_or_replace_ml_section, delete_custom_section,
    remove_section_item, set_section_disabled, update_custom_section,
};
pub use queries::{get_section, list_sections};
