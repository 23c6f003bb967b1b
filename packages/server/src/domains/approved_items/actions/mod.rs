//! Content item actions - approve, update, reject and delete stories
//!
//! URLs are unique across approved and rejected items together.

mod mutations;
mod queries;

pub use mutations::{
    create_approved_item, create_rejected_item, delete_approved_item, reject_approved_item,
    update_approved_item,
};
pub use queries::{find_approved_item_by_url, get_approved_item, has_trusted_domain};
