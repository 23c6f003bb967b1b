//! Domain policy actions - trust, exclusion and publisher mappings
//!
//! Every hostname is normalized before it touches a policy table.

mod mutations;
mod queries;

pub use mutations::{
    add_excluded_domain, promote_if_eligible, remove_excluded_domain, upsert_publisher_domain,
};
pub use queries::{find_publisher_domain, is_excluded, is_trusted, list_excluded_domains};
