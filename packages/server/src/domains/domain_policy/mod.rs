//! Domain policy - trusted, excluded and publisher-mapped hostnames
//!
//! All three tables are keyed by the normalized hostname produced in
//! [`hostname`].

pub mod actions;
pub mod hostname;
pub mod models;

pub use hostname::{domain_name_from_url, normalize_hostname};
pub use models::{ExcludedDomain, PublisherDomain, TrustedDomain};
