pub mod excluded_domain;
pub mod publisher_domain;
pub mod trusted_domain;

pub use excluded_domain::*;
pub use publisher_domain::*;
pub use trusted_domain::*;
