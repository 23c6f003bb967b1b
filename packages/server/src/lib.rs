// Curated Corpus - scheduling and section-lifecycle engine
//
// Decides which approved stories may occupy which (surface, date) slots,
// keeps domain trust/exclusion policy, and manages ML-generated and
// curator-built sections.
//
// Operations are organized per-domain in domains/*/actions/

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;

pub use config::*;
