// Common types shared by the kernel and every domain

pub mod actor;
pub mod entity_ids;
pub mod error;
pub mod id;
pub mod macros;
pub mod types;

pub use actor::Actor;
pub use entity_ids::*;
pub use error::{CorpusError, CorpusErrorKind, CorpusResult, StoreError};
pub use id::{Id, V4, V7};
pub use types::ActivitySource;
