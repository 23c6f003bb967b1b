pub mod approved_item;
pub mod corpus_url;
pub mod rejected_item;

pub use approved_item::*;
pub use corpus_url::*;
pub use rejected_item::*;
