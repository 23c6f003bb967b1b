//! Kernel module - infrastructure and dependencies.

pub mod deps;
pub mod events;
pub mod memory_store;
pub mod nats;
pub mod pg_store;
pub mod test_dependencies;
pub mod traits;

pub use deps::CorpusDeps;
pub use events::{
    notify, Committed, CorpusEvent, CorpusEventType, EventPayload, NatsEventSink,
    NotificationStatus, ScheduledItemPayload, TracingEventSink,
};
pub use memory_store::MemoryStore;
pub use nats::{NatsClientPublisher, NatsPublisher, PublishedMessage, TestNats};
pub use pg_store::{PgCorpusStore, MIGRATOR};
pub use test_dependencies::TestDependencies;
pub use traits::*;
