// TestDependencies - in-memory implementations for testing
//
// Builds CorpusDeps over the in-memory store and the recording NATS publisher.

use std::sync::Arc;

use super::{CorpusDeps, CorpusEvent, MemoryStore, NatsEventSink, TestNats};
use crate::config::DEFAULT_EVENT_SUBJECT_PREFIX;
use crate::domains::surfaces::SurfaceRegistry;

pub struct TestDependencies {
    pub store: Arc<MemoryStore>,
    pub nats: Arc<TestNats>,
    pub surfaces: SurfaceRegistry,
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            nats: Arc::new(TestNats::new()),
            surfaces: SurfaceRegistry::default(),
        }
    }

    /// Use a custom surface registry
    pub fn with_surfaces(mut self, surfaces: SurfaceRegistry) -> Self {
        self.surfaces = surfaces;
        self
    }

    /// Build CorpusDeps sharing this store and publisher
    pub fn deps(&self) -> CorpusDeps {
        CorpusDeps::new(
            self.store.clone(),
            Arc::new(NatsEventSink::new(
                self.nats.clone(),
                DEFAULT_EVENT_SUBJECT_PREFIX,
            )),
            Arc::new(self.surfaces.clone()),
        )
    }

    /// Make every subsequent publish fail
    pub fn break_event_delivery(&self) {
        self.nats.set_unavailable(true);
    }

    /// Every event published so far, in order
    pub fn events(&self) -> Vec<CorpusEvent> {
        self.nats
            .published_messages()
            .iter()
            .filter_map(|msg| msg.json().ok())
            .collect()
    }
}
