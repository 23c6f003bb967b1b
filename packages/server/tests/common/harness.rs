//! Test harness over the in-memory store.
//!
//! Each test gets its own `MemoryStore` and `TestNats`, so tests never see
//! each other's rows or events. Postgres-backed tests use [`super::PgHarness`].

use std::sync::Arc;

use corpus_core::common::Actor;
use corpus_core::kernel::{CorpusDeps, CorpusEvent, MemoryStore, TestDependencies, TestNats};
use test_context::AsyncTestContext;

pub(super) fn init_tracing() {
    // Run tests with: RUST_LOG=debug cargo test -- --nocapture
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Test harness that manages test infrastructure.
///
/// # Example using test-context
///
/// ```ignore
/// use test_context::test_context;
///
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &TestHarness) {
///     let item = create_test_approved_item(&ctx.deps, "https://a.example/x").await;
///     // ... test code
/// }
/// ```
pub struct TestHarness {
    /// Deps handed to every action under test.
    pub deps: CorpusDeps,
    test_deps: TestDependencies,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new()
    }

    async fn teardown(self) {
        // In-memory state is dropped with the harness
    }
}

impl TestHarness {
    pub fn new() -> Self {
        init_tracing();
        let test_deps = TestDependencies::new();
        Self {
            deps: test_deps.deps(),
            test_deps,
        }
    }

    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.test_deps.store
    }

    pub fn nats(&self) -> &Arc<TestNats> {
        &self.test_deps.nats
    }

    /// Every event published so far, in order.
    pub fn events(&self) -> Vec<CorpusEvent> {
        self.test_deps.events()
    }

    /// Make every subsequent event publish fail.
    pub fn break_event_delivery(&self) {
        self.test_deps.break_event_delivery();
    }

    pub fn curator(&self) -> Actor {
        Actor::new("curator|ada")
    }
}
