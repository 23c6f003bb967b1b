//! Postgres-backed harness using testcontainers.
//!
//! Uses one shared container across all tests. The container and migrations
//! are initialized on first use, then reused. Tests that need it are
//! `#[ignore]`d because they require Docker:
//!
//! ```text
//! cargo test -- --ignored
//! ```

use anyhow::{Context, Result};
use std::sync::Arc;
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

use corpus_core::domains::surfaces::SurfaceRegistry;
use corpus_core::kernel::{CorpusDeps, NatsEventSink, PgCorpusStore, TestNats};
use corpus_core::DEFAULT_EVENT_SUBJECT_PREFIX;

use super::harness::init_tracing;

/// Shared test infrastructure that persists across all tests.
struct SharedTestInfra {
    db_url: String,
    // Keep the container alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
}

static SHARED_INFRA: OnceCell<SharedTestInfra> = OnceCell::const_new();

impl SharedTestInfra {
    async fn init() -> Result<Self> {
        init_tracing();

        let postgres = Postgres::default()
            .with_tag("16")
            .with_cmd(["-c", "max_connections=200"])
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let pg_host = postgres.get_host().await?;
        let pg_port = postgres.get_host_port_ipv4(5432).await?;
        let db_url = format!(
            "postgresql://postgres:postgres@{}:{}/postgres",
            pg_host, pg_port
        );

        // Run migrations once on the shared database
        let store = PgCorpusStore::connect(&db_url, 5).await?;
        store.migrate().await.context("Failed to run migrations")?;

        Ok(Self {
            db_url,
            _postgres: postgres,
        })
    }

    async fn get() -> &'static Self {
        SHARED_INFRA
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared test infrastructure")
            })
            .await
    }
}

/// Harness over a real Postgres store.
///
/// The database is shared by every test in the run, so tests must use fresh
/// URLs, dates and domain names rather than assume empty tables.
pub struct PgHarness {
    pub store: PgCorpusStore,
    pub nats: Arc<TestNats>,
    pub deps: CorpusDeps,
}

impl AsyncTestContext for PgHarness {
    async fn setup() -> Self {
        Self::new().await.expect("Failed to create Postgres harness")
    }

    async fn teardown(self) {
        self.store.pool().close().await;
    }
}

impl PgHarness {
    pub async fn new() -> Result<Self> {
        let infra = SharedTestInfra::get().await;

        let store = PgCorpusStore::connect(&infra.db_url, 5)
            .await
            .context("Failed to connect to test database")?;
        let nats = Arc::new(TestNats::new());
        let deps = CorpusDeps::new(
            Arc::new(store.clone()),
            Arc::new(NatsEventSink::new(nats.clone(), DEFAULT_EVENT_SUBJECT_PREFIX)),
            Arc::new(SurfaceRegistry::default()),
        );

        Ok(Self { store, nats, deps })
    }
}
