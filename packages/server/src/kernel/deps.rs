//! Corpus dependencies for actions (using traits for testability)
//!
//! This module provides the central dependency container used by every domain
//! action. Persistence and event delivery sit behind trait objects.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::domains::surfaces::SurfaceRegistry;
use crate::kernel::events::{NatsEventSink, TracingEventSink};
use crate::kernel::nats::NatsClientPublisher;
use crate::kernel::pg_store::PgCorpusStore;
use crate::kernel::traits::{BaseCorpusStore, BaseEventSink};

/// Dependencies accessible to actions
#[derive(Clone)]
pub struct CorpusDeps {
    pub store: Arc<dyn BaseCorpusStore>,
    pub events: Arc<dyn BaseEventSink>,
    /// Read-only surface lookup, loaded once at startup.
    pub surfaces: Arc<SurfaceRegistry>,
}

impl CorpusDeps {
    pub fn new(
        store: Arc<dyn BaseCorpusStore>,
        events: Arc<dyn BaseEventSink>,
        surfaces: Arc<SurfaceRegistry>,
    ) -> Self {
        Self {
            store,
            events,
            surfaces,
        }
    }

    /// Connect to Postgres (and NATS when configured) and build production deps.
    pub async fn connect(config: &Config) -> Result<(Self, PgCorpusStore)> {
        let store = PgCorpusStore::connect(&config.database_url, config.database_max_connections)
            .await
            .context("Failed to connect to database")?;

        let events: Arc<dyn BaseEventSink> = match &config.nats_url {
            Some(url) => {
                let publisher = NatsClientPublisher::connect(url)
                    .await
                    .with_context(|| format!("Failed to connect to NATS at {}", url))?;
                info!(url = %url, prefix = %config.event_subject_prefix, "Publishing corpus events to NATS");
                Arc::new(NatsEventSink::new(
                    Arc::new(publisher),
                    config.event_subject_prefix.clone(),
                ))
            }
            None => {
                info!("NATS_URL not set; corpus events are logged only");
                Arc::new(TracingEventSink)
            }
        };

        let deps = Self::new(
            Arc::new(store.clone()),
            events,
            Arc::new(SurfaceRegistry::default()),
        );
        Ok((deps, store))
    }
}
