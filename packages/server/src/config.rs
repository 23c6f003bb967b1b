use anyhow::{ensure, Context, Result};
use dotenvy::dotenv;
use std::env;

pub const DEFAULT_EVENT_SUBJECT_PREFIX: &str = "curated_corpus";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Runtime settings, read from the environment (and `.env` in development).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    /// Without a NATS server, events are written to the log instead.
    pub nats_url: Option<String>,
    pub event_subject_prefix: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let _ = dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let set = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let database_max_connections = match set("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a valid number")?,
            None => DEFAULT_MAX_CONNECTIONS,
        };
        ensure!(
            database_max_connections > 0,
            "DATABASE_MAX_CONNECTIONS must be at least 1"
        );

        let event_subject_prefix = set("EVENT_SUBJECT_PREFIX")
            .map(|prefix| prefix.trim().trim_end_matches('.').to_string())
            .unwrap_or_else(|| DEFAULT_EVENT_SUBJECT_PREFIX.to_string());
        ensure!(
            !event_subject_prefix.contains(char::is_whitespace),
            "EVENT_SUBJECT_PREFIX must not contain whitespace"
        );

        Ok(Self {
            database_url: set("DATABASE_URL").context("DATABASE_URL must be set")?,
            database_max_connections,
            nats_url: set("NATS_URL"),
            event_subject_prefix,
        })
    }
}
