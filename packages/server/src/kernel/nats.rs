//! Transport for corpus events.
//!
//! [`NatsEventSink`](super::NatsEventSink) only sees a [`NatsPublisher`]. In
//! production that is an `async_nats::Client`; tests use [`TestNats`], which
//! keeps an in-memory log and can be switched into an outage.

use anyhow::{bail, Result};
use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::sync::{Mutex, MutexGuard};

/// One message as it went over the wire.
#[derive(Debug, Clone)]
pub struct PublishedMessage {
    pub subject: String,
    pub payload: Bytes,
}

impl PublishedMessage {
    /// Decode the payload as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.payload)
    }
}

#[async_trait]
pub trait NatsPublisher: Send + Sync {
    async fn publish(&self, subject: String, payload: Bytes) -> Result<()>;
}

pub struct NatsClientPublisher {
    client: async_nats::Client,
}

impl NatsClientPublisher {
    pub fn new(client: async_nats::Client) -> Self {
        Self { client }
    }

    pub async fn connect(url: &str) -> Result<Self> {
        Ok(Self::new(async_nats::connect(url).await?))
    }
}

#[async_trait]
impl NatsPublisher for NatsClientPublisher {
    /// Flushes after each publish: a mutation is only reported as delivered
    /// once the server has the bytes.
    async fn publish(&self, subject: String, payload: Bytes) -> Result<()> {
        self.client.publish(subject, payload).await?;
        self.client.flush().await?;
        Ok(())
    }
}

#[derive(Default)]
struct Outbox {
    sent: Vec<PublishedMessage>,
    down: bool,
}

/// Recording publisher for tests.
#[derive(Default)]
pub struct TestNats {
    outbox: Mutex<Outbox>,
}

impl TestNats {
    pub fn new() -> Self {
        Self::default()
    }

    fn outbox(&self) -> MutexGuard<'_, Outbox> {
        self.outbox.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// While set, every publish fails and nothing is recorded.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.outbox().down = unavailable;
    }

    pub fn published_messages(&self) -> Vec<PublishedMessage> {
        self.outbox().sent.clone()
    }

    pub fn messages_on(&self, subject: &str) -> Vec<PublishedMessage> {
        self.outbox()
            .sent
            .iter()
            .filter(|m| m.subject == subject)
            .cloned()
            .collect()
    }

    pub fn was_published_to(&self, subject: &str) -> bool {
        self.outbox().sent.iter().any(|m| m.subject == subject)
    }

    pub fn publish_count(&self) -> usize {
        self.outbox().sent.len()
    }
}

#[async_trait]
impl NatsPublisher for TestNats {
    async fn publish(&self, subject: String, payload: Bytes) -> Result<()> {
        let mut outbox = self.outbox();
        if outbox.down {
            bail!("nats unavailable: dropped message for {}", subject);
        }
        outbox.sent.push(PublishedMessage { subject, payload });
        Ok(())
    }
}
