//! Corpus change events and the sinks that deliver them.
//!
//! Events are emitted strictly after the write they describe has committed.
//! Delivery is best-effort: a failed emit is logged and reported back to the
//! caller through [`NotificationStatus::Failed`], never as an error.

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

use crate::common::{Actor, EventId, ScheduledItemExternalId};
use crate::domains::approved_items::models::{ApprovedItem, RejectedItem};
use crate::domains::schedule_reviews::models::ScheduleReview;
use crate::domains::scheduled_items::models::ScheduledItem;
use crate::kernel::nats::NatsPublisher;
use crate::kernel::traits::BaseEventSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CorpusEventType {
    ScheduledItemAdded,
    ScheduledItemRemoved,
    ScheduledItemRescheduled,
    ScheduleReviewed,
    ApprovedItemAdded,
    ApprovedItemUpdated,
    ApprovedItemRemoved,
    RejectedItemAdded,
}

impl CorpusEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CorpusEventType::ScheduledItemAdded => "SCHEDULED_ITEM_ADDED",
            CorpusEventType::ScheduledItemRemoved => "SCHEDULED_ITEM_REMOVED",
            CorpusEventType::ScheduledItemRescheduled => "SCHEDULED_ITEM_RESCHEDULED",
            CorpusEventType::ScheduleReviewed => "SCHEDULE_REVIEWED",
            CorpusEventType::ApprovedItemAdded => "APPROVED_ITEM_ADDED",
            CorpusEventType::ApprovedItemUpdated => "APPROVED_ITEM_UPDATED",
            CorpusEventType::ApprovedItemRemoved => "APPROVED_ITEM_REMOVED",
            CorpusEventType::RejectedItemAdded => "REJECTED_ITEM_ADDED",
        }
    }

    /// NATS subject for this event type under `prefix`.
    pub fn subject(&self, prefix: &str) -> String {
        format!("{}.{}", prefix, self.as_str().to_lowercase())
    }
}

impl fmt::Display for CorpusEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a scheduling change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledItemPayload {
    pub scheduled_item: ScheduledItem,
    pub approved_item: ApprovedItem,
    /// Set on reschedule: the external id the assignment had before it was
    /// replaced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_scheduled_item_external_id: Option<ScheduledItemExternalId>,
    #[serde(default)]
    pub reasons: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "entity", rename_all = "snake_case")]
pub enum EventPayload {
    ScheduledItem(Box<ScheduledItemPayload>),
    ScheduleReview { review: ScheduleReview },
    ApprovedItem { approved_item: Box<ApprovedItem> },
    RejectedItem { rejected_item: RejectedItem },
}

/// One structured notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusEvent {
    /// Fresh for every event, never the id of the entity it describes.
    pub event_id: EventId,
    pub event_type: CorpusEventType,
    pub actor: Actor,
    pub timestamp: DateTime<Utc>,
    pub payload: EventPayload,
}

impl CorpusEvent {
    pub fn new(event_type: CorpusEventType, actor: &Actor, payload: EventPayload) -> Self {
        Self {
            event_id: EventId::new(),
            event_type,
            actor: actor.clone(),
            timestamp: Utc::now(),
            payload,
        }
    }

    pub fn scheduled_item(&self) -> Option<&ScheduledItemPayload> {
        match &self.payload {
            EventPayload::ScheduledItem(payload) => Some(payload),
            _ => None,
        }
    }
}

// =============================================================================
// Delivery outcome
// =============================================================================

/// Whether the event describing a committed write reached the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationStatus {
    Delivered,
    /// Nothing changed, so nothing was emitted.
    Skipped,
    /// The write committed but its event could not be delivered.
    Failed(String),
}

/// A committed write plus the fate of its notification.
#[derive(Debug, Clone)]
pub struct Committed<T> {
    pub value: T,
    pub notification: NotificationStatus,
}

impl<T> Committed<T> {
    pub fn skipped(value: T) -> Self {
        Self {
            value,
            notification: NotificationStatus::Skipped,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.notification, NotificationStatus::Failed(_))
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// Emit `event` and fold the result into a `Committed`.
pub async fn notify<T>(sink: &dyn BaseEventSink, value: T, event: CorpusEvent) -> Committed<T> {
    let notification = match sink.emit(&event).await {
        Ok(()) => NotificationStatus::Delivered,
        Err(e) => {
            warn!(
                event_id = %event.event_id,
                event_type = %event.event_type,
                error = %e,
                "Failed to emit corpus event; write already committed"
            );
            NotificationStatus::Failed(e.to_string())
        }
    };
    Committed {
        value,
        notification,
    }
}

// =============================================================================
// Sinks
// =============================================================================

/// Publishes events as JSON to `<prefix>.<event_type>` subjects.
pub struct NatsEventSink {
    publisher: Arc<dyn NatsPublisher>,
    subject_prefix: String,
}

impl NatsEventSink {
    pub fn new(publisher: Arc<dyn NatsPublisher>, subject_prefix: impl Into<String>) -> Self {
        Self {
            publisher,
            subject_prefix: subject_prefix.into(),
        }
    }
}

#[async_trait]
impl BaseEventSink for NatsEventSink {
    async fn emit(&self, event: &CorpusEvent) -> Result<()> {
        let payload = serde_json::to_vec(event).context("Failed to serialize corpus event")?;
        let subject = event.event_type.subject(&self.subject_prefix);
        self.publisher
            .publish(subject.clone(), Bytes::from(payload))
            .await
            .with_context(|| format!("Failed to publish to {}", subject))?;
        Ok(())
    }
}

/// Writes events to the log. Used when no NATS server is configured.
#[derive(Default)]
pub struct TracingEventSink;

#[async_trait]
impl BaseEventSink for TracingEventSink {
    async fn emit(&self, event: &CorpusEvent) -> Result<()> {
        let payload = serde_json::to_string(&event.payload)?;
        info!(
            event_id = %event.event_id,
            event_type = %event.event_type,
            actor = %event.actor,
            payload = %payload,
            "corpus event"
        );
        Ok(())
    }
}
