//! Ordered event log seam
//!
//! The durable log lives outside this crate; [`InMemoryEventLog`] is the in-process
//! implementation used for wiring and tests.

use crate::domain_events::ContentGraphEvent;
use crate::events::{EventEnvelope, EventId, SequenceNumber};
use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors raised by an event log
#[derive(Debug, Error)]
pub enum EventLogError {
    /// The backend failed
    #[error("event log backend failure: {0}")]
    Backend(#[from] anyhow::Error),

    /// An event could not be serialized
    #[error("event could not be serialized: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Ordered log of events with monotonic sequence numbers
#[async_trait]
pub trait EventLog: Send + Sync {
    /// Append typed events, returning their envelopes
    async fn append(
        &self,
        events: Vec<ContentGraphEvent>,
    ) -> Result<Vec<EventEnvelope>, EventLogError>;

    /// Append an untyped event, e.g. one written by another component
    async fn append_raw(
        &self,
        event_type: &str,
        payload: serde_json::Value,
    ) -> Result<EventEnvelope, EventLogError>;

    /// Read up to `limit` events starting at `from`
    async fn read_from(
        &self,
        from: SequenceNumber,
        limit: usize,
    ) -> Result<Vec<EventEnvelope>, EventLogError>;

    /// Sequence number of the last event, if any
    async fn head(&self) -> Result<Option<SequenceNumber>, EventLogError>;
}

/// Event log kept in memory
#[derive(Default)]
pub struct InMemoryEventLog {
    events: RwLock<Vec<EventEnvelope>>,
}

impl InMemoryEventLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    fn envelope(position: usize, event_type: String, payload: serde_json::Value) -> EventEnvelope {
        EventEnvelope {
            sequence_number: SequenceNumber::new(position as u64 + 1),
            event_id: EventId::new(),
            recorded_at: Utc::now(),
            event_type,
            payload,
        }
    }
}

#[async_trait]
impl EventLog for InMemoryEventLog {
    async fn append(
        &self,
        events: Vec<ContentGraphEvent>,
    ) -> Result<Vec<EventEnvelope>, EventLogError> {
        let mut serialized = Vec::with_capacity(events.len());
        for event in events {
            serialized.push(event.into_parts()?);
        }

        let mut log = self.events.write().await;
        let mut appended = Vec::with_capacity(serialized.len());
        for (event_type, payload) in serialized {
            let envelope = Self::envelope(log.len(), event_type, payload);
            log.push(envelope.clone());
            appended.push(envelope);
        }
        Ok(appended)
    }

    async fn append_raw(
        &self,
        event_type: &str,
        payload: serde_json::Value,
    ) -> Result<EventEnvelope, EventLogError> {
        let mut log = self.events.write().await;
        let envelope = Self::envelope(log.len(), event_type.to_string(), payload);
        log.push(envelope.clone());
        Ok(envelope)
    }

    async fn read_from(
        &self,
        from: SequenceNumber,
        limit: usize,
    ) -> Result<Vec<EventEnvelope>, EventLogError> {
        let log = self.events.read().await;
        let start = from.value().saturating_sub(1) as usize;
        Ok(log.iter().skip(start).take(limit).cloned().collect())
    }

    async fn head(&self) -> Result<Option<SequenceNumber>, EventLogError> {
        let log = self.events.read().await;
        Ok(log.last().map(|e| e.sequence_number))
    }
}
