//! The content graph projection
//!
//! Applies events from the log to the materialized tables strictly in sequence order.
//! Each event and its checkpoint advance are committed in one transaction, so a crash
//! at any point leaves the tables at the last committed checkpoint.

use super::event_applier::EventApplier;
use super::{ProjectionConfig, ProjectionError, ProjectionResult};
use crate::domain_events::ContentGraphEvent;
use crate::events::EventEnvelope;
use crate::infrastructure::{
    ContentGraphStore, EventLog, ProjectionCheckpoint, TablesSnapshot,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, error, info, trace, warn};

/// What happened to one delivered event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The event mutated the tables
    Applied,
    /// The event was at or before the checkpoint
    AlreadyApplied,
    /// The event was skipped without mutation, the checkpoint advanced
    Skipped,
}

/// Checkpoint and table sizes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionStatus {
    /// The last applied event
    pub checkpoint: ProjectionCheckpoint,
    /// Rows in `nodes`
    pub node_count: usize,
    /// Rows in `hierarchy_edges`
    pub hierarchy_edge_count: usize,
    /// Rows in `restriction_edges`
    pub restriction_edge_count: usize,
    /// Rows in `reference_edges`
    pub reference_edge_count: usize,
    /// Known content streams
    pub content_stream_count: usize,
}

/// Single-writer projection of the event log into a [`ContentGraphStore`]
pub struct ContentGraphProjection {
    store: ContentGraphStore,
    config: ProjectionConfig,
    writer: Mutex<()>,
}

impl ContentGraphProjection {
    /// Create a projection writing into `store`
    pub fn new(store: ContentGraphStore, config: ProjectionConfig) -> ProjectionResult<Self> {
        config.validate()?;
        Ok(Self {
            store,
            config,
            writer: Mutex::new(()),
        })
    }

    /// Create a projection with the default configuration
    pub fn with_store(store: ContentGraphStore) -> Self {
        Self {
            store,
            config: ProjectionConfig::default(),
            writer: Mutex::new(()),
        }
    }

    /// The store the projection writes into
    pub fn store(&self) -> &ContentGraphStore {
        &self.store
    }

    /// The active configuration
    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Apply one event. Redelivery of an already applied event is a no-op.
    pub async fn apply(&self, envelope: &EventEnvelope) -> ProjectionResult<ApplyOutcome> {
        let _writer = self.writer.lock().await;
        self.apply_exclusive(envelope)
    }

    /// Apply everything the log holds after the checkpoint; returns the number of
    /// events that advanced the checkpoint
    pub async fn catch_up(&self, log: &dyn EventLog) -> ProjectionResult<usize> {
        let _writer = self.writer.lock().await;
        let mut advanced = 0;
        loop {
            let from = self.store.read().checkpoint().next_sequence_number();
            let batch = log.read_from(from, self.config.catch_up_batch_size).await?;
            if batch.is_empty() {
                break;
            }
            let batch_len = batch.len();
            for envelope in &batch {
                if self.apply_exclusive(envelope)? != ApplyOutcome::AlreadyApplied {
                    advanced += 1;
                }
            }
            info!(from = %from, events = batch_len, "caught up content graph batch");
            if batch_len < self.config.catch_up_batch_size {
                break;
            }
        }
        Ok(advanced)
    }

    /// Truncate all tables and the checkpoint for a full replay
    pub async fn reset(&self) {
        let _writer = self.writer.lock().await;
        self.store.truncate();
        info!("reset content graph projection");
    }

    /// Export the tables together with their checkpoint
    pub async fn snapshot(&self) -> TablesSnapshot {
        let _writer = self.writer.lock().await;
        self.store.export_snapshot()
    }

    /// Replace the tables and the checkpoint with a persisted snapshot; the next
    /// `catch_up` continues after the snapshot's checkpoint
    pub async fn restore(&self, snapshot: TablesSnapshot) {
        let _writer = self.writer.lock().await;
        let checkpoint = snapshot.checkpoint.clone();
        self.store.import_snapshot(snapshot);
        info!(
            sequence_number = ?checkpoint.sequence_number,
            "restored content graph projection from snapshot"
        );
    }

    /// The last applied event
    pub fn checkpoint(&self) -> ProjectionCheckpoint {
        self.store.read().checkpoint().clone()
    }

    /// Checkpoint and table sizes
    pub fn status(&self) -> ProjectionStatus {
        let tables = self.store.read();
        ProjectionStatus {
            checkpoint: tables.checkpoint().clone(),
            node_count: tables.nodes().count(),
            hierarchy_edge_count: tables.hierarchy_edges().count(),
            restriction_edge_count: tables.restriction_edges().count(),
            reference_edge_count: tables.reference_edges().count(),
            content_stream_count: tables.content_streams().count(),
        }
    }

    fn apply_exclusive(&self, envelope: &EventEnvelope) -> ProjectionResult<ApplyOutcome> {
        let expected = self.store.read().checkpoint().next_sequence_number();
        if envelope.sequence_number < expected {
            debug!(
                sequence_number = %envelope.sequence_number,
                event_type = %envelope.event_type,
                "skipping already applied event"
            );
            return Ok(ApplyOutcome::AlreadyApplied);
        }
        if envelope.sequence_number > expected && !self.config.allow_sequence_gaps {
            error!(
                expected = %expected,
                sequence_number = %envelope.sequence_number,
                "sequence gap in content graph event stream"
            );
            return Err(ProjectionError::SequenceGap {
                expected,
                actual: envelope.sequence_number,
            });
        }

        let event = self.decode(envelope)?;
        let checkpoint = ProjectionCheckpoint {
            sequence_number: Some(envelope.sequence_number),
            event_id: Some(envelope.event_id),
            recorded_at: Some(envelope.recorded_at),
        };
        let relation_offset = self.config.relation_default_offset;

        let result: ProjectionResult<()> = self.store.transactional(|tx| {
            if let Some(event) = &event {
                EventApplier::new(tx, relation_offset, envelope.recorded_at).apply(event)?;
            }
            tx.set_checkpoint(checkpoint);
            Ok(())
        });
        if let Err(e) = result {
            error!(
                sequence_number = %envelope.sequence_number,
                event_type = %envelope.event_type,
                error = %e,
                "content graph projection failed"
            );
            return Err(e);
        }

        match event {
            Some(event) => {
                debug!(
                    sequence_number = %envelope.sequence_number,
                    event_type = event.event_type(),
                    content_stream_id = %event.content_stream_id(),
                    "applied content graph event"
                );
                Ok(ApplyOutcome::Applied)
            }
            None => Ok(ApplyOutcome::Skipped),
        }
    }

    /// Decode the envelope; `None` for the event types skipped by compatibility rules
    fn decode(&self, envelope: &EventEnvelope) -> ProjectionResult<Option<ContentGraphEvent>> {
        let event_type = envelope.event_type.as_str();
        if ContentGraphEvent::is_graph_event_type(event_type) {
            return ContentGraphEvent::from_envelope(envelope)
                .map(Some)
                .map_err(|source| {
                    error!(
                        sequence_number = %envelope.sequence_number,
                        event_type,
                        "content graph event could not be decoded"
                    );
                    ProjectionError::EventDecoding {
                        event_type: event_type.to_string(),
                        source,
                    }
                });
        }
        if self.config.is_skipped_legacy_event_type(event_type) {
            warn!(
                sequence_number = %envelope.sequence_number,
                event_type,
                "skipping legacy event"
            );
            return Ok(None);
        }
        if ContentGraphEvent::NON_GRAPH_EVENT_TYPES.contains(&event_type) {
            trace!(
                sequence_number = %envelope.sequence_number,
                event_type,
                "event does not affect the content graph"
            );
            return Ok(None);
        }
        error!(
            sequence_number = %envelope.sequence_number,
            event_type,
            "unsupported event type"
        );
        Err(ProjectionError::UnsupportedEventType(event_type.to_string()))
    }
}
