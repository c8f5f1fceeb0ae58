//! Projection errors
//!
//! Any failure while applying an already committed event is an operational or replay
//! bug: the projection stops rather than let the tables drift from the log.

use crate::events::SequenceNumber;
use crate::infrastructure::EventLogError;
use crate::value_objects::NodeAggregateId;
use thiserror::Error;

/// Record an event needed but could not find
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MissingRecord {
    /// The node the event operates on
    #[error("the source node is missing")]
    SourceNode,
    /// The parent of the source node
    #[error("the source parent node is missing")]
    SourceParentNode,
    /// The parent in a target dimension space point
    #[error("the target parent node is missing")]
    TargetParentNode,
    /// The inbound edge of the source node at its origin
    #[error("the ingoing source hierarchy relation is missing")]
    IngoingSourceHierarchyRelation,
    /// Any row of an aggregate
    #[error("node aggregate {0} has no node in the content stream")]
    NodeAggregate(NodeAggregateId),
}

/// Errors of the content graph projection
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// A record the event depends on does not exist
    #[error("{event_type} could not be applied to the content graph: {missing}")]
    EventCouldNotBeApplied {
        /// The failing event type
        event_type: &'static str,
        /// What was missing
        missing: MissingRecord,
    },

    /// The event does not follow the checkpoint
    #[error("expected sequence number {expected} but received {actual}")]
    SequenceGap {
        /// Next expected sequence number
        expected: SequenceNumber,
        /// Received sequence number
        actual: SequenceNumber,
    },

    /// The event type is neither handled nor explicitly skipped
    #[error("unsupported event type {0}")]
    UnsupportedEventType(String),

    /// The payload does not match its type
    #[error("event {event_type} could not be decoded: {source}")]
    EventDecoding {
        /// The event type
        event_type: String,
        /// Decoding failure
        #[source]
        source: serde_json::Error,
    },

    /// The projection configuration is invalid
    #[error("invalid projection configuration: {0}")]
    InvalidConfiguration(String),

    /// Reading the log failed
    #[error(transparent)]
    EventLog(#[from] EventLogError),
}

/// Result type of the projection
pub type ProjectionResult<T> = Result<T, ProjectionError>;
