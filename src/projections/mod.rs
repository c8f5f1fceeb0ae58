//! The content graph projection
//!
//! Turns the event log into the materialized content graph tables. The per-event
//! handlers are grouped by concern; all of them run inside the transaction of the event
//! they handle.

mod config;
mod content_graph_projection;
mod content_stream;
mod copy_on_write;
mod dimension_adjustment;
mod error;
mod event_applier;
mod node_creation;
mod node_modification;
mod node_move;
mod node_removal;
mod node_variation;
mod positions;
mod restriction;

pub use config::ProjectionConfig;
pub use content_graph_projection::{ApplyOutcome, ContentGraphProjection, ProjectionStatus};
pub use error::{MissingRecord, ProjectionError, ProjectionResult};
pub use positions::determine_relation_position;
pub use restriction::descendant_closure;
