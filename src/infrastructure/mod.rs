//! Infrastructure layer implementations
//!
//! The in-memory relational backend holding the materialized content graph tables, its
//! transactions, and the event log seam.

mod event_log;
mod store;
mod tables;
mod transaction;

pub use event_log::{EventLog, EventLogError, InMemoryEventLog};
pub use store::{ContentGraphStore, TablesSnapshot};
pub use tables::{
    ContentStreamRecord, GraphTables, HierarchyEdge, HierarchyEdgeKey, NodeRecord,
    ProjectionCheckpoint, ReferenceEdge, ReferenceEdgeKey, RestrictionEdge, RestrictionEdgeKey,
};
pub use transaction::Transaction;
