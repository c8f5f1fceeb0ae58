//! In-memory relational backend for the content graph tables

use super::tables::{
    ContentStreamRecord, GraphTables, HierarchyEdge, NodeRecord, ProjectionCheckpoint,
    ReferenceEdge, RestrictionEdge,
};
use super::Transaction;
use parking_lot::{RwLock, RwLockReadGuard};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared handle to the materialized tables
///
/// Readers take a shared lock per query; the projection takes the exclusive lock for
/// exactly one event's transaction.
#[derive(Clone, Default)]
pub struct ContentGraphStore {
    tables: Arc<RwLock<GraphTables>>,
}

impl ContentGraphStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared read access
    pub fn read(&self) -> RwLockReadGuard<'_, GraphTables> {
        self.tables.read()
    }

    /// Start a transaction
    pub fn begin(&self) -> Transaction<'_> {
        Transaction::begin(self.tables.write())
    }

    /// Run `operations` in a transaction, committing on success and rolling back on error
    pub fn transactional<T, E>(
        &self,
        operations: impl FnOnce(&mut Transaction<'_>) -> Result<T, E>,
    ) -> Result<T, E> {
        let mut transaction = self.begin();
        match operations(&mut transaction) {
            Ok(result) => {
                transaction.commit();
                Ok(result)
            }
            Err(error) => {
                transaction.rollback();
                Err(error)
            }
        }
    }

    /// Drop all rows and the checkpoint
    pub fn truncate(&self) {
        *self.tables.write() = GraphTables::default();
    }

    /// A copy of the current tables
    pub fn snapshot_tables(&self) -> GraphTables {
        self.tables.read().clone()
    }

    /// Export all rows for persistence
    pub fn export_snapshot(&self) -> TablesSnapshot {
        let tables = self.tables.read();
        TablesSnapshot {
            nodes: tables.nodes().cloned().collect(),
            hierarchy_edges: tables.hierarchy_edges().cloned().collect(),
            restriction_edges: tables.restriction_edges().cloned().collect(),
            reference_edges: tables.reference_edges().cloned().collect(),
            content_streams: tables.content_streams().cloned().collect(),
            checkpoint: tables.checkpoint().clone(),
            last_anchor: tables.last_anchor(),
        }
    }

    /// Create a store from persisted rows
    pub fn from_snapshot(snapshot: TablesSnapshot) -> Self {
        Self {
            tables: Arc::new(RwLock::new(snapshot.into_tables())),
        }
    }

    /// Replace all rows and the checkpoint with persisted ones. The projection calls this
    /// under its writer lock; see `ContentGraphProjection::restore`.
    pub(crate) fn import_snapshot(&self, snapshot: TablesSnapshot) {
        *self.tables.write() = snapshot.into_tables();
    }
}

impl TablesSnapshot {
    fn into_tables(self) -> GraphTables {
        let mut tables = GraphTables::default();
        for node in self.nodes {
            tables.replace_node(node.relation_anchor_point, Some(node));
        }
        for edge in self.hierarchy_edges {
            tables.replace_hierarchy_edge(edge.key(), Some(edge));
        }
        for edge in self.restriction_edges {
            tables.replace_restriction_edge(edge.key(), Some(edge));
        }
        for edge in self.reference_edges {
            tables.replace_reference_edge(edge.key(), Some(edge));
        }
        for record in self.content_streams {
            tables.replace_content_stream(record.content_stream_id.clone(), Some(record));
        }
        tables.replace_checkpoint(self.checkpoint);
        tables.replace_last_anchor(self.last_anchor);
        tables
    }
}

/// Persisted layout of the tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TablesSnapshot {
    /// `nodes`
    pub nodes: Vec<NodeRecord>,
    /// `hierarchy_edges`
    pub hierarchy_edges: Vec<HierarchyEdge>,
    /// `restriction_edges`
    pub restriction_edges: Vec<RestrictionEdge>,
    /// `reference_edges`
    pub reference_edges: Vec<ReferenceEdge>,
    /// Known content streams
    pub content_streams: Vec<ContentStreamRecord>,
    /// The single-row checkpoint
    pub checkpoint: ProjectionCheckpoint,
    /// Last allocated anchor
    pub last_anchor: u64,
}

impl TablesSnapshot {
    /// Serialize to JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
