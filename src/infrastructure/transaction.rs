//! Transactions over the materialized tables
//!
//! A transaction holds the table write lock for its whole lifetime and journals the
//! previous value of every row it touches. Dropping an uncommitted transaction undoes
//! all of its writes in reverse order.

use super::tables::{
    ContentStreamRecord, GraphTables, HierarchyEdge, HierarchyEdgeKey, NodeRecord,
    ProjectionCheckpoint, ReferenceEdge, ReferenceEdgeKey, RestrictionEdge, RestrictionEdgeKey,
};
use crate::value_objects::{ContentStreamId, NodeRelationAnchorPoint};
use parking_lot::RwLockWriteGuard;
use std::ops::Deref;

enum UndoRecord {
    Node(NodeRelationAnchorPoint, Option<NodeRecord>),
    HierarchyEdge(HierarchyEdgeKey, Option<HierarchyEdge>),
    RestrictionEdge(RestrictionEdgeKey, Option<RestrictionEdge>),
    ReferenceEdge(ReferenceEdgeKey, Option<ReferenceEdge>),
    ContentStream(ContentStreamId, Option<ContentStreamRecord>),
    Checkpoint(ProjectionCheckpoint),
    LastAnchor(u64),
}

/// Exclusive, journaled write access to the tables
pub struct Transaction<'a> {
    tables: RwLockWriteGuard<'a, GraphTables>,
    journal: Vec<UndoRecord>,
    finished: bool,
}

impl<'a> Transaction<'a> {
    pub(crate) fn begin(tables: RwLockWriteGuard<'a, GraphTables>) -> Self {
        Self {
            tables,
            journal: Vec::new(),
            finished: false,
        }
    }

    /// Keep all writes
    pub fn commit(mut self) {
        self.journal.clear();
        self.finished = true;
    }

    /// Undo all writes
    pub fn rollback(mut self) {
        self.undo();
        self.finished = true;
    }

    /// Number of journaled writes
    pub fn write_count(&self) -> usize {
        self.journal.len()
    }

    fn undo(&mut self) {
        while let Some(record) = self.journal.pop() {
            match record {
                UndoRecord::Node(anchor, previous) => {
                    self.tables.replace_node(anchor, previous);
                }
                UndoRecord::HierarchyEdge(key, previous) => {
                    self.tables.replace_hierarchy_edge(key, previous);
                }
                UndoRecord::RestrictionEdge(key, previous) => {
                    self.tables.replace_restriction_edge(key, previous);
                }
                UndoRecord::ReferenceEdge(key, previous) => {
                    self.tables.replace_reference_edge(key, previous);
                }
                UndoRecord::ContentStream(id, previous) => {
                    self.tables.replace_content_stream(id, previous);
                }
                UndoRecord::Checkpoint(previous) => {
                    self.tables.replace_checkpoint(previous);
                }
                UndoRecord::LastAnchor(previous) => {
                    self.tables.replace_last_anchor(previous);
                }
            }
        }
    }

    /// Allocate the anchor for a new node row
    pub fn allocate_anchor(&mut self) -> NodeRelationAnchorPoint {
        let next = self.tables.last_anchor() + 1;
        let previous = self.tables.replace_last_anchor(next);
        self.journal.push(UndoRecord::LastAnchor(previous));
        NodeRelationAnchorPoint::from_u64(next)
    }

    /// Insert or replace a node row
    pub fn put_node(&mut self, node: NodeRecord) {
        let anchor = node.relation_anchor_point;
        let previous = self.tables.replace_node(anchor, Some(node));
        self.journal.push(UndoRecord::Node(anchor, previous));
    }

    /// Delete a node row
    pub fn remove_node(&mut self, anchor: NodeRelationAnchorPoint) -> Option<NodeRecord> {
        let previous = self.tables.replace_node(anchor, None);
        self.journal.push(UndoRecord::Node(anchor, previous.clone()));
        previous
    }

    /// Insert or replace a hierarchy edge
    pub fn put_hierarchy_edge(&mut self, edge: HierarchyEdge) {
        let key = edge.key();
        let previous = self.tables.replace_hierarchy_edge(key.clone(), Some(edge));
        self.journal.push(UndoRecord::HierarchyEdge(key, previous));
    }

    /// Delete a hierarchy edge
    pub fn remove_hierarchy_edge(&mut self, key: &HierarchyEdgeKey) -> Option<HierarchyEdge> {
        let previous = self.tables.replace_hierarchy_edge(key.clone(), None);
        self.journal
            .push(UndoRecord::HierarchyEdge(key.clone(), previous.clone()));
        previous
    }

    /// Insert or replace a restriction edge; an empty affected set deletes it
    pub fn put_restriction_edge(&mut self, edge: RestrictionEdge) {
        let key = edge.key();
        let edge = if edge.affected_node_aggregate_ids.is_empty() {
            None
        } else {
            Some(edge)
        };
        let previous = self.tables.replace_restriction_edge(key.clone(), edge);
        self.journal.push(UndoRecord::RestrictionEdge(key, previous));
    }

    /// Delete a restriction edge
    pub fn remove_restriction_edge(&mut self, key: &RestrictionEdgeKey) -> Option<RestrictionEdge> {
        let previous = self.tables.replace_restriction_edge(key.clone(), None);
        self.journal
            .push(UndoRecord::RestrictionEdge(key.clone(), previous.clone()));
        previous
    }

    /// Insert or replace a reference edge
    pub fn put_reference_edge(&mut self, edge: ReferenceEdge) {
        let key = edge.key();
        let previous = self.tables.replace_reference_edge(key.clone(), Some(edge));
        self.journal.push(UndoRecord::ReferenceEdge(key, previous));
    }

    /// Delete a reference edge
    pub fn remove_reference_edge(&mut self, key: &ReferenceEdgeKey) -> Option<ReferenceEdge> {
        let previous = self.tables.replace_reference_edge(key.clone(), None);
        self.journal
            .push(UndoRecord::ReferenceEdge(key.clone(), previous.clone()));
        previous
    }

    /// Insert or replace a content stream record
    pub fn put_content_stream(&mut self, record: ContentStreamRecord) {
        let id = record.content_stream_id.clone();
        let previous = self.tables.replace_content_stream(id.clone(), Some(record));
        self.journal.push(UndoRecord::ContentStream(id, previous));
    }

    /// Delete a content stream record
    pub fn remove_content_stream(&mut self, id: &ContentStreamId) -> Option<ContentStreamRecord> {
        let previous = self.tables.replace_content_stream(id.clone(), None);
        self.journal
            .push(UndoRecord::ContentStream(id.clone(), previous.clone()));
        previous
    }

    /// Advance the checkpoint
    pub fn set_checkpoint(&mut self, checkpoint: ProjectionCheckpoint) {
        let previous = self.tables.replace_checkpoint(checkpoint);
        self.journal.push(UndoRecord::Checkpoint(previous));
    }
}

impl Deref for Transaction<'_> {
    type Target = GraphTables;

    fn deref(&self) -> &Self::Target {
        &self.tables
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.finished && !self.journal.is_empty() {
            tracing::warn!(
                writes = self.journal.len(),
                "rolling back unfinished content graph transaction"
            );
            self.undo();
        }
    }
}
