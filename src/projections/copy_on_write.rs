//! Copy-on-write of node rows shared between content streams

use super::event_applier::EventApplier;
use super::{MissingRecord, ProjectionResult};
use crate::dimension::OriginDimensionSpacePoint;
use crate::infrastructure::{HierarchyEdge, NodeRecord, ReferenceEdge};
use crate::value_objects::{ContentStreamId, NodeRelationAnchorPoint};

impl EventApplier<'_, '_> {
    /// Apply `operation` to the row at `anchor` as seen from `content_stream_id`.
    ///
    /// A row referenced by more than one stream is cloned under a fresh anchor first and
    /// every edge of the current stream is repointed to the clone. Returns the anchor of
    /// the row that was actually written.
    pub(super) fn update_node_with_copy_on_write(
        &mut self,
        content_stream_id: &ContentStreamId,
        anchor: NodeRelationAnchorPoint,
        operation: impl FnOnce(&mut NodeRecord),
    ) -> ProjectionResult<NodeRelationAnchorPoint> {
        let mut node = self
            .tx
            .node(anchor)
            .cloned()
            .ok_or_else(|| self.missing(MissingRecord::SourceNode))?;

        if self.tx.content_streams_containing(anchor).len() <= 1 {
            operation(&mut node);
            self.tx.put_node(node);
            return Ok(anchor);
        }

        let copy_anchor = self.tx.allocate_anchor();
        node.relation_anchor_point = copy_anchor;
        operation(&mut node);
        self.tx.put_node(node);
        tracing::trace!(
            content_stream_id = %content_stream_id,
            source = %anchor,
            copy = %copy_anchor,
            "copied shared node before mutation"
        );

        let ingoing: Vec<HierarchyEdge> = self
            .tx
            .ingoing_edges(anchor)
            .filter(|edge| &edge.content_stream_id == content_stream_id)
            .cloned()
            .collect();
        for edge in ingoing {
            self.reassign_child(edge, copy_anchor);
        }

        let outgoing: Vec<HierarchyEdge> = self
            .tx
            .outgoing_edges(anchor)
            .filter(|edge| &edge.content_stream_id == content_stream_id)
            .cloned()
            .collect();
        for edge in outgoing {
            self.reassign_parent(edge, copy_anchor);
        }

        self.copy_reference_relations(anchor, copy_anchor);
        Ok(copy_anchor)
    }

    /// Clone `source` under a fresh anchor at another origin
    pub(super) fn copy_node_to_origin(
        &mut self,
        source: &NodeRecord,
        origin: &OriginDimensionSpacePoint,
    ) -> NodeRecord {
        let copy = NodeRecord {
            relation_anchor_point: self.tx.allocate_anchor(),
            origin_dimension_space_point: origin.clone(),
            ..source.clone()
        };
        self.tx.put_node(copy.clone());
        copy
    }

    /// Copy all reference rows of one row to another
    pub(super) fn copy_reference_relations(
        &mut self,
        source: NodeRelationAnchorPoint,
        target: NodeRelationAnchorPoint,
    ) {
        let references: Vec<ReferenceEdge> =
            self.tx.references_of(source).into_iter().cloned().collect();
        for reference in references {
            self.tx.put_reference_edge(ReferenceEdge {
                node_anchor_point: target,
                ..reference
            });
        }
    }

    /// Replace the child of an edge, keeping its position and name
    pub(super) fn reassign_child(&mut self, edge: HierarchyEdge, child: NodeRelationAnchorPoint) {
        self.tx.remove_hierarchy_edge(&edge.key());
        self.tx.put_hierarchy_edge(HierarchyEdge {
            child_node_anchor: child,
            ..edge
        });
    }

    /// Replace the parent of an edge, keeping its position and name
    pub(super) fn reassign_parent(&mut self, edge: HierarchyEdge, parent: NodeRelationAnchorPoint) {
        self.tx.remove_hierarchy_edge(&edge.key());
        self.tx.put_hierarchy_edge(HierarchyEdge {
            parent_node_anchor: parent,
            ..edge
        });
    }
}
