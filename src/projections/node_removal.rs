//! Removal of node aggregates

use super::event_applier::EventApplier;
use super::restriction::descendant_closure;
use super::ProjectionResult;
use crate::events::NodeAggregateWasRemoved;
use crate::infrastructure::{HierarchyEdge, ReferenceEdge};
use crate::value_objects::NodeRelationAnchorPoint;

impl EventApplier<'_, '_> {
    pub(super) fn when_node_aggregate_was_removed(
        &mut self,
        event: &NodeAggregateWasRemoved,
    ) -> ProjectionResult<()> {
        let cs = &event.content_stream_id;
        let covered = &event.affected_covered_dimension_space_points;
        let closure = descendant_closure(self.tables(), cs, &event.node_aggregate_id, covered);

        let ingoing = self
            .tables()
            .ingoing_edges_for_aggregate(cs, &event.node_aggregate_id, covered);
        for edge in ingoing {
            self.remove_relation_recursively(edge);
        }

        self.remove_restrictions_of_removed_subtree(cs, &event.node_aggregate_id, covered, closure);
        Ok(())
    }

    /// Remove an edge and, within its stream and point, the whole subtree below it.
    ///
    /// Rows left without any inbound edge in any stream are deleted with their references.
    pub(super) fn remove_relation_recursively(&mut self, edge: HierarchyEdge) {
        let mut stack = vec![edge];
        while let Some(edge) = stack.pop() {
            self.tx.remove_hierarchy_edge(&edge.key());
            let child = edge.child_node_anchor;
            stack.extend(
                self.tx
                    .child_edges(&edge.content_stream_id, edge.dimension_space_point.hash(), child)
                    .into_iter()
                    .cloned(),
            );
            self.remove_node_if_orphaned(child);
        }
    }

    /// Delete a row and its references once no stream has an inbound edge to it
    pub(super) fn remove_node_if_orphaned(&mut self, anchor: NodeRelationAnchorPoint) {
        if self.tx.has_ingoing_edges(anchor) || self.tx.node(anchor).is_none() {
            return;
        }
        let references: Vec<ReferenceEdge> =
            self.tx.references_of(anchor).into_iter().cloned().collect();
        for reference in references {
            self.tx.remove_reference_edge(&reference.key());
        }
        self.tx.remove_node(anchor);
        tracing::trace!(anchor = %anchor, "removed orphaned node");
    }
}
