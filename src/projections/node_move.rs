//! Moving node aggregates between parents and among siblings

use super::event_applier::EventApplier;
use super::{MissingRecord, ProjectionResult};
use crate::dimension::DimensionSpacePointSet;
use crate::events::NodeAggregateWasMoved;

impl EventApplier<'_, '_> {
    pub(super) fn when_node_aggregate_was_moved(
        &mut self,
        event: &NodeAggregateWasMoved,
    ) -> ProjectionResult<()> {
        let cs = &event.content_stream_id;
        let moved = &event.node_aggregate_id;

        for sibling in event.succeeding_siblings.iter() {
            let point = &sibling.dimension_space_point;
            let edge = self
                .tables()
                .ingoing_edges_for_aggregate(cs, moved, &DimensionSpacePointSet::single(point.clone()))
                .into_iter()
                .next()
                .ok_or_else(|| self.missing(MissingRecord::IngoingSourceHierarchyRelation))?;

            let parent = match &event.new_parent_node_aggregate_id {
                Some(new_parent) => self
                    .tables()
                    .find_node_in_aggregate(cs, new_parent, point)
                    .map(|node| node.relation_anchor_point)
                    .ok_or_else(|| self.missing(MissingRecord::TargetParentNode))?,
                None => edge.parent_node_anchor,
            };

            self.tx.remove_hierarchy_edge(&edge.key());
            let succeeding = self.sibling_anchor(
                cs,
                sibling.node_aggregate_id.as_ref().filter(|id| *id != moved),
                point,
            );
            self.connect_hierarchy(cs, parent, edge.child_node_anchor, point, succeeding, edge.name);
        }

        if let Some(new_parent) = &event.new_parent_node_aggregate_id {
            let points = event.succeeding_siblings.to_dimension_space_point_set();
            self.remove_inherited_restrictions(cs, moved, &points);
            self.cascade_restrictions_from_parent(cs, new_parent, moved, &points);
        }
        Ok(())
    }
}
