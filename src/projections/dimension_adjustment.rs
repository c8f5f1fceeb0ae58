//! Structural adjustments of the dimension space
//!
//! Moving a point re-keys everything of one stream from the source to the target
//! point. Adding a shine-through makes the target point see the same graph as the
//! source point.

use super::event_applier::EventApplier;
use super::ProjectionResult;
use crate::dimension::OriginDimensionSpacePoint;
use crate::events::{DimensionShineThroughWasAdded, DimensionSpacePointWasMoved};
use crate::infrastructure::{HierarchyEdge, RestrictionEdge};
use crate::value_objects::NodeRelationAnchorPoint;
use std::collections::BTreeSet;

impl EventApplier<'_, '_> {
    pub(super) fn when_dimension_space_point_was_moved(
        &mut self,
        event: &DimensionSpacePointWasMoved,
    ) -> ProjectionResult<()> {
        let cs = &event.content_stream_id;
        let source_hash = event.source.hash().to_string();
        let target_origin = OriginDimensionSpacePoint::from(event.target.clone());

        let tables = self.tables();
        let authored: BTreeSet<NodeRelationAnchorPoint> = tables
            .hierarchy_edges_in(cs)
            .filter(|edge| edge.dimension_space_point.hash() == source_hash)
            .map(|edge| edge.child_node_anchor)
            .filter(|anchor| {
                tables
                    .node(*anchor)
                    .map_or(false, |node| node.origin_dimension_space_point.hash() == source_hash)
            })
            .collect();
        for anchor in authored {
            self.update_node_with_copy_on_write(cs, anchor, |node| {
                node.origin_dimension_space_point = target_origin.clone();
            })?;
        }

        let edges: Vec<HierarchyEdge> = self
            .tx
            .hierarchy_edges_in(cs)
            .filter(|edge| edge.dimension_space_point.hash() == source_hash)
            .cloned()
            .collect();
        for edge in edges {
            self.tx.remove_hierarchy_edge(&edge.key());
            self.tx.put_hierarchy_edge(HierarchyEdge {
                dimension_space_point: event.target.clone(),
                ..edge
            });
        }

        let restrictions: Vec<RestrictionEdge> = self
            .tx
            .restriction_edges_at(cs, &source_hash)
            .into_iter()
            .cloned()
            .collect();
        for restriction in restrictions {
            self.tx.remove_restriction_edge(&restriction.key());
            self.tx.put_restriction_edge(RestrictionEdge {
                dimension_space_point_hash: event.target.hash().to_string(),
                ..restriction
            });
        }
        Ok(())
    }

    pub(super) fn when_dimension_shine_through_was_added(
        &mut self,
        event: &DimensionShineThroughWasAdded,
    ) -> ProjectionResult<()> {
        let cs = &event.content_stream_id;
        let source_hash = event.source.hash();

        let edges: Vec<HierarchyEdge> = self
            .tx
            .hierarchy_edges_in(cs)
            .filter(|edge| edge.dimension_space_point.hash() == source_hash)
            .cloned()
            .collect();
        for edge in edges {
            self.tx.put_hierarchy_edge(HierarchyEdge {
                dimension_space_point: event.target.clone(),
                ..edge
            });
        }

        let restrictions: Vec<RestrictionEdge> = self
            .tx
            .restriction_edges_at(cs, source_hash)
            .into_iter()
            .cloned()
            .collect();
        for restriction in restrictions {
            self.tx.put_restriction_edge(RestrictionEdge {
                dimension_space_point_hash: event.target.hash().to_string(),
                ..restriction
            });
        }
        Ok(())
    }
}
