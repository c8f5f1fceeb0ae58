//! Root and regular node creation, root coverage and renaming

use super::event_applier::EventApplier;
use super::{MissingRecord, ProjectionResult};
use crate::dimension::{DimensionSpacePointSet, OriginDimensionSpacePoint};
use crate::events::{
    NodeAggregateNameWasChanged, NodeAggregateWithNodeWasCreated,
    RootNodeAggregateDimensionsWereUpdated, RootNodeAggregateWithNodeWasCreated,
};
use crate::infrastructure::{HierarchyEdge, NodeRecord};
use crate::value_objects::{NodeRelationAnchorPoint, SerializedPropertyValues};

impl EventApplier<'_, '_> {
    pub(super) fn when_root_node_aggregate_with_node_was_created(
        &mut self,
        event: &RootNodeAggregateWithNodeWasCreated,
    ) -> ProjectionResult<()> {
        let anchor = self.tx.allocate_anchor();
        self.tx.put_node(NodeRecord {
            relation_anchor_point: anchor,
            node_aggregate_id: event.node_aggregate_id.clone(),
            origin_dimension_space_point: OriginDimensionSpacePoint::empty(),
            properties: SerializedPropertyValues::new(),
            node_type_name: event.node_type_name.clone(),
            classification: event.node_aggregate_classification,
            node_name: None,
        });

        for point in &event.covered_dimension_space_points {
            self.connect_hierarchy(
                &event.content_stream_id,
                NodeRelationAnchorPoint::ROOT_EDGE,
                anchor,
                point,
                None,
                None,
            );
        }
        Ok(())
    }

    pub(super) fn when_root_node_aggregate_dimensions_were_updated(
        &mut self,
        event: &RootNodeAggregateDimensionsWereUpdated,
    ) -> ProjectionResult<()> {
        let anchor = self
            .tx
            .nodes_of_aggregate_in(&event.content_stream_id, &event.node_aggregate_id)
            .first()
            .map(|node| node.relation_anchor_point)
            .ok_or_else(|| {
                self.missing(MissingRecord::NodeAggregate(event.node_aggregate_id.clone()))
            })?;

        let existing: Vec<HierarchyEdge> = self
            .tx
            .ingoing_edges(anchor)
            .filter(|edge| edge.content_stream_id == event.content_stream_id)
            .cloned()
            .collect();
        let mut connected = DimensionSpacePointSet::empty();
        for edge in existing {
            if event
                .covered_dimension_space_points
                .contains(&edge.dimension_space_point)
            {
                connected.insert(edge.dimension_space_point);
            } else {
                self.tx.remove_hierarchy_edge(&edge.key());
            }
        }

        for point in event.covered_dimension_space_points.difference(&connected).iter() {
            self.connect_hierarchy(
                &event.content_stream_id,
                NodeRelationAnchorPoint::ROOT_EDGE,
                anchor,
                point,
                None,
                None,
            );
        }
        Ok(())
    }

    pub(super) fn when_node_aggregate_with_node_was_created(
        &mut self,
        event: &NodeAggregateWithNodeWasCreated,
    ) -> ProjectionResult<()> {
        let cs = &event.content_stream_id;
        let anchor = self.tx.allocate_anchor();
        self.tx.put_node(NodeRecord {
            relation_anchor_point: anchor,
            node_aggregate_id: event.node_aggregate_id.clone(),
            origin_dimension_space_point: event.origin_dimension_space_point.clone(),
            properties: event.initial_property_values.clone(),
            node_type_name: event.node_type_name.clone(),
            classification: event.node_aggregate_classification,
            node_name: event.node_name.clone(),
        });

        for sibling in event.succeeding_siblings.iter() {
            let point = &sibling.dimension_space_point;

            let existing = self
                .tx
                .ingoing_edges_for_aggregate(
                    cs,
                    &event.node_aggregate_id,
                    &DimensionSpacePointSet::single(point.clone()),
                )
                .into_iter()
                .next();
            if let Some(existing) = existing {
                self.reassign_child(existing, anchor);
                continue;
            }

            let parent = self
                .tx
                .find_node_in_aggregate(cs, &event.parent_node_aggregate_id, point)
                .map(|node| node.relation_anchor_point)
                .ok_or_else(|| self.missing(MissingRecord::TargetParentNode))?;
            let succeeding = self.sibling_anchor(cs, sibling.node_aggregate_id.as_ref(), point);

            self.connect_hierarchy(cs, parent, anchor, point, succeeding, event.node_name.clone());
            self.inherit_restrictions_from_parent(
                cs,
                &event.parent_node_aggregate_id,
                &event.node_aggregate_id,
                point,
            );
        }
        Ok(())
    }

    pub(super) fn when_node_aggregate_name_was_changed(
        &mut self,
        event: &NodeAggregateNameWasChanged,
    ) -> ProjectionResult<()> {
        let tables = self.tables();
        let edges: Vec<HierarchyEdge> = tables
            .anchors_of_aggregate(&event.node_aggregate_id)
            .flat_map(|anchor| tables.ingoing_edges(anchor))
            .filter(|edge| edge.content_stream_id == event.content_stream_id)
            .cloned()
            .collect();
        for edge in edges {
            self.tx.put_hierarchy_edge(HierarchyEdge {
                name: Some(event.new_node_name.clone()),
                ..edge
            });
        }
        Ok(())
    }
}
