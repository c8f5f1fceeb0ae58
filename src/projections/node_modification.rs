//! Property, reference and type mutations, all through copy-on-write

use super::event_applier::EventApplier;
use super::{MissingRecord, ProjectionResult};
use crate::events::{NodeAggregateTypeWasChanged, NodePropertiesWereSet, NodeReferencesWereSet};
use crate::infrastructure::ReferenceEdge;
use crate::value_objects::NodeRelationAnchorPoint;

impl EventApplier<'_, '_> {
    pub(super) fn when_node_properties_were_set(
        &mut self,
        event: &NodePropertiesWereSet,
    ) -> ProjectionResult<()> {
        let anchor = self
            .tx
            .find_node_by_origin(
                &event.content_stream_id,
                &event.node_aggregate_id,
                &event.origin_dimension_space_point,
            )
            .map(|node| node.relation_anchor_point)
            .ok_or_else(|| self.missing(MissingRecord::SourceNode))?;

        self.update_node_with_copy_on_write(&event.content_stream_id, anchor, |node| {
            node.properties = node
                .properties
                .merge(&event.property_values)
                .unset(&event.properties_to_unset);
        })?;
        Ok(())
    }

    pub(super) fn when_node_references_were_set(
        &mut self,
        event: &NodeReferencesWereSet,
    ) -> ProjectionResult<()> {
        let source = self
            .tx
            .find_node_by_origin(
                &event.content_stream_id,
                &event.source_node_aggregate_id,
                &event.source_origin_dimension_space_point,
            )
            .map(|node| node.relation_anchor_point)
            .ok_or_else(|| self.missing(MissingRecord::SourceNode))?;
        let anchor = self.update_node_with_copy_on_write(&event.content_stream_id, source, |_| {})?;

        let replaced: Vec<ReferenceEdge> = self
            .tx
            .references_of(anchor)
            .into_iter()
            .filter(|reference| reference.name == event.reference_name)
            .cloned()
            .collect();
        for reference in replaced {
            self.tx.remove_reference_edge(&reference.key());
        }

        for (position, reference) in (0u32..).zip(&event.references) {
            self.tx.put_reference_edge(ReferenceEdge {
                node_anchor_point: anchor,
                name: event.reference_name.clone(),
                position,
                target_node_aggregate_id: reference.target_node_aggregate_id.clone(),
                properties: reference.properties.clone(),
            });
        }
        Ok(())
    }

    pub(super) fn when_node_aggregate_type_was_changed(
        &mut self,
        event: &NodeAggregateTypeWasChanged,
    ) -> ProjectionResult<()> {
        let anchors: Vec<NodeRelationAnchorPoint> = self
            .tx
            .nodes_of_aggregate_in(&event.content_stream_id, &event.node_aggregate_id)
            .into_iter()
            .map(|node| node.relation_anchor_point)
            .collect();
        if anchors.is_empty() {
            return Err(self.missing(MissingRecord::NodeAggregate(
                event.node_aggregate_id.clone(),
            )));
        }

        for anchor in anchors {
            self.update_node_with_copy_on_write(&event.content_stream_id, anchor, |node| {
                node.node_type_name = event.new_node_type_name.clone();
            })?;
        }
        Ok(())
    }
}
