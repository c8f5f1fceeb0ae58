//! Specialization, generalization and peer variants
//!
//! A variant is a new row of an existing aggregate at another origin. It takes over the
//! aggregate's edges at the points it covers, and is connected below the parent
//! aggregate wherever the aggregate had no edge yet.

use super::event_applier::EventApplier;
use super::{MissingRecord, ProjectionResult};
use crate::dimension::{DimensionSpacePointSet, OriginDimensionSpacePoint};
use crate::events::{
    InterdimensionalSiblings, NodeGeneralizationVariantWasCreated, NodePeerVariantWasCreated,
    NodeSpecializationVariantWasCreated,
};
use crate::infrastructure::HierarchyEdge;
use crate::value_objects::{ContentStreamId, NodeAggregateId};

#[derive(Clone, Copy, PartialEq, Eq)]
enum VariantKind {
    Specialization,
    Generalization,
    Peer,
}

impl EventApplier<'_, '_> {
    pub(super) fn when_node_specialization_variant_was_created(
        &mut self,
        event: &NodeSpecializationVariantWasCreated,
    ) -> ProjectionResult<()> {
        self.create_variant(
            VariantKind::Specialization,
            &event.content_stream_id,
            &event.node_aggregate_id,
            &event.source_origin,
            &event.specialization_origin,
            &event.specialization_siblings,
        )
    }

    pub(super) fn when_node_generalization_variant_was_created(
        &mut self,
        event: &NodeGeneralizationVariantWasCreated,
    ) -> ProjectionResult<()> {
        self.create_variant(
            VariantKind::Generalization,
            &event.content_stream_id,
            &event.node_aggregate_id,
            &event.source_origin,
            &event.generalization_origin,
            &event.variant_succeeding_siblings,
        )
    }

    pub(super) fn when_node_peer_variant_was_created(
        &mut self,
        event: &NodePeerVariantWasCreated,
    ) -> ProjectionResult<()> {
        self.create_variant(
            VariantKind::Peer,
            &event.content_stream_id,
            &event.node_aggregate_id,
            &event.source_origin,
            &event.peer_origin,
            &event.peer_succeeding_siblings,
        )
    }

    fn create_variant(
        &mut self,
        kind: VariantKind,
        cs: &ContentStreamId,
        node_aggregate_id: &NodeAggregateId,
        source_origin: &OriginDimensionSpacePoint,
        variant_origin: &OriginDimensionSpacePoint,
        siblings: &InterdimensionalSiblings,
    ) -> ProjectionResult<()> {
        let source = self
            .tables()
            .find_node_by_origin(cs, node_aggregate_id, source_origin)
            .cloned()
            .ok_or_else(|| self.missing(MissingRecord::SourceNode))?;
        let source_edge = self
            .tables()
            .ingoing_edge_in(cs, source.relation_anchor_point, source_origin.hash())
            .cloned();
        if kind != VariantKind::Specialization && source_edge.is_none() {
            return Err(self.missing(MissingRecord::IngoingSourceHierarchyRelation));
        }
        let name = source_edge
            .and_then(|edge| edge.name)
            .or_else(|| source.node_name.clone());

        let variant = self.copy_node_to_origin(&source, variant_origin);
        let variant_anchor = variant.relation_anchor_point;
        let coverage = siblings.to_dimension_space_point_set();

        let ingoing = self
            .tables()
            .ingoing_edges_for_aggregate(cs, node_aggregate_id, &coverage);
        let mut covered = DimensionSpacePointSet::empty();
        for edge in ingoing {
            covered.insert(edge.dimension_space_point.clone());
            self.reassign_child(edge, variant_anchor);
        }

        for sibling in siblings.iter() {
            let point = &sibling.dimension_space_point;
            if covered.contains(point) {
                continue;
            }
            let source_parent = self
                .tables()
                .find_parent_node(cs, node_aggregate_id, source_origin)
                .map(|parent| parent.node_aggregate_id.clone())
                .ok_or_else(|| self.missing(MissingRecord::SourceParentNode))?;
            let parent = self
                .tables()
                .find_node_in_aggregate(cs, &source_parent, point)
                .map(|parent| parent.relation_anchor_point)
                .ok_or_else(|| self.missing(MissingRecord::TargetParentNode))?;
            let succeeding = self.sibling_anchor(cs, sibling.node_aggregate_id.as_ref(), point);

            self.connect_hierarchy(cs, parent, variant_anchor, point, succeeding, name.clone());
            self.inherit_restrictions_from_parent(cs, &source_parent, node_aggregate_id, point);
        }

        let outgoing: Vec<HierarchyEdge> = self
            .tables()
            .outgoing_edges_for_aggregate(cs, node_aggregate_id, &coverage)
            .into_iter()
            .filter(|edge| edge.parent_node_anchor != variant_anchor)
            .collect();
        for edge in outgoing {
            self.reassign_parent(edge, variant_anchor);
        }

        self.copy_reference_relations(source.relation_anchor_point, variant_anchor);
        tracing::trace!(
            node_aggregate_id = %node_aggregate_id,
            origin = %variant_origin,
            anchor = %variant_anchor,
            "created node variant"
        );
        Ok(())
    }
}
