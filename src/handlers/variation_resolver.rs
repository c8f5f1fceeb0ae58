//! Variation resolution
//!
//! Computes the dimension space points a structural command affects, the succeeding
//! sibling to use in each of them, and the variant events of a node together with its
//! tethered descendants.

use crate::aggregate::NodeAggregate;
use crate::commands::{CommandResult, RelationDistributionStrategy};
use crate::dimension::{
    DimensionSpacePoint, DimensionSpacePointSet, OriginDimensionSpacePoint, VariantType,
    VariationOracle,
};
use crate::domain_events::ContentGraphEvent;
use crate::events::{
    InterdimensionalSibling, InterdimensionalSiblings, NodeGeneralizationVariantWasCreated,
    NodePeerVariantWasCreated, NodeSpecializationVariantWasCreated,
};
use crate::queries::{ContentGraph, VisibilityConstraints};
use crate::value_objects::{ContentStreamId, NodeAggregateId};
use std::sync::Arc;

/// Resolves fan-out and sibling order across dimension space points
#[derive(Clone)]
pub struct VariationResolver {
    graph: ContentGraph,
    oracle: Arc<dyn VariationOracle>,
}

impl VariationResolver {
    pub fn new(graph: ContentGraph, oracle: Arc<dyn VariationOracle>) -> Self {
        Self { graph, oracle }
    }

    /// Points covered by `aggregate` that an operation issued in `point` reaches
    pub fn affected_dimension_space_points(
        &self,
        aggregate: &NodeAggregate,
        point: &DimensionSpacePoint,
        strategy: RelationDistributionStrategy,
    ) -> CommandResult<DimensionSpacePointSet> {
        let covered = aggregate.covered_dimension_space_points();
        Ok(match strategy {
            RelationDistributionStrategy::Scatter => DimensionSpacePointSet::single(point.clone()),
            RelationDistributionStrategy::GatherAll => covered.clone(),
            RelationDistributionStrategy::GatherSpecializations => covered
                .intersection(&self.oracle.specialization_set(point, true, None)?),
        })
    }

    /// Points a new node authored in `origin` becomes visible in
    pub fn creation_visibility(
        &self,
        origin: &OriginDimensionSpacePoint,
    ) -> CommandResult<DimensionSpacePointSet> {
        Ok(self
            .oracle
            .specialization_set(origin.as_dimension_space_point(), true, None)?)
    }

    /// Points a variant at `target` becomes visible in: the target and its
    /// specializations, without those already served by a more specialized occupant
    pub fn variant_visibility(
        &self,
        aggregate: &NodeAggregate,
        target: &OriginDimensionSpacePoint,
    ) -> CommandResult<DimensionSpacePointSet> {
        let target = target.as_dimension_space_point();
        let mut excluded = DimensionSpacePointSet::empty();
        for occupied in aggregate.occupied_dimension_space_points().iter() {
            let occupied = occupied.as_dimension_space_point();
            if self.oracle.variant_type(occupied, target) == VariantType::Specialization {
                excluded = excluded.union(&self.oracle.specialization_set(occupied, true, None)?);
            }
        }
        Ok(self
            .oracle
            .specialization_set(target, true, Some(&excluded))?)
    }

    /// One succeeding sibling per point of `points`
    ///
    /// Candidates are the explicit sibling followed by its succeeding siblings at
    /// `reference_point`; each point takes the first candidate that is visible there.
    /// `subject` is never chosen as its own sibling.
    pub fn succeeding_siblings(
        &self,
        content_stream_id: &ContentStreamId,
        subject: Option<&NodeAggregateId>,
        explicit: Option<&NodeAggregateId>,
        reference_point: &DimensionSpacePoint,
        points: &DimensionSpacePointSet,
    ) -> InterdimensionalSiblings {
        let Some(explicit) = explicit else {
            return InterdimensionalSiblings::append_to(points);
        };
        let mut candidates = vec![explicit.clone()];
        candidates.extend(
            self.graph
                .subgraph(
                    content_stream_id,
                    reference_point,
                    VisibilityConstraints::WithoutRestrictions,
                )
                .find_succeeding_sibling_nodes(explicit)
                .into_iter()
                .map(|node| node.node_aggregate_id),
        );
        candidates.retain(|candidate| Some(candidate) != subject);
        self.first_visible_candidates(content_stream_id, &candidates, points)
    }

    /// Siblings of a variant: the node's own succeeding siblings at its source origin
    pub fn variant_siblings(
        &self,
        content_stream_id: &ContentStreamId,
        node_aggregate_id: &NodeAggregateId,
        source_origin: &OriginDimensionSpacePoint,
        points: &DimensionSpacePointSet,
    ) -> InterdimensionalSiblings {
        let candidates: Vec<NodeAggregateId> = self
            .graph
            .subgraph(
                content_stream_id,
                source_origin.as_dimension_space_point(),
                VisibilityConstraints::WithoutRestrictions,
            )
            .find_succeeding_sibling_nodes(node_aggregate_id)
            .into_iter()
            .map(|node| node.node_aggregate_id)
            .collect();
        self.first_visible_candidates(content_stream_id, &candidates, points)
    }

    fn first_visible_candidates(
        &self,
        content_stream_id: &ContentStreamId,
        candidates: &[NodeAggregateId],
        points: &DimensionSpacePointSet,
    ) -> InterdimensionalSiblings {
        points
            .iter()
            .map(|point| {
                let subgraph = self.graph.subgraph(
                    content_stream_id,
                    point,
                    VisibilityConstraints::WithoutRestrictions,
                );
                let sibling = candidates
                    .iter()
                    .find(|candidate| subgraph.find_node_by_id(candidate).is_some())
                    .cloned();
                InterdimensionalSibling::new(point.clone(), sibling)
            })
            .collect()
    }

    /// Variant events for `aggregate` and, depth first, each tethered descendant that
    /// occupies `source_origin` but not yet `target_origin`
    pub fn variant_events(
        &self,
        content_stream_id: &ContentStreamId,
        aggregate: &NodeAggregate,
        variant_type: VariantType,
        source_origin: &OriginDimensionSpacePoint,
        target_origin: &OriginDimensionSpacePoint,
        visibility: &DimensionSpacePointSet,
    ) -> Vec<ContentGraphEvent> {
        let mut events = Vec::new();
        let mut stack = vec![aggregate.clone()];
        while let Some(current) = stack.pop() {
            let node_aggregate_id = current.node_aggregate_id().clone();
            let siblings =
                self.variant_siblings(content_stream_id, &node_aggregate_id, source_origin, visibility);
            if let Some(event) = Self::variant_event(
                content_stream_id,
                node_aggregate_id,
                variant_type,
                source_origin,
                target_origin,
                siblings,
            ) {
                events.push(event);
            }

            let mut tethered: Vec<NodeAggregate> = self
                .graph
                .find_tethered_child_node_aggregates(content_stream_id, current.node_aggregate_id())
                .into_iter()
                .filter(|child| {
                    child.occupies_dimension_space_point(source_origin)
                        && !child.occupies_dimension_space_point(target_origin)
                })
                .collect();
            tethered.reverse();
            stack.extend(tethered);
        }
        events
    }

    fn variant_event(
        content_stream_id: &ContentStreamId,
        node_aggregate_id: NodeAggregateId,
        variant_type: VariantType,
        source_origin: &OriginDimensionSpacePoint,
        target_origin: &OriginDimensionSpacePoint,
        siblings: InterdimensionalSiblings,
    ) -> Option<ContentGraphEvent> {
        let event = match variant_type {
            VariantType::Specialization => NodeSpecializationVariantWasCreated {
                content_stream_id: content_stream_id.clone(),
                node_aggregate_id,
                source_origin: source_origin.clone(),
                specialization_origin: target_origin.clone(),
                specialization_siblings: siblings,
            }
            .into(),
            VariantType::Generalization => NodeGeneralizationVariantWasCreated {
                content_stream_id: content_stream_id.clone(),
                node_aggregate_id,
                source_origin: source_origin.clone(),
                generalization_origin: target_origin.clone(),
                variant_succeeding_siblings: siblings,
            }
            .into(),
            VariantType::Peer => NodePeerVariantWasCreated {
                content_stream_id: content_stream_id.clone(),
                node_aggregate_id,
                source_origin: source_origin.clone(),
                peer_origin: target_origin.clone(),
                peer_succeeding_siblings: siblings,
            }
            .into(),
            VariantType::Same => return None,
        };
        Some(event)
    }
}
