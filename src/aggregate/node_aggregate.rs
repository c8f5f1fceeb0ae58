//! The node aggregate read model
//!
//! All rows of one aggregate in one content stream, with the dimension space points
//! they occupy (authored in) and cover (are visible in).

use crate::dimension::{
    DimensionSpacePoint, DimensionSpacePointSet, OriginDimensionSpacePoint,
    OriginDimensionSpacePointSet,
};
use crate::infrastructure::{GraphTables, NodeRecord};
use crate::value_objects::{
    ContentStreamId, NodeAggregateClassification, NodeAggregateId, NodeName, NodeTypeName,
};
use std::collections::BTreeMap;

/// One logical node across its dimension variants in one content stream
#[derive(Debug, Clone)]
pub struct NodeAggregate {
    content_stream_id: ContentStreamId,
    node_aggregate_id: NodeAggregateId,
    node_type_name: NodeTypeName,
    node_name: Option<NodeName>,
    classification: NodeAggregateClassification,
    nodes: Vec<NodeRecord>,
    occupied: OriginDimensionSpacePointSet,
    covered: DimensionSpacePointSet,
    coverage_by_occupant: BTreeMap<String, DimensionSpacePointSet>,
    occupation_by_covered: BTreeMap<String, OriginDimensionSpacePoint>,
    disabled: DimensionSpacePointSet,
}

impl NodeAggregate {
    /// Load the aggregate from the tables; `None` if it has no row in the stream
    pub fn load(
        tables: &GraphTables,
        content_stream_id: &ContentStreamId,
        node_aggregate_id: &NodeAggregateId,
    ) -> Option<Self> {
        let mut nodes: Vec<NodeRecord> = tables
            .nodes_of_aggregate_in(content_stream_id, node_aggregate_id)
            .into_iter()
            .cloned()
            .collect();
        nodes.sort_by(|a, b| {
            a.origin_dimension_space_point
                .cmp(&b.origin_dimension_space_point)
        });
        let first = nodes.first()?;

        let node_type_name = first.node_type_name.clone();
        let classification = first.classification;
        let mut node_name = None;
        let mut occupied = OriginDimensionSpacePointSet::default();
        let mut covered = DimensionSpacePointSet::empty();
        let mut coverage_by_occupant = BTreeMap::new();
        let mut occupation_by_covered = BTreeMap::new();

        for node in &nodes {
            let origin = &node.origin_dimension_space_point;
            occupied.insert(origin.clone());
            let mut coverage = DimensionSpacePointSet::empty();
            for edge in tables
                .ingoing_edges(node.relation_anchor_point)
                .filter(|edge| &edge.content_stream_id == content_stream_id)
            {
                if node_name.is_none() {
                    node_name = edge.name.clone();
                }
                coverage.insert(edge.dimension_space_point.clone());
                covered.insert(edge.dimension_space_point.clone());
                occupation_by_covered.insert(
                    edge.dimension_space_point.hash().to_string(),
                    origin.clone(),
                );
            }
            coverage_by_occupant.insert(origin.hash().to_string(), coverage);
        }

        let disabled = covered
            .iter()
            .filter(|point| {
                tables
                    .restriction_edges_at(content_stream_id, point.hash())
                    .iter()
                    .any(|row| &row.origin_node_aggregate_id == node_aggregate_id)
            })
            .cloned()
            .collect();

        Some(Self {
            content_stream_id: content_stream_id.clone(),
            node_aggregate_id: node_aggregate_id.clone(),
            node_type_name,
            node_name,
            classification,
            nodes,
            occupied,
            covered,
            coverage_by_occupant,
            occupation_by_covered,
            disabled,
        })
    }

    /// The content stream the aggregate was loaded from
    pub fn content_stream_id(&self) -> &ContentStreamId {
        &self.content_stream_id
    }

    /// Logical identity
    pub fn node_aggregate_id(&self) -> &NodeAggregateId {
        &self.node_aggregate_id
    }

    /// Node type shared by all rows
    pub fn node_type_name(&self) -> &NodeTypeName {
        &self.node_type_name
    }

    /// Name as carried on the aggregate's hierarchy edges
    pub fn node_name(&self) -> Option<&NodeName> {
        self.node_name.as_ref()
    }

    /// Root, regular or tethered
    pub fn classification(&self) -> NodeAggregateClassification {
        self.classification
    }

    pub fn is_root(&self) -> bool {
        self.classification.is_root()
    }

    pub fn is_tethered(&self) -> bool {
        self.classification.is_tethered()
    }

    /// All rows, ordered by origin
    pub fn nodes(&self) -> &[NodeRecord] {
        &self.nodes
    }

    /// Points the aggregate is authored in
    pub fn occupied_dimension_space_points(&self) -> &OriginDimensionSpacePointSet {
        &self.occupied
    }

    /// Points the aggregate is visible in
    pub fn covered_dimension_space_points(&self) -> &DimensionSpacePointSet {
        &self.covered
    }

    /// Points disabled by a restriction originating at this aggregate
    pub fn disabled_dimension_space_points(&self) -> &DimensionSpacePointSet {
        &self.disabled
    }

    pub fn occupies_dimension_space_point(&self, origin: &OriginDimensionSpacePoint) -> bool {
        self.occupied.contains(origin)
    }

    pub fn covers_dimension_space_point(&self, point: &DimensionSpacePoint) -> bool {
        self.covered.contains(point)
    }

    pub fn disables_dimension_space_point(&self, point: &DimensionSpacePoint) -> bool {
        self.disabled.contains(point)
    }

    /// Points covered by the row authored in `origin`
    pub fn coverage_by_occupant(
        &self,
        origin: &OriginDimensionSpacePoint,
    ) -> Option<&DimensionSpacePointSet> {
        self.coverage_by_occupant.get(origin.hash())
    }

    /// Origin of the row visible in `point`
    pub fn occupation_by_covered(
        &self,
        point: &DimensionSpacePoint,
    ) -> Option<&OriginDimensionSpacePoint> {
        self.occupation_by_covered.get(point.hash())
    }

    /// The row authored in `origin`
    pub fn node_by_occupied(&self, origin: &OriginDimensionSpacePoint) -> Option<&NodeRecord> {
        self.nodes
            .iter()
            .find(|node| &node.origin_dimension_space_point == origin)
    }

    /// The row visible in `point`
    pub fn node_by_covered(&self, point: &DimensionSpacePoint) -> Option<&NodeRecord> {
        self.occupation_by_covered(point)
            .and_then(|origin| self.node_by_occupied(origin))
    }
}
