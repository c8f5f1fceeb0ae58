//! Aggregate-level reads over all content streams

use super::content_subgraph::ContentSubgraph;
use super::node::VisibilityConstraints;
use crate::aggregate::NodeAggregate;
use crate::dimension::{
    DimensionSpacePoint, DimensionSpacePointSet, OriginDimensionSpacePoint,
    OriginDimensionSpacePointSet,
};
use crate::infrastructure::{ContentGraphStore, GraphTables, HierarchyEdge};
use crate::value_objects::{
    ContentStreamId, NodeAggregateId, NodeName, NodeRelationAnchorPoint, NodeTypeName,
};
use indexmap::IndexSet;

/// Read access to the materialized content graph
///
/// Every call takes a shared lock on the tables for its own duration only, so reads run
/// concurrently with each other and interleave with event application.
#[derive(Clone)]
pub struct ContentGraph {
    store: ContentGraphStore,
}

impl ContentGraph {
    /// Read from `store`
    pub fn new(store: ContentGraphStore) -> Self {
        Self { store }
    }

    /// The nodes visible in one stream at one point
    pub fn subgraph(
        &self,
        content_stream_id: &ContentStreamId,
        dimension_space_point: &DimensionSpacePoint,
        visibility_constraints: VisibilityConstraints,
    ) -> ContentSubgraph {
        ContentSubgraph::new(
            self.store.clone(),
            content_stream_id.clone(),
            dimension_space_point.clone(),
            visibility_constraints,
        )
    }

    /// Whether the stream was created and not removed
    pub fn has_content_stream(&self, content_stream_id: &ContentStreamId) -> bool {
        self.store.read().content_stream(content_stream_id).is_some()
    }

    /// Points at least one hierarchy edge of the stream lives in
    pub fn dimension_space_points_in_use(
        &self,
        content_stream_id: &ContentStreamId,
    ) -> DimensionSpacePointSet {
        self.store
            .read()
            .hierarchy_edges_in(content_stream_id)
            .map(|edge| edge.dimension_space_point.clone())
            .collect()
    }

    pub fn find_node_aggregate_by_id(
        &self,
        content_stream_id: &ContentStreamId,
        node_aggregate_id: &NodeAggregateId,
    ) -> Option<NodeAggregate> {
        NodeAggregate::load(&self.store.read(), content_stream_id, node_aggregate_id)
    }

    /// Aggregates any row of the child is connected below
    pub fn find_parent_node_aggregates(
        &self,
        content_stream_id: &ContentStreamId,
        child_node_aggregate_id: &NodeAggregateId,
    ) -> Vec<NodeAggregate> {
        let tables = self.store.read();
        let parents: IndexSet<NodeAggregateId> = tables
            .anchors_of_aggregate(child_node_aggregate_id)
            .flat_map(|anchor| tables.ingoing_edges(anchor))
            .filter(|edge| {
                &edge.content_stream_id == content_stream_id
                    && !edge.parent_node_anchor.is_root_edge()
            })
            .filter_map(|edge| tables.node(edge.parent_node_anchor))
            .map(|node| node.node_aggregate_id.clone())
            .collect();
        Self::load_all(&tables, content_stream_id, parents)
    }

    /// Aggregates connected below any row of the parent, ordered by position
    pub fn find_child_node_aggregates(
        &self,
        content_stream_id: &ContentStreamId,
        parent_node_aggregate_id: &NodeAggregateId,
    ) -> Vec<NodeAggregate> {
        let tables = self.store.read();
        let children = Self::child_aggregate_ids(&tables, content_stream_id, parent_node_aggregate_id, |_| true);
        Self::load_all(&tables, content_stream_id, children)
    }

    /// Children connected below the parent through an edge of the given name
    pub fn find_child_node_aggregates_by_name(
        &self,
        content_stream_id: &ContentStreamId,
        parent_node_aggregate_id: &NodeAggregateId,
        node_name: &NodeName,
    ) -> Vec<NodeAggregate> {
        let tables = self.store.read();
        let children = Self::child_aggregate_ids(&tables, content_stream_id, parent_node_aggregate_id, |edge| {
            edge.name.as_ref() == Some(node_name)
        });
        Self::load_all(&tables, content_stream_id, children)
    }

    /// Tethered children of the parent
    pub fn find_tethered_child_node_aggregates(
        &self,
        content_stream_id: &ContentStreamId,
        parent_node_aggregate_id: &NodeAggregateId,
    ) -> Vec<NodeAggregate> {
        self.find_child_node_aggregates(content_stream_id, parent_node_aggregate_id)
            .into_iter()
            .filter(NodeAggregate::is_tethered)
            .collect()
    }

    /// The root aggregate of a type
    pub fn find_root_node_aggregate_by_type(
        &self,
        content_stream_id: &ContentStreamId,
        node_type_name: &NodeTypeName,
    ) -> Option<NodeAggregate> {
        let tables = self.store.read();
        let root = tables
            .outgoing_edges(NodeRelationAnchorPoint::ROOT_EDGE)
            .filter(|edge| &edge.content_stream_id == content_stream_id)
            .filter_map(|edge| tables.node(edge.child_node_anchor))
            .find(|node| &node.node_type_name == node_type_name)?
            .node_aggregate_id
            .clone();
        NodeAggregate::load(&tables, content_stream_id, &root)
    }

    /// Origins of children of `parent_origin`'s row carrying `node_name` in the given points
    pub fn dimension_space_points_occupied_by_child_node_name(
        &self,
        content_stream_id: &ContentStreamId,
        node_name: &NodeName,
        parent_node_aggregate_id: &NodeAggregateId,
        parent_origin: &OriginDimensionSpacePoint,
        dimension_space_points_to_check: &DimensionSpacePointSet,
    ) -> OriginDimensionSpacePointSet {
        let tables = self.store.read();
        let Some(parent) =
            tables.find_node_by_origin(content_stream_id, parent_node_aggregate_id, parent_origin)
        else {
            return OriginDimensionSpacePointSet::default();
        };
        tables
            .outgoing_edges(parent.relation_anchor_point)
            .filter(|edge| {
                &edge.content_stream_id == content_stream_id
                    && edge.name.as_ref() == Some(node_name)
                    && dimension_space_points_to_check.contains(&edge.dimension_space_point)
            })
            .filter_map(|edge| tables.node(edge.child_node_anchor))
            .map(|child| child.origin_dimension_space_point.clone())
            .collect()
    }

    fn child_aggregate_ids(
        tables: &GraphTables,
        content_stream_id: &ContentStreamId,
        parent_node_aggregate_id: &NodeAggregateId,
        keep: impl Fn(&HierarchyEdge) -> bool,
    ) -> IndexSet<NodeAggregateId> {
        let mut edges: Vec<&HierarchyEdge> = tables
            .anchors_of_aggregate(parent_node_aggregate_id)
            .flat_map(|anchor| tables.outgoing_edges(anchor))
            .filter(|edge| &edge.content_stream_id == content_stream_id && keep(edge))
            .collect();
        edges.sort_by_key(|edge| edge.position);
        edges
            .into_iter()
            .filter_map(|edge| tables.node(edge.child_node_anchor))
            .map(|node| node.node_aggregate_id.clone())
            .collect()
    }

    fn load_all(
        tables: &GraphTables,
        content_stream_id: &ContentStreamId,
        ids: IndexSet<NodeAggregateId>,
    ) -> Vec<NodeAggregate> {
        ids.iter()
            .filter_map(|id| NodeAggregate::load(tables, content_stream_id, id))
            .collect()
    }
}
