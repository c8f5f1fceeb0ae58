//! Materialized content graph tables
//!
//! The five logical tables of the content graph (`nodes`, `hierarchy_edges`,
//! `restriction_edges`, `reference_edges`, `content_streams`) plus the single-row
//! checkpoint. Secondary indexes are maintained by the raw `replace_*` setters, which
//! are only reachable through a [`Transaction`](super::Transaction).

use crate::dimension::{DimensionSpacePoint, DimensionSpacePointSet, OriginDimensionSpacePoint};
use crate::events::{EventId, SequenceNumber};
use crate::value_objects::{
    ContentStreamId, NodeAggregateClassification, NodeAggregateId, NodeName,
    NodeRelationAnchorPoint, NodeTypeName, ReferenceName, SerializedPropertyValues,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One physical node row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Surrogate identity of the row
    pub relation_anchor_point: NodeRelationAnchorPoint,
    /// Logical identity
    pub node_aggregate_id: NodeAggregateId,
    /// Where the content was authored
    pub origin_dimension_space_point: OriginDimensionSpacePoint,
    /// Serialized property bag
    pub properties: SerializedPropertyValues,
    /// Node type
    pub node_type_name: NodeTypeName,
    /// Root, regular or tethered
    pub classification: NodeAggregateClassification,
    /// Name the node was created with
    pub node_name: Option<NodeName>,
}

/// Parent/child edge in one content stream and dimension space point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyEdge {
    /// Parent anchor, the root sentinel for root nodes
    pub parent_node_anchor: NodeRelationAnchorPoint,
    /// Child anchor
    pub child_node_anchor: NodeRelationAnchorPoint,
    /// Stream the edge belongs to
    pub content_stream_id: ContentStreamId,
    /// Point the edge belongs to
    pub dimension_space_point: DimensionSpacePoint,
    /// Sibling position below the parent
    pub position: i64,
    /// Name of the child, unique below the parent
    pub name: Option<NodeName>,
}

impl HierarchyEdge {
    /// Primary key of the edge
    pub fn key(&self) -> HierarchyEdgeKey {
        HierarchyEdgeKey {
            content_stream_id: self.content_stream_id.clone(),
            dimension_space_point_hash: self.dimension_space_point.hash().to_string(),
            parent_node_anchor: self.parent_node_anchor,
            child_node_anchor: self.child_node_anchor,
        }
    }
}

/// Primary key of a hierarchy edge; ordering groups siblings together
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HierarchyEdgeKey {
    /// Stream
    pub content_stream_id: ContentStreamId,
    /// Point hash
    pub dimension_space_point_hash: String,
    /// Parent anchor
    pub parent_node_anchor: NodeRelationAnchorPoint,
    /// Child anchor
    pub child_node_anchor: NodeRelationAnchorPoint,
}

/// Suppression of descendants by a disabled aggregate in one point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestrictionEdge {
    /// Stream
    pub content_stream_id: ContentStreamId,
    /// Point hash
    pub dimension_space_point_hash: String,
    /// The disabled aggregate
    pub origin_node_aggregate_id: NodeAggregateId,
    /// Aggregates suppressed by it, including itself
    pub affected_node_aggregate_ids: BTreeSet<NodeAggregateId>,
}

impl RestrictionEdge {
    /// Primary key of the edge
    pub fn key(&self) -> RestrictionEdgeKey {
        RestrictionEdgeKey {
            content_stream_id: self.content_stream_id.clone(),
            dimension_space_point_hash: self.dimension_space_point_hash.clone(),
            origin_node_aggregate_id: self.origin_node_aggregate_id.clone(),
        }
    }
}

/// Primary key of a restriction edge
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RestrictionEdgeKey {
    /// Stream
    pub content_stream_id: ContentStreamId,
    /// Point hash
    pub dimension_space_point_hash: String,
    /// The disabled aggregate
    pub origin_node_aggregate_id: NodeAggregateId,
}

/// One ordered reference of a node row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceEdge {
    /// The referencing row
    pub node_anchor_point: NodeRelationAnchorPoint,
    /// Reference name
    pub name: ReferenceName,
    /// Position within the name
    pub position: u32,
    /// The referenced aggregate
    pub target_node_aggregate_id: NodeAggregateId,
    /// Properties carried on the reference
    pub properties: Option<SerializedPropertyValues>,
}

impl ReferenceEdge {
    /// Primary key of the edge
    pub fn key(&self) -> ReferenceEdgeKey {
        ReferenceEdgeKey {
            node_anchor_point: self.node_anchor_point,
            name: self.name.clone(),
            position: self.position,
        }
    }
}

/// Primary key of a reference edge
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReferenceEdgeKey {
    /// The referencing row
    pub node_anchor_point: NodeRelationAnchorPoint,
    /// Reference name
    pub name: ReferenceName,
    /// Position within the name
    pub position: u32,
}

/// A known content stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentStreamRecord {
    /// The stream
    pub content_stream_id: ContentStreamId,
    /// The stream it was forked from
    pub source_content_stream_id: Option<ContentStreamId>,
    /// Recording time of the creating event
    pub created_at: DateTime<Utc>,
}

/// The single-row checkpoint: last applied event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectionCheckpoint {
    /// Sequence number of the last applied event
    pub sequence_number: Option<SequenceNumber>,
    /// Id of the last applied event
    pub event_id: Option<EventId>,
    /// Recording time of the last applied event
    pub recorded_at: Option<DateTime<Utc>>,
}

impl ProjectionCheckpoint {
    /// The sequence number expected next
    pub fn next_sequence_number(&self) -> SequenceNumber {
        self.sequence_number
            .map(|s| s.next())
            .unwrap_or(SequenceNumber::FIRST)
    }
}

/// The materialized tables and their indexes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphTables {
    nodes: BTreeMap<NodeRelationAnchorPoint, NodeRecord>,
    hierarchy_edges: BTreeMap<HierarchyEdgeKey, HierarchyEdge>,
    restriction_edges: BTreeMap<RestrictionEdgeKey, RestrictionEdge>,
    reference_edges: BTreeMap<ReferenceEdgeKey, ReferenceEdge>,
    content_streams: BTreeMap<ContentStreamId, ContentStreamRecord>,
    checkpoint: ProjectionCheckpoint,
    last_anchor: u64,
    edges_by_child: BTreeMap<NodeRelationAnchorPoint, BTreeSet<HierarchyEdgeKey>>,
    edges_by_parent: BTreeMap<NodeRelationAnchorPoint, BTreeSet<HierarchyEdgeKey>>,
    anchors_by_aggregate: BTreeMap<NodeAggregateId, BTreeSet<NodeRelationAnchorPoint>>,
}

fn index_insert<K: Ord, V: Ord>(index: &mut BTreeMap<K, BTreeSet<V>>, key: K, value: V) {
    index.entry(key).or_default().insert(value);
}

fn index_remove<K: Ord, V: Ord>(index: &mut BTreeMap<K, BTreeSet<V>>, key: &K, value: &V) {
    if let Some(values) = index.get_mut(key) {
        values.remove(value);
        if values.is_empty() {
            index.remove(key);
        }
    }
}

impl GraphTables {
    // ---------------------------------------------------------------------------
    // raw setters, journaled by the transaction
    // ---------------------------------------------------------------------------

    pub(crate) fn replace_node(
        &mut self,
        anchor: NodeRelationAnchorPoint,
        node: Option<NodeRecord>,
    ) -> Option<NodeRecord> {
        let previous = self.nodes.remove(&anchor);
        if let Some(previous) = &previous {
            index_remove(
                &mut self.anchors_by_aggregate,
                &previous.node_aggregate_id,
                &anchor,
            );
        }
        if let Some(node) = node {
            index_insert(
                &mut self.anchors_by_aggregate,
                node.node_aggregate_id.clone(),
                anchor,
            );
            self.nodes.insert(anchor, node);
        }
        previous
    }

    pub(crate) fn replace_hierarchy_edge(
        &mut self,
        key: HierarchyEdgeKey,
        edge: Option<HierarchyEdge>,
    ) -> Option<HierarchyEdge> {
        let previous = self.hierarchy_edges.remove(&key);
        if previous.is_some() {
            index_remove(&mut self.edges_by_child, &key.child_node_anchor, &key);
            index_remove(&mut self.edges_by_parent, &key.parent_node_anchor, &key);
        }
        if let Some(edge) = edge {
            index_insert(&mut self.edges_by_child, key.child_node_anchor, key.clone());
            index_insert(&mut self.edges_by_parent, key.parent_node_anchor, key.clone());
            self.hierarchy_edges.insert(key, edge);
        }
        previous
    }

    pub(crate) fn replace_restriction_edge(
        &mut self,
        key: RestrictionEdgeKey,
        edge: Option<RestrictionEdge>,
    ) -> Option<RestrictionEdge> {
        let previous = self.restriction_edges.remove(&key);
        if let Some(edge) = edge {
            self.restriction_edges.insert(key, edge);
        }
        previous
    }

    pub(crate) fn replace_reference_edge(
        &mut self,
        key: ReferenceEdgeKey,
        edge: Option<ReferenceEdge>,
    ) -> Option<ReferenceEdge> {
        let previous = self.reference_edges.remove(&key);
        if let Some(edge) = edge {
            self.reference_edges.insert(key, edge);
        }
        previous
    }

    pub(crate) fn replace_content_stream(
        &mut self,
        id: ContentStreamId,
        record: Option<ContentStreamRecord>,
    ) -> Option<ContentStreamRecord> {
        let previous = self.content_streams.remove(&id);
        if let Some(record) = record {
            self.content_streams.insert(id, record);
        }
        previous
    }

    pub(crate) fn replace_checkpoint(&mut self, checkpoint: ProjectionCheckpoint) -> ProjectionCheckpoint {
        std::mem::replace(&mut self.checkpoint, checkpoint)
    }

    pub(crate) fn replace_last_anchor(&mut self, last_anchor: u64) -> u64 {
        std::mem::replace(&mut self.last_anchor, last_anchor)
    }

    pub(crate) fn last_anchor(&self) -> u64 {
        self.last_anchor
    }

    // ---------------------------------------------------------------------------
    // table access
    // ---------------------------------------------------------------------------

    /// The last applied event
    pub fn checkpoint(&self) -> &ProjectionCheckpoint {
        &self.checkpoint
    }

    /// All node rows
    pub fn nodes(&self) -> impl Iterator<Item = &NodeRecord> {
        self.nodes.values()
    }

    /// All hierarchy edges
    pub fn hierarchy_edges(&self) -> impl Iterator<Item = &HierarchyEdge> {
        self.hierarchy_edges.values()
    }

    /// All restriction edges
    pub fn restriction_edges(&self) -> impl Iterator<Item = &RestrictionEdge> {
        self.restriction_edges.values()
    }

    /// All reference edges
    pub fn reference_edges(&self) -> impl Iterator<Item = &ReferenceEdge> {
        self.reference_edges.values()
    }

    /// All content streams
    pub fn content_streams(&self) -> impl Iterator<Item = &ContentStreamRecord> {
        self.content_streams.values()
    }

    /// A node row by anchor
    pub fn node(&self, anchor: NodeRelationAnchorPoint) -> Option<&NodeRecord> {
        self.nodes.get(&anchor)
    }

    /// A content stream by id
    pub fn content_stream(&self, id: &ContentStreamId) -> Option<&ContentStreamRecord> {
        self.content_streams.get(id)
    }

    /// A hierarchy edge by key
    pub fn hierarchy_edge(&self, key: &HierarchyEdgeKey) -> Option<&HierarchyEdge> {
        self.hierarchy_edges.get(key)
    }

    /// A restriction edge by key
    pub fn restriction_edge(&self, key: &RestrictionEdgeKey) -> Option<&RestrictionEdge> {
        self.restriction_edges.get(key)
    }

    // ---------------------------------------------------------------------------
    // hierarchy queries
    // ---------------------------------------------------------------------------

    /// Inbound edges of a row across all streams
    pub fn ingoing_edges(
        &self,
        child: NodeRelationAnchorPoint,
    ) -> impl Iterator<Item = &HierarchyEdge> {
        self.edges_by_child
            .get(&child)
            .into_iter()
            .flatten()
            .filter_map(|key| self.hierarchy_edges.get(key))
    }

    /// Outbound edges of a row across all streams
    pub fn outgoing_edges(
        &self,
        parent: NodeRelationAnchorPoint,
    ) -> impl Iterator<Item = &HierarchyEdge> {
        self.edges_by_parent
            .get(&parent)
            .into_iter()
            .flatten()
            .filter_map(|key| self.hierarchy_edges.get(key))
    }

    /// The inbound edge of a row in one stream and point
    pub fn ingoing_edge_in(
        &self,
        content_stream_id: &ContentStreamId,
        child: NodeRelationAnchorPoint,
        dimension_space_point_hash: &str,
    ) -> Option<&HierarchyEdge> {
        self.ingoing_edges(child).find(|edge| {
            &edge.content_stream_id == content_stream_id
                && edge.dimension_space_point.hash() == dimension_space_point_hash
        })
    }

    /// Child edges of a parent in one stream and point, ordered by position
    pub fn child_edges(
        &self,
        content_stream_id: &ContentStreamId,
        dimension_space_point_hash: &str,
        parent: NodeRelationAnchorPoint,
    ) -> Vec<&HierarchyEdge> {
        let lower = HierarchyEdgeKey {
            content_stream_id: content_stream_id.clone(),
            dimension_space_point_hash: dimension_space_point_hash.to_string(),
            parent_node_anchor: parent,
            child_node_anchor: NodeRelationAnchorPoint::ROOT_EDGE,
        };
        let mut edges: Vec<&HierarchyEdge> = self
            .hierarchy_edges
            .range(lower..)
            .take_while(|(key, _)| {
                &key.content_stream_id == content_stream_id
                    && key.dimension_space_point_hash == dimension_space_point_hash
                    && key.parent_node_anchor == parent
            })
            .map(|(_, edge)| edge)
            .collect();
        edges.sort_by_key(|edge| edge.position);
        edges
    }

    /// Distinct streams containing an inbound edge of the row
    pub fn content_streams_containing(
        &self,
        anchor: NodeRelationAnchorPoint,
    ) -> BTreeSet<ContentStreamId> {
        self.ingoing_edges(anchor)
            .map(|edge| edge.content_stream_id.clone())
            .collect()
    }

    /// Whether the row has any inbound edge in any stream
    pub fn has_ingoing_edges(&self, anchor: NodeRelationAnchorPoint) -> bool {
        self.edges_by_child.contains_key(&anchor)
    }

    /// Hierarchy edges of one stream
    pub fn hierarchy_edges_in(
        &self,
        content_stream_id: &ContentStreamId,
    ) -> impl Iterator<Item = &HierarchyEdge> {
        let content_stream_id = content_stream_id.clone();
        self.hierarchy_edges
            .values()
            .filter(move |edge| edge.content_stream_id == content_stream_id)
    }

    // ---------------------------------------------------------------------------
    // aggregate queries
    // ---------------------------------------------------------------------------

    /// All rows of an aggregate, across streams
    pub fn anchors_of_aggregate(
        &self,
        node_aggregate_id: &NodeAggregateId,
    ) -> impl Iterator<Item = NodeRelationAnchorPoint> + '_ {
        self.anchors_by_aggregate
            .get(node_aggregate_id)
            .into_iter()
            .flatten()
            .copied()
    }

    /// Rows of an aggregate with at least one inbound edge in the stream
    pub fn nodes_of_aggregate_in(
        &self,
        content_stream_id: &ContentStreamId,
        node_aggregate_id: &NodeAggregateId,
    ) -> Vec<&NodeRecord> {
        self.anchors_of_aggregate(node_aggregate_id)
            .filter(|anchor| {
                self.ingoing_edges(*anchor)
                    .any(|edge| &edge.content_stream_id == content_stream_id)
            })
            .filter_map(|anchor| self.nodes.get(&anchor))
            .collect()
    }

    /// The row of an aggregate visible in a point
    pub fn find_node_in_aggregate(
        &self,
        content_stream_id: &ContentStreamId,
        node_aggregate_id: &NodeAggregateId,
        dimension_space_point: &DimensionSpacePoint,
    ) -> Option<&NodeRecord> {
        self.anchors_of_aggregate(node_aggregate_id)
            .find(|anchor| {
                self.ingoing_edge_in(content_stream_id, *anchor, dimension_space_point.hash())
                    .is_some()
            })
            .and_then(|anchor| self.nodes.get(&anchor))
    }

    /// The row of an aggregate authored in an origin
    pub fn find_node_by_origin(
        &self,
        content_stream_id: &ContentStreamId,
        node_aggregate_id: &NodeAggregateId,
        origin: &OriginDimensionSpacePoint,
    ) -> Option<&NodeRecord> {
        self.nodes_of_aggregate_in(content_stream_id, node_aggregate_id)
            .into_iter()
            .find(|node| node.origin_dimension_space_point == *origin)
    }

    /// Parent row of the row authored in `origin`, resolved in that same point
    pub fn find_parent_node(
        &self,
        content_stream_id: &ContentStreamId,
        child_node_aggregate_id: &NodeAggregateId,
        origin: &OriginDimensionSpacePoint,
    ) -> Option<&NodeRecord> {
        self.anchors_of_aggregate(child_node_aggregate_id)
            .filter(|anchor| {
                self.nodes
                    .get(anchor)
                    .map_or(false, |node| node.origin_dimension_space_point == *origin)
            })
            .find_map(|anchor| self.ingoing_edge_in(content_stream_id, anchor, origin.hash()))
            .and_then(|edge| self.nodes.get(&edge.parent_node_anchor))
    }

    /// Inbound edges of an aggregate's rows in the stream at the given points
    pub fn ingoing_edges_for_aggregate(
        &self,
        content_stream_id: &ContentStreamId,
        node_aggregate_id: &NodeAggregateId,
        points: &DimensionSpacePointSet,
    ) -> Vec<HierarchyEdge> {
        self.anchors_of_aggregate(node_aggregate_id)
            .flat_map(|anchor| self.ingoing_edges(anchor))
            .filter(|edge| {
                &edge.content_stream_id == content_stream_id
                    && points.contains_hash(edge.dimension_space_point.hash())
            })
            .cloned()
            .collect()
    }

    /// Outbound edges of an aggregate's rows in the stream at the given points
    pub fn outgoing_edges_for_aggregate(
        &self,
        content_stream_id: &ContentStreamId,
        node_aggregate_id: &NodeAggregateId,
        points: &DimensionSpacePointSet,
    ) -> Vec<HierarchyEdge> {
        self.anchors_of_aggregate(node_aggregate_id)
            .flat_map(|anchor| self.outgoing_edges(anchor))
            .filter(|edge| {
                &edge.content_stream_id == content_stream_id
                    && points.contains_hash(edge.dimension_space_point.hash())
            })
            .cloned()
            .collect()
    }

    // ---------------------------------------------------------------------------
    // restriction and reference queries
    // ---------------------------------------------------------------------------

    /// Restriction edges of a stream at one point whose affected set contains the aggregate
    pub fn restriction_edges_affecting(
        &self,
        content_stream_id: &ContentStreamId,
        dimension_space_point_hash: &str,
        node_aggregate_id: &NodeAggregateId,
    ) -> Vec<&RestrictionEdge> {
        self.restriction_edges_at(content_stream_id, dimension_space_point_hash)
            .into_iter()
            .filter(|edge| edge.affected_node_aggregate_ids.contains(node_aggregate_id))
            .collect()
    }

    /// Restriction edges of a stream at one point
    pub fn restriction_edges_at(
        &self,
        content_stream_id: &ContentStreamId,
        dimension_space_point_hash: &str,
    ) -> Vec<&RestrictionEdge> {
        let lower = RestrictionEdgeKey {
            content_stream_id: content_stream_id.clone(),
            dimension_space_point_hash: dimension_space_point_hash.to_string(),
            origin_node_aggregate_id: NodeAggregateId::from_string(""),
        };
        self.restriction_edges
            .range(lower..)
            .take_while(|(key, _)| {
                &key.content_stream_id == content_stream_id
                    && key.dimension_space_point_hash == dimension_space_point_hash
            })
            .map(|(_, edge)| edge)
            .collect()
    }

    /// Restriction edges of one stream
    pub fn restriction_edges_in(
        &self,
        content_stream_id: &ContentStreamId,
    ) -> impl Iterator<Item = &RestrictionEdge> {
        let content_stream_id = content_stream_id.clone();
        self.restriction_edges
            .values()
            .filter(move |edge| edge.content_stream_id == content_stream_id)
    }

    /// Whether the aggregate is suppressed at the point by any restriction
    pub fn is_restricted(
        &self,
        content_stream_id: &ContentStreamId,
        dimension_space_point_hash: &str,
        node_aggregate_id: &NodeAggregateId,
    ) -> bool {
        !self
            .restriction_edges_affecting(content_stream_id, dimension_space_point_hash, node_aggregate_id)
            .is_empty()
    }

    /// References of a row ordered by name and position
    pub fn references_of(&self, anchor: NodeRelationAnchorPoint) -> Vec<&ReferenceEdge> {
        let lower = ReferenceEdgeKey {
            node_anchor_point: anchor,
            name: ReferenceName::from_string(""),
            position: 0,
        };
        self.reference_edges
            .range(lower..)
            .take_while(|(key, _)| key.node_anchor_point == anchor)
            .map(|(_, edge)| edge)
            .collect()
    }

    /// All references pointing at an aggregate
    pub fn references_to(&self, target: &NodeAggregateId) -> Vec<&ReferenceEdge> {
        self.reference_edges
            .values()
            .filter(|edge| &edge.target_node_aggregate_id == target)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(parent: u64, child: u64, position: i64) -> HierarchyEdge {
        HierarchyEdge {
            parent_node_anchor: NodeRelationAnchorPoint::from_u64(parent),
            child_node_anchor: NodeRelationAnchorPoint::from_u64(child),
            content_stream_id: ContentStreamId::from("cs"),
            dimension_space_point: DimensionSpacePoint::empty(),
            position,
            name: None,
        }
    }

    #[test]
    fn test_child_edges_are_ordered_by_position() {
        let mut tables = GraphTables::default();
        for e in [edge(1, 2, 256), edge(1, 3, 128), edge(4, 5, 0)] {
            tables.replace_hierarchy_edge(e.key(), Some(e));
        }

        let children: Vec<u64> = tables
            .child_edges(
                &ContentStreamId::from("cs"),
                DimensionSpacePoint::empty().hash(),
                NodeRelationAnchorPoint::from_u64(1),
            )
            .into_iter()
            .map(|e| e.child_node_anchor.value())
            .collect();
        assert_eq!(children, vec![3, 2]);
    }

    #[test]
    fn test_indexes_are_cleaned_up() {
        let mut tables = GraphTables::default();
        let e = edge(1, 2, 0);
        tables.replace_hierarchy_edge(e.key(), Some(e.clone()));
        assert!(tables.has_ingoing_edges(NodeRelationAnchorPoint::from_u64(2)));

        tables.replace_hierarchy_edge(e.key(), None);
        assert!(!tables.has_ingoing_edges(NodeRelationAnchorPoint::from_u64(2)));
        assert_eq!(tables, GraphTables::default());
    }
}
