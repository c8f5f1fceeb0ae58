//! Node-level reads within one content stream and dimension space point

use super::node::{Node, Reference, VisibilityConstraints};
use crate::dimension::DimensionSpacePoint;
use crate::infrastructure::{ContentGraphStore, GraphTables, HierarchyEdge, NodeRecord};
use crate::value_objects::{ContentStreamId, NodeAggregateId, NodeName, NodeTypeName};

/// The tree of nodes visible in one content stream at one dimension space point
#[derive(Clone)]
pub struct ContentSubgraph {
    store: ContentGraphStore,
    content_stream_id: ContentStreamId,
    dimension_space_point: DimensionSpacePoint,
    visibility_constraints: VisibilityConstraints,
}

impl ContentSubgraph {
    pub(crate) fn new(
        store: ContentGraphStore,
        content_stream_id: ContentStreamId,
        dimension_space_point: DimensionSpacePoint,
        visibility_constraints: VisibilityConstraints,
    ) -> Self {
        Self {
            store,
            content_stream_id,
            dimension_space_point,
            visibility_constraints,
        }
    }

    pub fn content_stream_id(&self) -> &ContentStreamId {
        &self.content_stream_id
    }

    pub fn dimension_space_point(&self) -> &DimensionSpacePoint {
        &self.dimension_space_point
    }

    pub fn visibility_constraints(&self) -> VisibilityConstraints {
        self.visibility_constraints
    }

    /// The node of an aggregate visible in this subgraph
    pub fn find_node_by_id(&self, node_aggregate_id: &NodeAggregateId) -> Option<Node> {
        let tables = self.store.read();
        let (record, edge) = self.visible_node(&tables, node_aggregate_id)?;
        Some(self.to_node(record, edge))
    }

    /// Visible children of a node, ordered by position
    pub fn find_child_nodes(&self, parent_node_aggregate_id: &NodeAggregateId) -> Vec<Node> {
        self.find_child_nodes_filtered(parent_node_aggregate_id, None)
    }

    /// Visible children of a node with one of the given types, ordered by position
    pub fn find_child_nodes_of_type(
        &self,
        parent_node_aggregate_id: &NodeAggregateId,
        node_type_names: &[NodeTypeName],
    ) -> Vec<Node> {
        self.find_child_nodes_filtered(parent_node_aggregate_id, Some(node_type_names))
    }

    /// The visible child connected through an edge of the given name
    pub fn find_child_node_by_name(
        &self,
        parent_node_aggregate_id: &NodeAggregateId,
        node_name: &NodeName,
    ) -> Option<Node> {
        self.find_child_nodes(parent_node_aggregate_id)
            .into_iter()
            .find(|node| node.node_name.as_ref() == Some(node_name))
    }

    /// Parent of a node; `None` for root nodes
    pub fn find_parent_node(&self, child_node_aggregate_id: &NodeAggregateId) -> Option<Node> {
        let tables = self.store.read();
        let (_, edge) = self.visible_node(&tables, child_node_aggregate_id)?;
        if edge.parent_node_anchor.is_root_edge() {
            return None;
        }
        let parent = tables.node(edge.parent_node_anchor)?;
        if !self.is_visible(&tables, &parent.node_aggregate_id) {
            return None;
        }
        let parent_edge = self.ingoing_edge(&tables, parent)?;
        Some(self.to_node(parent, parent_edge))
    }

    /// Visible siblings after a node, nearest first
    pub fn find_succeeding_sibling_nodes(&self, node_aggregate_id: &NodeAggregateId) -> Vec<Node> {
        self.find_siblings(node_aggregate_id, |position, own| position > own)
    }

    /// Visible siblings before a node, nearest first
    pub fn find_preceding_sibling_nodes(&self, node_aggregate_id: &NodeAggregateId) -> Vec<Node> {
        let mut siblings = self.find_siblings(node_aggregate_id, |position, own| position < own);
        siblings.reverse();
        siblings
    }

    /// Visible descendants of a node in depth-first pre-order
    pub fn find_descendant_nodes(&self, entry_node_aggregate_id: &NodeAggregateId) -> Vec<Node> {
        let tables = self.store.read();
        let Some((entry, _)) = self.visible_node(&tables, entry_node_aggregate_id) else {
            return Vec::new();
        };

        let mut descendants = Vec::new();
        let mut stack: Vec<&HierarchyEdge> = self.visible_child_edges(&tables, entry);
        stack.reverse();
        while let Some(edge) = stack.pop() {
            let Some(record) = tables.node(edge.child_node_anchor) else {
                continue;
            };
            descendants.push(self.to_node(record, edge));
            let mut children = self.visible_child_edges(&tables, record);
            children.reverse();
            stack.extend(children);
        }
        descendants
    }

    /// Outgoing references of a node whose targets are visible, ordered by name and position
    pub fn find_references(&self, node_aggregate_id: &NodeAggregateId) -> Vec<Reference> {
        let tables = self.store.read();
        let Some((source, _)) = self.visible_node(&tables, node_aggregate_id) else {
            return Vec::new();
        };
        tables
            .references_of(source.relation_anchor_point)
            .into_iter()
            .filter_map(|reference| {
                let (target, edge) =
                    self.visible_node(&tables, &reference.target_node_aggregate_id)?;
                Some(Reference {
                    node: self.to_node(target, edge),
                    name: reference.name.clone(),
                    properties: reference.properties.clone(),
                })
            })
            .collect()
    }

    /// Visible nodes referencing a node
    pub fn find_back_references(&self, node_aggregate_id: &NodeAggregateId) -> Vec<Reference> {
        let tables = self.store.read();
        if self.visible_node(&tables, node_aggregate_id).is_none() {
            return Vec::new();
        }
        let mut back_references: Vec<Reference> = tables
            .references_to(node_aggregate_id)
            .into_iter()
            .filter_map(|reference| {
                let source = tables.node(reference.node_anchor_point)?;
                if !self.is_visible(&tables, &source.node_aggregate_id) {
                    return None;
                }
                let edge = self.ingoing_edge(&tables, source)?;
                Some(Reference {
                    node: self.to_node(source, edge),
                    name: reference.name.clone(),
                    properties: reference.properties.clone(),
                })
            })
            .collect();
        back_references.sort_by(|a, b| {
            (a.name.as_str(), a.node.node_aggregate_id.as_str())
                .cmp(&(b.name.as_str(), b.node.node_aggregate_id.as_str()))
        });
        back_references
    }

    /// Number of visible nodes
    pub fn count_nodes(&self) -> usize {
        let tables = self.store.read();
        let hash = self.dimension_space_point.hash();
        tables
            .hierarchy_edges_in(&self.content_stream_id)
            .filter(|edge| edge.dimension_space_point.hash() == hash)
            .filter_map(|edge| tables.node(edge.child_node_anchor))
            .filter(|node| self.is_visible(&tables, &node.node_aggregate_id))
            .count()
    }

    fn find_child_nodes_filtered(
        &self,
        parent_node_aggregate_id: &NodeAggregateId,
        node_type_names: Option<&[NodeTypeName]>,
    ) -> Vec<Node> {
        let tables = self.store.read();
        let Some((parent, _)) = self.visible_node(&tables, parent_node_aggregate_id) else {
            return Vec::new();
        };
        self.visible_child_edges(&tables, parent)
            .into_iter()
            .filter_map(|edge| {
                let child = tables.node(edge.child_node_anchor)?;
                match node_type_names {
                    Some(types) if !types.contains(&child.node_type_name) => None,
                    _ => Some(self.to_node(child, edge)),
                }
            })
            .collect()
    }

    fn find_siblings(
        &self,
        node_aggregate_id: &NodeAggregateId,
        keep: impl Fn(i64, i64) -> bool,
    ) -> Vec<Node> {
        let tables = self.store.read();
        let Some((_, edge)) = self.visible_node(&tables, node_aggregate_id) else {
            return Vec::new();
        };
        if edge.parent_node_anchor.is_root_edge() {
            return Vec::new();
        }
        let Some(parent) = tables.node(edge.parent_node_anchor) else {
            return Vec::new();
        };
        self.visible_child_edges(&tables, parent)
            .into_iter()
            .filter(|sibling| keep(sibling.position, edge.position))
            .filter_map(|sibling| {
                let record = tables.node(sibling.child_node_anchor)?;
                Some(self.to_node(record, sibling))
            })
            .collect()
    }

    fn visible_node<'t>(
        &self,
        tables: &'t GraphTables,
        node_aggregate_id: &NodeAggregateId,
    ) -> Option<(&'t NodeRecord, &'t HierarchyEdge)> {
        if !self.is_visible(tables, node_aggregate_id) {
            return None;
        }
        let record = tables.find_node_in_aggregate(
            &self.content_stream_id,
            node_aggregate_id,
            &self.dimension_space_point,
        )?;
        let edge = self.ingoing_edge(tables, record)?;
        Some((record, edge))
    }

    fn visible_child_edges<'t>(
        &self,
        tables: &'t GraphTables,
        parent: &NodeRecord,
    ) -> Vec<&'t HierarchyEdge> {
        tables
            .child_edges(
                &self.content_stream_id,
                self.dimension_space_point.hash(),
                parent.relation_anchor_point,
            )
            .into_iter()
            .filter(|edge| {
                tables
                    .node(edge.child_node_anchor)
                    .map_or(false, |child| self.is_visible(tables, &child.node_aggregate_id))
            })
            .collect()
    }

    fn ingoing_edge<'t>(
        &self,
        tables: &'t GraphTables,
        record: &NodeRecord,
    ) -> Option<&'t HierarchyEdge> {
        tables.ingoing_edge_in(
            &self.content_stream_id,
            record.relation_anchor_point,
            self.dimension_space_point.hash(),
        )
    }

    fn is_visible(&self, tables: &GraphTables, node_aggregate_id: &NodeAggregateId) -> bool {
        !self.visibility_constraints.is_restricted()
            || !tables.is_restricted(
                &self.content_stream_id,
                self.dimension_space_point.hash(),
                node_aggregate_id,
            )
    }

    fn to_node(&self, record: &NodeRecord, edge: &HierarchyEdge) -> Node {
        Node::from_record(
            record,
            &self.content_stream_id,
            &self.dimension_space_point,
            edge.name.clone(),
        )
    }
}
