//! Restriction edges: materialized suppression of disabled subtrees
//!
//! One row per (content stream, dimension space point, disabled aggregate) holds every
//! aggregate it suppresses, itself included. Closures are always recomputed from the
//! current hierarchy, never cached.

use super::event_applier::EventApplier;
use super::ProjectionResult;
use crate::dimension::{DimensionSpacePoint, DimensionSpacePointSet};
use crate::events::{NodeAggregateWasDisabled, NodeAggregateWasEnabled};
use crate::infrastructure::{GraphTables, RestrictionEdge, RestrictionEdgeKey};
use crate::value_objects::{ContentStreamId, NodeAggregateId, NodeRelationAnchorPoint};
use std::collections::{BTreeMap, BTreeSet};

/// Aggregates in the subtree of `node_aggregate_id`, per dimension space point hash.
///
/// The walk starts at the aggregate's inbound edges in the stream at the given points
/// and follows child edges within the same stream and point only.
pub fn descendant_closure(
    tables: &GraphTables,
    content_stream_id: &ContentStreamId,
    node_aggregate_id: &NodeAggregateId,
    points: &DimensionSpacePointSet,
) -> BTreeMap<String, BTreeSet<NodeAggregateId>> {
    let mut closure: BTreeMap<String, BTreeSet<NodeAggregateId>> = BTreeMap::new();
    let mut visited: BTreeSet<(NodeRelationAnchorPoint, String)> = BTreeSet::new();
    let mut stack: Vec<(NodeRelationAnchorPoint, String)> = Vec::new();

    for edge in tables.ingoing_edges_for_aggregate(content_stream_id, node_aggregate_id, points) {
        let hash = edge.dimension_space_point.hash().to_string();
        closure
            .entry(hash.clone())
            .or_default()
            .insert(node_aggregate_id.clone());
        stack.push((edge.child_node_anchor, hash));
    }

    while let Some((anchor, hash)) = stack.pop() {
        if !visited.insert((anchor, hash.clone())) {
            continue;
        }
        for edge in tables.child_edges(content_stream_id, &hash, anchor) {
            if let Some(child) = tables.node(edge.child_node_anchor) {
                closure
                    .entry(hash.clone())
                    .or_default()
                    .insert(child.node_aggregate_id.clone());
            }
            stack.push((edge.child_node_anchor, hash.clone()));
        }
    }

    closure
}

impl EventApplier<'_, '_> {
    pub(super) fn when_node_aggregate_was_disabled(
        &mut self,
        event: &NodeAggregateWasDisabled,
    ) -> ProjectionResult<()> {
        let closure = descendant_closure(
            self.tables(),
            &event.content_stream_id,
            &event.node_aggregate_id,
            &event.affected_dimension_space_points,
        );

        for (hash, affected) in closure {
            let key = RestrictionEdgeKey {
                content_stream_id: event.content_stream_id.clone(),
                dimension_space_point_hash: hash,
                origin_node_aggregate_id: event.node_aggregate_id.clone(),
            };
            let mut row = self.tx.restriction_edge(&key).cloned().unwrap_or(RestrictionEdge {
                content_stream_id: key.content_stream_id.clone(),
                dimension_space_point_hash: key.dimension_space_point_hash.clone(),
                origin_node_aggregate_id: key.origin_node_aggregate_id.clone(),
                affected_node_aggregate_ids: BTreeSet::new(),
            });
            row.affected_node_aggregate_ids.extend(affected);
            self.tx.put_restriction_edge(row);
        }
        Ok(())
    }

    pub(super) fn when_node_aggregate_was_enabled(
        &mut self,
        event: &NodeAggregateWasEnabled,
    ) -> ProjectionResult<()> {
        let closure = descendant_closure(
            self.tables(),
            &event.content_stream_id,
            &event.node_aggregate_id,
            &event.affected_dimension_space_points,
        );

        for (hash, affected) in closure {
            let key = RestrictionEdgeKey {
                content_stream_id: event.content_stream_id.clone(),
                dimension_space_point_hash: hash,
                origin_node_aggregate_id: event.node_aggregate_id.clone(),
            };
            let Some(mut row) = self.tx.restriction_edge(&key).cloned() else {
                continue;
            };
            row.affected_node_aggregate_ids
                .retain(|id| !affected.contains(id));
            if !row
                .affected_node_aggregate_ids
                .contains(&event.node_aggregate_id)
            {
                // without its origin the row no longer suppresses anything
                row.affected_node_aggregate_ids.clear();
            }
            self.tx.put_restriction_edge(row);
        }
        Ok(())
    }

    /// Let a freshly connected aggregate inherit the suppression of its parent in one point
    pub(super) fn inherit_restrictions_from_parent(
        &mut self,
        content_stream_id: &ContentStreamId,
        parent_node_aggregate_id: &NodeAggregateId,
        node_aggregate_id: &NodeAggregateId,
        dimension_space_point: &DimensionSpacePoint,
    ) {
        let inherited: Vec<RestrictionEdge> = self
            .tx
            .restriction_edges_affecting(
                content_stream_id,
                dimension_space_point.hash(),
                parent_node_aggregate_id,
            )
            .into_iter()
            .cloned()
            .collect();
        for mut row in inherited {
            row.affected_node_aggregate_ids
                .insert(node_aggregate_id.clone());
            self.tx.put_restriction_edge(row);
        }
    }

    /// Extend the parent's suppression onto the whole subtree of a moved aggregate
    pub(super) fn cascade_restrictions_from_parent(
        &mut self,
        content_stream_id: &ContentStreamId,
        parent_node_aggregate_id: &NodeAggregateId,
        node_aggregate_id: &NodeAggregateId,
        points: &DimensionSpacePointSet,
    ) {
        let closure = descendant_closure(self.tables(), content_stream_id, node_aggregate_id, points);
        for (hash, subtree) in closure {
            let inherited: Vec<RestrictionEdge> = self
                .tx
                .restriction_edges_affecting(content_stream_id, &hash, parent_node_aggregate_id)
                .into_iter()
                .cloned()
                .collect();
            for mut row in inherited {
                row.affected_node_aggregate_ids
                    .extend(subtree.iter().cloned());
                self.tx.put_restriction_edge(row);
            }
        }
    }

    /// Drop suppression that reached a subtree from outside of it
    pub(super) fn remove_inherited_restrictions(
        &mut self,
        content_stream_id: &ContentStreamId,
        node_aggregate_id: &NodeAggregateId,
        points: &DimensionSpacePointSet,
    ) {
        let closure = descendant_closure(self.tables(), content_stream_id, node_aggregate_id, points);
        for (hash, subtree) in closure {
            let inherited: Vec<RestrictionEdge> = self
                .tx
                .restriction_edges_at(content_stream_id, &hash)
                .into_iter()
                .filter(|row| !subtree.contains(&row.origin_node_aggregate_id))
                .cloned()
                .collect();
            for mut row in inherited {
                row.affected_node_aggregate_ids
                    .retain(|id| !subtree.contains(id));
                self.tx.put_restriction_edge(row);
            }
        }
    }

    /// Clean up restriction rows after a subtree lost its edges in some points.
    ///
    /// `closure` is the subtree as it was before the removal.
    pub(super) fn remove_restrictions_of_removed_subtree(
        &mut self,
        content_stream_id: &ContentStreamId,
        node_aggregate_id: &NodeAggregateId,
        points: &DimensionSpacePointSet,
        closure: BTreeMap<String, BTreeSet<NodeAggregateId>>,
    ) {
        for point in points {
            self.tx.remove_restriction_edge(&RestrictionEdgeKey {
                content_stream_id: content_stream_id.clone(),
                dimension_space_point_hash: point.hash().to_string(),
                origin_node_aggregate_id: node_aggregate_id.clone(),
            });
        }

        for (hash, subtree) in closure {
            let Some(point) = points.get_by_hash(&hash) else {
                continue;
            };
            let gone: BTreeSet<NodeAggregateId> = subtree
                .into_iter()
                .filter(|id| {
                    self.tx
                        .find_node_in_aggregate(content_stream_id, id, point)
                        .is_none()
                })
                .collect();
            if gone.is_empty() {
                continue;
            }

            let rows: Vec<RestrictionEdge> = self
                .tx
                .restriction_edges_at(content_stream_id, &hash)
                .into_iter()
                .cloned()
                .collect();
            for mut row in rows {
                if gone.contains(&row.origin_node_aggregate_id) {
                    self.tx.remove_restriction_edge(&row.key());
                    continue;
                }
                let before = row.affected_node_aggregate_ids.len();
                row.affected_node_aggregate_ids.retain(|id| !gone.contains(id));
                if row.affected_node_aggregate_ids.len() != before {
                    self.tx.put_restriction_edge(row);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::OriginDimensionSpacePoint;
    use crate::infrastructure::{HierarchyEdge, NodeRecord};
    use crate::value_objects::{
        NodeAggregateClassification, NodeTypeName, SerializedPropertyValues,
    };

    fn put_node(tables: &mut GraphTables, anchor: u64, id: &str) {
        let node = NodeRecord {
            relation_anchor_point: NodeRelationAnchorPoint::from_u64(anchor),
            node_aggregate_id: NodeAggregateId::from(id),
            origin_dimension_space_point: OriginDimensionSpacePoint::empty(),
            properties: SerializedPropertyValues::new(),
            node_type_name: NodeTypeName::from("Acme:Document"),
            classification: NodeAggregateClassification::Regular,
            node_name: None,
        };
        tables.replace_node(node.relation_anchor_point, Some(node));
    }

    fn put_edge(tables: &mut GraphTables, stream: &str, parent: u64, child: u64) {
        let edge = HierarchyEdge {
            parent_node_anchor: NodeRelationAnchorPoint::from_u64(parent),
            child_node_anchor: NodeRelationAnchorPoint::from_u64(child),
            content_stream_id: ContentStreamId::from(stream),
            dimension_space_point: DimensionSpacePoint::empty(),
            position: child as i64 * 128,
            name: None,
        };
        tables.replace_hierarchy_edge(edge.key(), Some(edge));
    }

    #[test]
    fn test_closure_is_bounded_by_content_stream() {
        let mut tables = GraphTables::default();
        put_node(&mut tables, 1, "root");
        put_node(&mut tables, 2, "a");
        put_node(&mut tables, 3, "b");
        put_node(&mut tables, 4, "c");
        put_edge(&mut tables, "cs", 0, 1);
        put_edge(&mut tables, "cs", 1, 2);
        put_edge(&mut tables, "cs", 2, 3);
        put_edge(&mut tables, "other", 2, 4);

        let closure = descendant_closure(
            &tables,
            &ContentStreamId::from("cs"),
            &NodeAggregateId::from("a"),
            &DimensionSpacePointSet::single(DimensionSpacePoint::empty()),
        );
        let subtree = &closure[DimensionSpacePoint::empty().hash()];
        assert_eq!(
            subtree.iter().map(|id| id.as_str()).collect::<Vec<_>>(),
            vec!["a", "b"]
        );
    }

    #[test]
    fn test_closure_of_uncovered_aggregate_is_empty() {
        let mut tables = GraphTables::default();
        put_node(&mut tables, 1, "a");
        let closure = descendant_closure(
            &tables,
            &ContentStreamId::from("cs"),
            &NodeAggregateId::from("a"),
            &DimensionSpacePointSet::single(DimensionSpacePoint::empty()),
        );
        assert!(closure.is_empty());
    }
}
