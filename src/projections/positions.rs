//! Sibling position assignment
//!
//! Positions are integers, unique and totally ordered per (content stream, dimension
//! space point, parent). Siblings are kept on multiples of the default offset; a new
//! sibling takes the midpoint of its gap. An odd midpoint means the gap is exhausted,
//! and all siblings of that parent in that point are relabeled before inserting.

use super::event_applier::EventApplier;
use crate::dimension::DimensionSpacePoint;
use crate::infrastructure::{GraphTables, HierarchyEdge};
use crate::value_objects::{ContentStreamId, NodeAggregateId, NodeName, NodeRelationAnchorPoint};

/// Position a new child of `parent` would take before `succeeding_sibling`, without
/// relabeling. Appends if there is no succeeding sibling below that parent.
pub fn determine_relation_position(
    tables: &GraphTables,
    relation_offset: i64,
    content_stream_id: &ContentStreamId,
    dimension_space_point_hash: &str,
    parent: NodeRelationAnchorPoint,
    succeeding_sibling: Option<NodeRelationAnchorPoint>,
) -> i64 {
    let siblings = tables.child_edges(content_stream_id, dimension_space_point_hash, parent);
    let succeeding = succeeding_sibling
        .and_then(|anchor| siblings.iter().find(|e| e.child_node_anchor == anchor));

    match succeeding {
        Some(succeeding) => {
            let preceding = siblings
                .iter()
                .map(|e| e.position)
                .filter(|p| *p < succeeding.position)
                .max();
            match preceding {
                None => succeeding.position - relation_offset,
                Some(preceding) => (succeeding.position + preceding) / 2,
            }
        }
        None => siblings
            .iter()
            .map(|e| e.position)
            .max()
            .map_or(0, |max| max + relation_offset),
    }
}

impl EventApplier<'_, '_> {
    /// Position for a new child, relabeling the siblings if the gap is exhausted
    pub(super) fn relation_position(
        &mut self,
        content_stream_id: &ContentStreamId,
        dimension_space_point: &DimensionSpacePoint,
        parent: NodeRelationAnchorPoint,
        succeeding_sibling: Option<NodeRelationAnchorPoint>,
    ) -> i64 {
        let hash = dimension_space_point.hash();
        let position = determine_relation_position(
            self.tables(),
            self.relation_offset,
            content_stream_id,
            hash,
            parent,
            succeeding_sibling,
        );
        let collides = self
            .tx
            .child_edges(content_stream_id, hash, parent)
            .iter()
            .any(|e| e.position == position);

        if position % 2 != 0 || collides {
            self.relation_position_after_recalculation(
                content_stream_id,
                hash,
                parent,
                succeeding_sibling,
            )
        } else {
            position
        }
    }

    fn relation_position_after_recalculation(
        &mut self,
        content_stream_id: &ContentStreamId,
        dimension_space_point_hash: &str,
        parent: NodeRelationAnchorPoint,
        succeeding_sibling: Option<NodeRelationAnchorPoint>,
    ) -> i64 {
        let siblings: Vec<HierarchyEdge> = self
            .tx
            .child_edges(content_stream_id, dimension_space_point_hash, parent)
            .into_iter()
            .cloned()
            .collect();
        tracing::debug!(
            content_stream_id = %content_stream_id,
            parent = %parent,
            siblings = siblings.len(),
            "recalculating sibling positions"
        );

        let mut offset = 0;
        let mut position = None;
        for mut edge in siblings {
            offset += self.relation_offset;
            if Some(edge.child_node_anchor) == succeeding_sibling {
                position = Some(offset);
                offset += self.relation_offset;
            }
            edge.position = offset;
            self.tx.put_hierarchy_edge(edge);
        }

        position.unwrap_or(offset + self.relation_offset)
    }

    /// Anchor of the succeeding sibling in one point, if it exists there
    pub(super) fn sibling_anchor(
        &self,
        content_stream_id: &ContentStreamId,
        sibling: Option<&NodeAggregateId>,
        dimension_space_point: &DimensionSpacePoint,
    ) -> Option<NodeRelationAnchorPoint> {
        let tables = self.tables();
        sibling
            .and_then(|id| tables.find_node_in_aggregate(content_stream_id, id, dimension_space_point))
            .map(|node| node.relation_anchor_point)
    }

    /// Create the edge from `parent` to `child` at the computed position
    pub(super) fn connect_hierarchy(
        &mut self,
        content_stream_id: &ContentStreamId,
        parent: NodeRelationAnchorPoint,
        child: NodeRelationAnchorPoint,
        dimension_space_point: &DimensionSpacePoint,
        succeeding_sibling: Option<NodeRelationAnchorPoint>,
        name: Option<NodeName>,
    ) {
        let position =
            self.relation_position(content_stream_id, dimension_space_point, parent, succeeding_sibling);
        self.tx.put_hierarchy_edge(HierarchyEdge {
            parent_node_anchor: parent,
            child_node_anchor: child,
            content_stream_id: content_stream_id.clone(),
            dimension_space_point: dimension_space_point.clone(),
            position,
            name,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ContentGraphStore;
    use chrono::Utc;

    fn cs() -> ContentStreamId {
        ContentStreamId::from("cs")
    }

    fn anchor(value: u64) -> NodeRelationAnchorPoint {
        NodeRelationAnchorPoint::from_u64(value)
    }

    fn positions(store: &ContentGraphStore) -> Vec<(u64, i64)> {
        store
            .read()
            .child_edges(&cs(), DimensionSpacePoint::empty().hash(), anchor(1))
            .into_iter()
            .map(|e| (e.child_node_anchor.value(), e.position))
            .collect()
    }

    fn insert(store: &ContentGraphStore, child: u64, before: Option<u64>) {
        store
            .transactional(|tx| {
                let mut applier = EventApplier::new(tx, 128, Utc::now());
                applier.connect_hierarchy(
                    &cs(),
                    anchor(1),
                    anchor(child),
                    &DimensionSpacePoint::empty(),
                    before.map(anchor),
                    None,
                );
                Ok::<_, ()>(())
            })
            .unwrap();
    }

    #[test]
    fn test_append_uses_default_offset() {
        let store = ContentGraphStore::new();
        insert(&store, 10, None);
        insert(&store, 11, None);
        assert_eq!(positions(&store), vec![(10, 0), (11, 128)]);
    }

    #[test]
    fn test_insert_before_first_sibling() {
        let store = ContentGraphStore::new();
        insert(&store, 10, None);
        insert(&store, 11, Some(10));
        assert_eq!(positions(&store), vec![(11, -128), (10, 0)]);
    }

    #[test]
    fn test_insert_between_takes_midpoint() {
        let store = ContentGraphStore::new();
        insert(&store, 10, None);
        insert(&store, 11, None);
        insert(&store, 12, Some(11));
        assert_eq!(positions(&store), vec![(10, 0), (12, 64), (11, 128)]);
    }

    #[test]
    fn test_exhausted_gap_triggers_relabeling() {
        let store = ContentGraphStore::new();
        insert(&store, 10, None);
        insert(&store, 11, None);
        // 64, 32, 16, 8, 4, 2, then the midpoint of 0 and 2 is odd
        for child in 12..=18 {
            insert(&store, child, Some(child - 1));
        }

        let order: Vec<u64> = positions(&store).into_iter().map(|(c, _)| c).collect();
        assert_eq!(order, vec![10, 18, 17, 16, 15, 14, 13, 12, 11]);

        let all: Vec<i64> = positions(&store).into_iter().map(|(_, p)| p).collect();
        assert!(all.iter().all(|p| p % 2 == 0));
        assert_eq!(all, vec![128, 256, 384, 512, 640, 768, 896, 1024, 1152]);
    }

    #[test]
    fn test_unknown_sibling_appends() {
        let store = ContentGraphStore::new();
        insert(&store, 10, None);
        insert(&store, 11, Some(99));
        assert_eq!(positions(&store), vec![(10, 0), (11, 128)]);
    }
}
