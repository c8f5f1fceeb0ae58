//! Content stream lifecycle
//!
//! Forking duplicates the edges of the source stream; node rows stay shared until a
//! mutation copies them.

use super::event_applier::EventApplier;
use super::ProjectionResult;
use crate::events::{ContentStreamWasCreated, ContentStreamWasForked, ContentStreamWasRemoved};
use crate::infrastructure::{ContentStreamRecord, HierarchyEdge, RestrictionEdge};
use std::collections::BTreeSet;

impl EventApplier<'_, '_> {
    pub(super) fn when_content_stream_was_created(
        &mut self,
        event: &ContentStreamWasCreated,
    ) -> ProjectionResult<()> {
        self.tx.put_content_stream(ContentStreamRecord {
            content_stream_id: event.content_stream_id.clone(),
            source_content_stream_id: None,
            created_at: self.recorded_at,
        });
        Ok(())
    }

    pub(super) fn when_content_stream_was_forked(
        &mut self,
        event: &ContentStreamWasForked,
    ) -> ProjectionResult<()> {
        let edges: Vec<HierarchyEdge> = self
            .tx
            .hierarchy_edges_in(&event.source_content_stream_id)
            .cloned()
            .collect();
        let restrictions: Vec<RestrictionEdge> = self
            .tx
            .restriction_edges_in(&event.source_content_stream_id)
            .cloned()
            .collect();
        tracing::debug!(
            source = %event.source_content_stream_id,
            target = %event.new_content_stream_id,
            hierarchy_edges = edges.len(),
            restriction_edges = restrictions.len(),
            "forking content stream"
        );

        for edge in edges {
            self.tx.put_hierarchy_edge(HierarchyEdge {
                content_stream_id: event.new_content_stream_id.clone(),
                ..edge
            });
        }
        for restriction in restrictions {
            self.tx.put_restriction_edge(RestrictionEdge {
                content_stream_id: event.new_content_stream_id.clone(),
                ..restriction
            });
        }
        self.tx.put_content_stream(ContentStreamRecord {
            content_stream_id: event.new_content_stream_id.clone(),
            source_content_stream_id: Some(event.source_content_stream_id.clone()),
            created_at: self.recorded_at,
        });
        Ok(())
    }

    pub(super) fn when_content_stream_was_removed(
        &mut self,
        event: &ContentStreamWasRemoved,
    ) -> ProjectionResult<()> {
        let edges: Vec<HierarchyEdge> = self
            .tx
            .hierarchy_edges_in(&event.content_stream_id)
            .cloned()
            .collect();
        let mut children = BTreeSet::new();
        for edge in edges {
            children.insert(edge.child_node_anchor);
            self.tx.remove_hierarchy_edge(&edge.key());
        }
        for anchor in children {
            self.remove_node_if_orphaned(anchor);
        }

        let restrictions: Vec<RestrictionEdge> = self
            .tx
            .restriction_edges_in(&event.content_stream_id)
            .cloned()
            .collect();
        for restriction in restrictions {
            self.tx.remove_restriction_edge(&restriction.key());
        }

        self.tx.remove_content_stream(&event.content_stream_id);
        Ok(())
    }
}
