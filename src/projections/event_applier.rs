//! Dispatch of one decoded event onto the tables
//!
//! The per-event handlers live in the feature modules next to this one, each as an
//! `impl EventApplier` block. They all run inside the transaction of their event.

use super::{MissingRecord, ProjectionError, ProjectionResult};
use crate::domain_events::ContentGraphEvent;
use crate::infrastructure::{GraphTables, Transaction};
use chrono::{DateTime, Utc};

/// Applies events inside one transaction
pub(crate) struct EventApplier<'t, 'a> {
    pub(super) tx: &'t mut Transaction<'a>,
    pub(super) relation_offset: i64,
    pub(super) recorded_at: DateTime<Utc>,
    pub(super) event_type: &'static str,
}

impl<'t, 'a> EventApplier<'t, 'a> {
    pub(crate) fn new(
        tx: &'t mut Transaction<'a>,
        relation_offset: i64,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            tx,
            relation_offset,
            recorded_at,
            event_type: "",
        }
    }

    pub(super) fn tables(&self) -> &GraphTables {
        &**self.tx
    }

    pub(super) fn missing(&self, missing: MissingRecord) -> ProjectionError {
        ProjectionError::EventCouldNotBeApplied {
            event_type: self.event_type,
            missing,
        }
    }

    pub(crate) fn apply(&mut self, event: &ContentGraphEvent) -> ProjectionResult<()> {
        self.event_type = event.event_type();
        match event {
            ContentGraphEvent::ContentStreamWasCreated(e) => self.when_content_stream_was_created(e),
            ContentGraphEvent::ContentStreamWasForked(e) => self.when_content_stream_was_forked(e),
            ContentGraphEvent::ContentStreamWasRemoved(e) => self.when_content_stream_was_removed(e),
            ContentGraphEvent::RootNodeAggregateWithNodeWasCreated(e) => {
                self.when_root_node_aggregate_with_node_was_created(e)
            }
            ContentGraphEvent::RootNodeAggregateDimensionsWereUpdated(e) => {
                self.when_root_node_aggregate_dimensions_were_updated(e)
            }
            ContentGraphEvent::NodeAggregateWithNodeWasCreated(e) => {
                self.when_node_aggregate_with_node_was_created(e)
            }
            ContentGraphEvent::NodeAggregateNameWasChanged(e) => {
                self.when_node_aggregate_name_was_changed(e)
            }
            ContentGraphEvent::NodePropertiesWereSet(e) => self.when_node_properties_were_set(e),
            ContentGraphEvent::NodeReferencesWereSet(e) => self.when_node_references_were_set(e),
            ContentGraphEvent::NodeAggregateWasDisabled(e) => self.when_node_aggregate_was_disabled(e),
            ContentGraphEvent::NodeAggregateWasEnabled(e) => self.when_node_aggregate_was_enabled(e),
            ContentGraphEvent::NodeAggregateWasRemoved(e) => self.when_node_aggregate_was_removed(e),
            ContentGraphEvent::NodeAggregateTypeWasChanged(e) => {
                self.when_node_aggregate_type_was_changed(e)
            }
            ContentGraphEvent::NodeAggregateWasMoved(e) => self.when_node_aggregate_was_moved(e),
            ContentGraphEvent::NodeSpecializationVariantWasCreated(e) => {
                self.when_node_specialization_variant_was_created(e)
            }
            ContentGraphEvent::NodeGeneralizationVariantWasCreated(e) => {
                self.when_node_generalization_variant_was_created(e)
            }
            ContentGraphEvent::NodePeerVariantWasCreated(e) => {
                self.when_node_peer_variant_was_created(e)
            }
            ContentGraphEvent::DimensionSpacePointWasMoved(e) => {
                self.when_dimension_space_point_was_moved(e)
            }
            ContentGraphEvent::DimensionShineThroughWasAdded(e) => {
                self.when_dimension_shine_through_was_added(e)
            }
        }
    }
}
