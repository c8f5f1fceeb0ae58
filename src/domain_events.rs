//! Domain events enum for the content graph domain

use crate::events::*;
use crate::value_objects::ContentStreamId;
use serde::{Deserialize, Serialize};

/// Closed set of events the content graph projection understands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ContentGraphEvent {
    /// An empty content stream was created
    ContentStreamWasCreated(ContentStreamWasCreated),
    /// A content stream was forked
    ContentStreamWasForked(ContentStreamWasForked),
    /// A content stream was removed
    ContentStreamWasRemoved(ContentStreamWasRemoved),
    /// A root node aggregate was created
    RootNodeAggregateWithNodeWasCreated(RootNodeAggregateWithNodeWasCreated),
    /// The coverage of a root node aggregate changed
    RootNodeAggregateDimensionsWereUpdated(RootNodeAggregateDimensionsWereUpdated),
    /// A node aggregate was created below a parent
    NodeAggregateWithNodeWasCreated(NodeAggregateWithNodeWasCreated),
    /// A node aggregate was renamed
    NodeAggregateNameWasChanged(NodeAggregateNameWasChanged),
    /// Node properties were set
    NodePropertiesWereSet(NodePropertiesWereSet),
    /// Node references were replaced
    NodeReferencesWereSet(NodeReferencesWereSet),
    /// A node aggregate was disabled
    NodeAggregateWasDisabled(NodeAggregateWasDisabled),
    /// A node aggregate was enabled
    NodeAggregateWasEnabled(NodeAggregateWasEnabled),
    /// A node aggregate was removed
    NodeAggregateWasRemoved(NodeAggregateWasRemoved),
    /// A node aggregate changed its type
    NodeAggregateTypeWasChanged(NodeAggregateTypeWasChanged),
    /// A node aggregate was moved
    NodeAggregateWasMoved(NodeAggregateWasMoved),
    /// A specialization variant was created
    NodeSpecializationVariantWasCreated(NodeSpecializationVariantWasCreated),
    /// A generalization variant was created
    NodeGeneralizationVariantWasCreated(NodeGeneralizationVariantWasCreated),
    /// A peer variant was created
    NodePeerVariantWasCreated(NodePeerVariantWasCreated),
    /// A dimension space point was moved
    DimensionSpacePointWasMoved(DimensionSpacePointWasMoved),
    /// A dimension shine-through was added
    DimensionShineThroughWasAdded(DimensionShineThroughWasAdded),
}

impl ContentGraphEvent {
    /// Every event type name handled by the projection
    pub const EVENT_TYPES: &'static [&'static str] = &[
        "ContentStreamWasCreated",
        "ContentStreamWasForked",
        "ContentStreamWasRemoved",
        "RootNodeAggregateWithNodeWasCreated",
        "RootNodeAggregateDimensionsWereUpdated",
        "NodeAggregateWithNodeWasCreated",
        "NodeAggregateNameWasChanged",
        "NodePropertiesWereSet",
        "NodeReferencesWereSet",
        "NodeAggregateWasDisabled",
        "NodeAggregateWasEnabled",
        "NodeAggregateWasRemoved",
        "NodeAggregateTypeWasChanged",
        "NodeAggregateWasMoved",
        "NodeSpecializationVariantWasCreated",
        "NodeGeneralizationVariantWasCreated",
        "NodePeerVariantWasCreated",
        "DimensionSpacePointWasMoved",
        "DimensionShineThroughWasAdded",
    ];

    /// Event types of the surrounding system that never touch the graph tables
    pub const NON_GRAPH_EVENT_TYPES: &'static [&'static str] = &[
        "RootWorkspaceWasCreated",
        "WorkspaceWasCreated",
        "WorkspaceWasRebased",
        "WorkspaceWasPublished",
        "WorkspaceWasDiscarded",
        "ContentStreamWasClosed",
        "ContentStreamWasReopened",
    ];

    /// Whether the projection handles this event type
    pub fn is_graph_event_type(event_type: &str) -> bool {
        Self::EVENT_TYPES.contains(&event_type)
    }

    /// Decode a typed event from its type name and payload
    pub fn from_parts(event_type: &str, payload: serde_json::Value) -> serde_json::Result<Self> {
        serde_json::from_value(serde_json::json!({
            "type": event_type,
            "payload": payload,
        }))
    }

    /// Decode the typed event carried by an envelope
    pub fn from_envelope(envelope: &EventEnvelope) -> serde_json::Result<Self> {
        Self::from_parts(&envelope.event_type, envelope.payload.clone())
    }

    /// Split the event into type name and payload
    pub fn into_parts(self) -> serde_json::Result<(String, serde_json::Value)> {
        let event_type = self.event_type().to_string();
        let mut tagged = serde_json::to_value(self)?;
        let payload = tagged
            .get_mut("payload")
            .map(serde_json::Value::take)
            .unwrap_or(serde_json::Value::Null);
        Ok((event_type, payload))
    }

    /// Type name of the event
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ContentStreamWasCreated(_) => "ContentStreamWasCreated",
            Self::ContentStreamWasForked(_) => "ContentStreamWasForked",
            Self::ContentStreamWasRemoved(_) => "ContentStreamWasRemoved",
            Self::RootNodeAggregateWithNodeWasCreated(_) => "RootNodeAggregateWithNodeWasCreated",
            Self::RootNodeAggregateDimensionsWereUpdated(_) => {
                "RootNodeAggregateDimensionsWereUpdated"
            }
            Self::NodeAggregateWithNodeWasCreated(_) => "NodeAggregateWithNodeWasCreated",
            Self::NodeAggregateNameWasChanged(_) => "NodeAggregateNameWasChanged",
            Self::NodePropertiesWereSet(_) => "NodePropertiesWereSet",
            Self::NodeReferencesWereSet(_) => "NodeReferencesWereSet",
            Self::NodeAggregateWasDisabled(_) => "NodeAggregateWasDisabled",
            Self::NodeAggregateWasEnabled(_) => "NodeAggregateWasEnabled",
            Self::NodeAggregateWasRemoved(_) => "NodeAggregateWasRemoved",
            Self::NodeAggregateTypeWasChanged(_) => "NodeAggregateTypeWasChanged",
            Self::NodeAggregateWasMoved(_) => "NodeAggregateWasMoved",
            Self::NodeSpecializationVariantWasCreated(_) => "NodeSpecializationVariantWasCreated",
            Self::NodeGeneralizationVariantWasCreated(_) => "NodeGeneralizationVariantWasCreated",
            Self::NodePeerVariantWasCreated(_) => "NodePeerVariantWasCreated",
            Self::DimensionSpacePointWasMoved(_) => "DimensionSpacePointWasMoved",
            Self::DimensionShineThroughWasAdded(_) => "DimensionShineThroughWasAdded",
        }
    }

    /// The content stream the event targets
    pub fn content_stream_id(&self) -> &ContentStreamId {
        match self {
            Self::ContentStreamWasCreated(e) => &e.content_stream_id,
            Self::ContentStreamWasForked(e) => &e.new_content_stream_id,
            Self::ContentStreamWasRemoved(e) => &e.content_stream_id,
            Self::RootNodeAggregateWithNodeWasCreated(e) => &e.content_stream_id,
            Self::RootNodeAggregateDimensionsWereUpdated(e) => &e.content_stream_id,
            Self::NodeAggregateWithNodeWasCreated(e) => &e.content_stream_id,
            Self::NodeAggregateNameWasChanged(e) => &e.content_stream_id,
            Self::NodePropertiesWereSet(e) => &e.content_stream_id,
            Self::NodeReferencesWereSet(e) => &e.content_stream_id,
            Self::NodeAggregateWasDisabled(e) => &e.content_stream_id,
            Self::NodeAggregateWasEnabled(e) => &e.content_stream_id,
            Self::NodeAggregateWasRemoved(e) => &e.content_stream_id,
            Self::NodeAggregateTypeWasChanged(e) => &e.content_stream_id,
            Self::NodeAggregateWasMoved(e) => &e.content_stream_id,
            Self::NodeSpecializationVariantWasCreated(e) => &e.content_stream_id,
            Self::NodeGeneralizationVariantWasCreated(e) => &e.content_stream_id,
            Self::NodePeerVariantWasCreated(e) => &e.content_stream_id,
            Self::DimensionSpacePointWasMoved(e) => &e.content_stream_id,
            Self::DimensionShineThroughWasAdded(e) => &e.content_stream_id,
        }
    }
}

macro_rules! impl_from_event {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for ContentGraphEvent {
                fn from(event: $variant) -> Self {
                    Self::$variant(event)
                }
            }
        )*
    };
}

impl_from_event!(
    ContentStreamWasCreated,
    ContentStreamWasForked,
    ContentStreamWasRemoved,
    RootNodeAggregateWithNodeWasCreated,
    RootNodeAggregateDimensionsWereUpdated,
    NodeAggregateWithNodeWasCreated,
    NodeAggregateNameWasChanged,
    NodePropertiesWereSet,
    NodeReferencesWereSet,
    NodeAggregateWasDisabled,
    NodeAggregateWasEnabled,
    NodeAggregateWasRemoved,
    NodeAggregateTypeWasChanged,
    NodeAggregateWasMoved,
    NodeSpecializationVariantWasCreated,
    NodeGeneralizationVariantWasCreated,
    NodePeerVariantWasCreated,
    DimensionSpacePointWasMoved,
    DimensionShineThroughWasAdded,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::{NodeAggregateId, NodeName};

    #[test]
    fn test_parts_round_trip() {
        let event = ContentGraphEvent::from(NodeAggregateNameWasChanged {
            content_stream_id: ContentStreamId::from("cs"),
            node_aggregate_id: NodeAggregateId::from("nody"),
            new_node_name: NodeName::from("renamed"),
        });

        let (event_type, payload) = event.clone().into_parts().unwrap();
        assert_eq!(event_type, "NodeAggregateNameWasChanged");
        assert_eq!(payload["new_node_name"], "renamed");

        let decoded = ContentGraphEvent::from_parts(&event_type, payload).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn test_unknown_type_does_not_decode() {
        let result = ContentGraphEvent::from_parts("NodeWasMoved", serde_json::json!({}));
        assert!(result.is_err());
        assert!(!ContentGraphEvent::is_graph_event_type("NodeWasMoved"));
    }

    #[test]
    fn test_every_declared_type_is_known() {
        assert_eq!(ContentGraphEvent::EVENT_TYPES.len(), 19);
        for event_type in ContentGraphEvent::NON_GRAPH_EVENT_TYPES {
            assert!(!ContentGraphEvent::is_graph_event_type(event_type));
        }
    }
}
