//! Node read models returned by subgraph queries

use crate::dimension::{DimensionSpacePoint, OriginDimensionSpacePoint};
use crate::infrastructure::NodeRecord;
use crate::value_objects::{
    ContentStreamId, NodeAggregateClassification, NodeAggregateId, NodeName, NodeTypeName,
    ReferenceName, SerializedPropertyValues,
};
use serde::{Deserialize, Serialize};

/// Which restricted nodes a subgraph hides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisibilityConstraints {
    /// Every node is visible, disabled or not
    WithoutRestrictions,
    /// Disabled nodes and their descendants are hidden
    Frontend,
}

impl VisibilityConstraints {
    /// Whether restriction edges are applied
    pub fn is_restricted(&self) -> bool {
        matches!(self, Self::Frontend)
    }
}

/// A node as seen from one content stream and dimension space point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Stream of the subgraph the node was read from
    pub content_stream_id: ContentStreamId,
    /// Point of the subgraph the node was read from
    pub dimension_space_point: DimensionSpacePoint,
    /// Logical identity
    pub node_aggregate_id: NodeAggregateId,
    /// Where the node's content is authored
    pub origin_dimension_space_point: OriginDimensionSpacePoint,
    /// Node type
    pub node_type_name: NodeTypeName,
    /// Root, regular or tethered
    pub classification: NodeAggregateClassification,
    /// Name on the inbound edge in this point
    pub node_name: Option<NodeName>,
    /// Serialized properties
    pub properties: SerializedPropertyValues,
}

impl Node {
    pub(crate) fn from_record(
        record: &NodeRecord,
        content_stream_id: &ContentStreamId,
        dimension_space_point: &DimensionSpacePoint,
        node_name: Option<NodeName>,
    ) -> Self {
        Self {
            content_stream_id: content_stream_id.clone(),
            dimension_space_point: dimension_space_point.clone(),
            node_aggregate_id: record.node_aggregate_id.clone(),
            origin_dimension_space_point: record.origin_dimension_space_point.clone(),
            node_type_name: record.node_type_name.clone(),
            classification: record.classification,
            node_name,
            properties: record.properties.clone(),
        }
    }

    /// Whether the node is visible here only through fallback
    pub fn is_fallback(&self) -> bool {
        self.origin_dimension_space_point.as_dimension_space_point() != &self.dimension_space_point
    }
}

/// One reference between two nodes of a subgraph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    /// The node at the other end: the target for outgoing, the source for back references
    pub node: Node,
    /// Reference name
    pub name: ReferenceName,
    /// Properties carried on the reference
    pub properties: Option<SerializedPropertyValues>,
}
