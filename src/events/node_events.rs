//! Node aggregate events

use super::InterdimensionalSiblings;
use crate::dimension::{DimensionSpacePointSet, OriginDimensionSpacePoint, OriginDimensionSpacePointSet};
use crate::value_objects::{
    ContentStreamId, NodeAggregateClassification, NodeAggregateId, NodeName, NodeReferenceToWrite,
    NodeTypeName, ReferenceName, SerializedPropertyValues,
};
use serde::{Deserialize, Serialize};

/// A root node aggregate with its single node was created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootNodeAggregateWithNodeWasCreated {
    /// The target stream
    pub content_stream_id: ContentStreamId,
    /// The new root aggregate
    pub node_aggregate_id: NodeAggregateId,
    /// Type of the root
    pub node_type_name: NodeTypeName,
    /// Points in which the root is visible
    pub covered_dimension_space_points: DimensionSpacePointSet,
    /// Always root
    pub node_aggregate_classification: NodeAggregateClassification,
}

/// The coverage of a root node aggregate was updated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootNodeAggregateDimensionsWereUpdated {
    /// The target stream
    pub content_stream_id: ContentStreamId,
    /// The root aggregate
    pub node_aggregate_id: NodeAggregateId,
    /// The new coverage
    pub covered_dimension_space_points: DimensionSpacePointSet,
}

/// A node aggregate with its first node was created below a parent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeAggregateWithNodeWasCreated {
    /// The target stream
    pub content_stream_id: ContentStreamId,
    /// The new aggregate
    pub node_aggregate_id: NodeAggregateId,
    /// Type of the new node
    pub node_type_name: NodeTypeName,
    /// Point where the node is authored
    pub origin_dimension_space_point: OriginDimensionSpacePoint,
    /// Succeeding sibling per covered point, defines the coverage
    pub succeeding_siblings: InterdimensionalSiblings,
    /// The parent aggregate
    pub parent_node_aggregate_id: NodeAggregateId,
    /// Optional name, unique among the siblings
    pub node_name: Option<NodeName>,
    /// Initial properties including defaults
    pub initial_property_values: SerializedPropertyValues,
    /// Regular or tethered
    pub node_aggregate_classification: NodeAggregateClassification,
}

/// A node aggregate was renamed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeAggregateNameWasChanged {
    /// The target stream
    pub content_stream_id: ContentStreamId,
    /// The renamed aggregate
    pub node_aggregate_id: NodeAggregateId,
    /// The new name
    pub new_node_name: NodeName,
}

/// Properties of one node were set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodePropertiesWereSet {
    /// The target stream
    pub content_stream_id: ContentStreamId,
    /// The aggregate of the node
    pub node_aggregate_id: NodeAggregateId,
    /// Origin of the node being modified
    pub origin_dimension_space_point: OriginDimensionSpacePoint,
    /// Values merged over the current properties
    pub property_values: SerializedPropertyValues,
    /// Properties removed after merging
    #[serde(default)]
    pub properties_to_unset: Vec<String>,
}

/// All references of one name were replaced for one node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeReferencesWereSet {
    /// The target stream
    pub content_stream_id: ContentStreamId,
    /// The referencing aggregate
    pub source_node_aggregate_id: NodeAggregateId,
    /// Origin of the referencing node
    pub source_origin_dimension_space_point: OriginDimensionSpacePoint,
    /// The reference name
    pub reference_name: ReferenceName,
    /// The new ordered references
    pub references: Vec<NodeReferenceToWrite>,
}

/// A node aggregate was disabled (hidden) in some points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeAggregateWasDisabled {
    /// The target stream
    pub content_stream_id: ContentStreamId,
    /// The disabled aggregate
    pub node_aggregate_id: NodeAggregateId,
    /// Points in which it is disabled
    pub affected_dimension_space_points: DimensionSpacePointSet,
}

/// A node aggregate was enabled (shown again) in some points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeAggregateWasEnabled {
    /// The target stream
    pub content_stream_id: ContentStreamId,
    /// The enabled aggregate
    pub node_aggregate_id: NodeAggregateId,
    /// Points in which it is enabled
    pub affected_dimension_space_points: DimensionSpacePointSet,
}

/// A node aggregate was removed from some or all of its points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeAggregateWasRemoved {
    /// The target stream
    pub content_stream_id: ContentStreamId,
    /// The removed aggregate
    pub node_aggregate_id: NodeAggregateId,
    /// Origins of the nodes affected by the removal
    pub affected_occupied_dimension_space_points: OriginDimensionSpacePointSet,
    /// Points from which the aggregate is removed
    pub affected_covered_dimension_space_points: DimensionSpacePointSet,
}

/// The type of a node aggregate was changed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeAggregateTypeWasChanged {
    /// The target stream
    pub content_stream_id: ContentStreamId,
    /// The changed aggregate
    pub node_aggregate_id: NodeAggregateId,
    /// The new type
    pub new_node_type_name: NodeTypeName,
}

/// A node aggregate was moved to a new parent and/or a new position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeAggregateWasMoved {
    /// The target stream
    pub content_stream_id: ContentStreamId,
    /// The moved aggregate
    pub node_aggregate_id: NodeAggregateId,
    /// The new parent, `None` keeps the current parent
    pub new_parent_node_aggregate_id: Option<NodeAggregateId>,
    /// Succeeding sibling per affected point
    pub succeeding_siblings: InterdimensionalSiblings,
}
