//! Content graph commands
//!
//! Commands represent intent to modify the content graph. They are validated against
//! the current read model by the command handler, which emits the corresponding events.

mod error;

pub use error::{CommandError, CommandResult, ErrorCategory};

use crate::dimension::{DimensionSpacePoint, OriginDimensionSpacePoint};
use crate::value_objects::{
    ContentStreamId, NodeAggregateId, NodeName, NodeReferenceToWrite, NodeTypeName,
    ReferenceName, SerializedPropertyValues,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a structural operation on one dimension space point fans out to others
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationDistributionStrategy {
    /// Only the given point
    Scatter,
    /// Every point the aggregate covers
    GatherAll,
    /// The given point and its covered specializations
    GatherSpecializations,
}

/// Commands for content graph operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ContentGraphCommand {
    /// Create an empty content stream
    CreateContentStream {
        /// The new stream
        content_stream_id: ContentStreamId,
    },

    /// Fork a content stream
    ForkContentStream {
        /// The new stream
        new_content_stream_id: ContentStreamId,
        /// The stream to fork
        source_content_stream_id: ContentStreamId,
    },

    /// Remove a content stream
    RemoveContentStream {
        /// The stream to remove
        content_stream_id: ContentStreamId,
    },

    /// Create a root node aggregate covering the whole dimension space
    CreateRootNodeAggregateWithNode {
        /// The target stream
        content_stream_id: ContentStreamId,
        /// The new aggregate
        node_aggregate_id: NodeAggregateId,
        /// A root node type
        node_type_name: NodeTypeName,
    },

    /// Create a node aggregate below a parent, with the tethered descendants its type declares
    CreateNodeAggregateWithNode {
        /// The target stream
        content_stream_id: ContentStreamId,
        /// The new aggregate
        node_aggregate_id: NodeAggregateId,
        /// Its node type
        node_type_name: NodeTypeName,
        /// Where the node is authored
        origin_dimension_space_point: OriginDimensionSpacePoint,
        /// The parent aggregate
        parent_node_aggregate_id: NodeAggregateId,
        /// The sibling to insert before, or `None` to append
        succeeding_sibling_node_aggregate_id: Option<NodeAggregateId>,
        /// Optional name, unique among the parent's children
        node_name: Option<NodeName>,
        /// Properties on top of the type's defaults
        initial_property_values: SerializedPropertyValues,
        /// Ids for tethered descendants keyed by their name path (`main/inner`); missing ones are generated
        tethered_descendant_node_aggregate_ids: BTreeMap<String, NodeAggregateId>,
    },

    /// Rename a node aggregate
    ChangeNodeAggregateName {
        /// The target stream
        content_stream_id: ContentStreamId,
        /// The aggregate to rename
        node_aggregate_id: NodeAggregateId,
        /// The new name
        new_node_name: NodeName,
    },

    /// Set or unset properties of one node
    SetNodeProperties {
        /// The target stream
        content_stream_id: ContentStreamId,
        /// The aggregate
        node_aggregate_id: NodeAggregateId,
        /// The origin of the node to modify
        origin_dimension_space_point: OriginDimensionSpacePoint,
        /// Values to set
        property_values: SerializedPropertyValues,
        /// Names to unset
        properties_to_unset: Vec<String>,
    },

    /// Replace the references of one name of one node
    SetNodeReferences {
        /// The target stream
        content_stream_id: ContentStreamId,
        /// The referencing aggregate
        source_node_aggregate_id: NodeAggregateId,
        /// The origin of the referencing node
        source_origin_dimension_space_point: OriginDimensionSpacePoint,
        /// The reference name
        reference_name: ReferenceName,
        /// The new references, in order
        references: Vec<NodeReferenceToWrite>,
    },

    /// Hide a node aggregate and its descendants
    DisableNodeAggregate {
        /// The target stream
        content_stream_id: ContentStreamId,
        /// The aggregate
        node_aggregate_id: NodeAggregateId,
        /// The point the command is issued in
        covered_dimension_space_point: DimensionSpacePoint,
        /// Fan out to other points
        strategy: RelationDistributionStrategy,
    },

    /// Show a disabled node aggregate again
    EnableNodeAggregate {
        /// The target stream
        content_stream_id: ContentStreamId,
        /// The aggregate
        node_aggregate_id: NodeAggregateId,
        /// The point the command is issued in
        covered_dimension_space_point: DimensionSpacePoint,
        /// Fan out to other points
        strategy: RelationDistributionStrategy,
    },

    /// Remove a node aggregate with its descendants
    RemoveNodeAggregate {
        /// The target stream
        content_stream_id: ContentStreamId,
        /// The aggregate
        node_aggregate_id: NodeAggregateId,
        /// The point the command is issued in
        covered_dimension_space_point: DimensionSpacePoint,
        /// Fan out to other points
        strategy: RelationDistributionStrategy,
    },

    /// Create a variant of a node at another origin
    CreateNodeVariant {
        /// The target stream
        content_stream_id: ContentStreamId,
        /// The aggregate
        node_aggregate_id: NodeAggregateId,
        /// Origin of the node to vary
        source_origin: OriginDimensionSpacePoint,
        /// Origin of the new variant
        target_origin: OriginDimensionSpacePoint,
    },

    /// Move a node aggregate to a new parent and/or sibling position
    MoveNodeAggregate {
        /// The target stream
        content_stream_id: ContentStreamId,
        /// The aggregate to move
        node_aggregate_id: NodeAggregateId,
        /// The point the command is issued in
        dimension_space_point: DimensionSpacePoint,
        /// The new parent, or `None` to stay below the current one
        new_parent_node_aggregate_id: Option<NodeAggregateId>,
        /// The sibling to move before, or `None` to append
        new_succeeding_sibling_node_aggregate_id: Option<NodeAggregateId>,
        /// Fan out to other points
        strategy: RelationDistributionStrategy,
    },

    /// Change the node type of an aggregate
    ChangeNodeAggregateType {
        /// The target stream
        content_stream_id: ContentStreamId,
        /// The aggregate
        node_aggregate_id: NodeAggregateId,
        /// The new node type
        new_node_type_name: NodeTypeName,
    },

    /// Make everything visible in `source` also visible in its specialization `target`
    AddDimensionShineThrough {
        /// The target stream
        content_stream_id: ContentStreamId,
        /// The generalization to shine through
        source: DimensionSpacePoint,
        /// The newly configured specialization
        target: DimensionSpacePoint,
    },

    /// Rename a dimension space point in one stream
    MoveDimensionSpacePoint {
        /// The target stream
        content_stream_id: ContentStreamId,
        /// The point that no longer exists
        source: DimensionSpacePoint,
        /// Its replacement
        target: DimensionSpacePoint,
    },
}

impl ContentGraphCommand {
    /// The content stream the command targets
    pub fn content_stream_id(&self) -> &ContentStreamId {
        match self {
            Self::CreateContentStream { content_stream_id }
            | Self::RemoveContentStream { content_stream_id }
            | Self::CreateRootNodeAggregateWithNode { content_stream_id, .. }
            | Self::CreateNodeAggregateWithNode { content_stream_id, .. }
            | Self::ChangeNodeAggregateName { content_stream_id, .. }
            | Self::SetNodeProperties { content_stream_id, .. }
            | Self::SetNodeReferences { content_stream_id, .. }
            | Self::DisableNodeAggregate { content_stream_id, .. }
            | Self::EnableNodeAggregate { content_stream_id, .. }
            | Self::RemoveNodeAggregate { content_stream_id, .. }
            | Self::CreateNodeVariant { content_stream_id, .. }
            | Self::MoveNodeAggregate { content_stream_id, .. }
            | Self::ChangeNodeAggregateType { content_stream_id, .. }
            | Self::AddDimensionShineThrough { content_stream_id, .. }
            | Self::MoveDimensionSpacePoint { content_stream_id, .. } => content_stream_id,
            Self::ForkContentStream {
                new_content_stream_id,
                ..
            } => new_content_stream_id,
        }
    }
}
