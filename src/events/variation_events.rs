//! Node variation events

use super::InterdimensionalSiblings;
use crate::dimension::OriginDimensionSpacePoint;
use crate::value_objects::{ContentStreamId, NodeAggregateId};
use serde::{Deserialize, Serialize};

/// A node was varied into a more specific origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpecializationVariantWasCreated {
    /// The target stream
    pub content_stream_id: ContentStreamId,
    /// The varied aggregate
    pub node_aggregate_id: NodeAggregateId,
    /// Origin of the source node
    pub source_origin: OriginDimensionSpacePoint,
    /// Origin of the new node
    pub specialization_origin: OriginDimensionSpacePoint,
    /// Sibling choice per point the specialization covers
    pub specialization_siblings: InterdimensionalSiblings,
}

/// A node was varied into a more general origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeGeneralizationVariantWasCreated {
    /// The target stream
    pub content_stream_id: ContentStreamId,
    /// The varied aggregate
    pub node_aggregate_id: NodeAggregateId,
    /// Origin of the source node
    pub source_origin: OriginDimensionSpacePoint,
    /// Origin of the new node
    pub generalization_origin: OriginDimensionSpacePoint,
    /// Sibling choice per point the generalization covers
    pub variant_succeeding_siblings: InterdimensionalSiblings,
}

/// A node was varied into an unrelated origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodePeerVariantWasCreated {
    /// The target stream
    pub content_stream_id: ContentStreamId,
    /// The varied aggregate
    pub node_aggregate_id: NodeAggregateId,
    /// Origin of the source node
    pub source_origin: OriginDimensionSpacePoint,
    /// Origin of the new node
    pub peer_origin: OriginDimensionSpacePoint,
    /// Sibling choice per point the peer covers
    pub peer_succeeding_siblings: InterdimensionalSiblings,
}
