//! Dimension space adjustment events

use crate::dimension::DimensionSpacePoint;
use crate::value_objects::ContentStreamId;
use serde::{Deserialize, Serialize};

/// All content of a point was moved to another point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionSpacePointWasMoved {
    /// The stream being adjusted
    pub content_stream_id: ContentStreamId,
    /// The point content is moved away from
    pub source: DimensionSpacePoint,
    /// The point content is moved to
    pub target: DimensionSpacePoint,
}

/// A new point now shines through all content of an existing point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionShineThroughWasAdded {
    /// The stream being adjusted
    pub content_stream_id: ContentStreamId,
    /// The point whose edges are duplicated
    pub source: DimensionSpacePoint,
    /// The new point
    pub target: DimensionSpacePoint,
}
