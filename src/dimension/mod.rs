//! Dimension space model
//!
//! Immutable coordinate points, point sets and the variation oracle that classifies
//! two points as specialization, generalization or peer of each other.

mod config;
mod point;
mod point_set;
mod variation;

pub use config::{ContentDimension, ContentDimensionConfig, ContentDimensionValue};
pub use point::{DimensionSpacePoint, OriginDimensionSpacePoint};
pub use point_set::{DimensionSpacePointSet, OriginDimensionSpacePointSet};
pub use variation::{InterDimensionalVariationGraph, VariantType, VariationOracle};

use thiserror::Error;

/// Errors of the dimension space model
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DimensionSpaceError {
    /// The point could not be parsed
    #[error("invalid dimension space point: {0}")]
    InvalidPoint(String),

    /// The dimension configuration could not be parsed
    #[error("invalid content dimension configuration: {0}")]
    InvalidConfiguration(String),

    /// A configured dimension has no values
    #[error("content dimension {0} has no values")]
    EmptyDimension(String),

    /// A value occurs twice in one dimension
    #[error("value {value} occurs more than once in content dimension {dimension}")]
    DuplicateDimensionValue {
        /// The dimension
        dimension: String,
        /// The duplicated value
        value: String,
    },

    /// The point is not within the allowed dimension subspace
    #[error("dimension space point {0} is not within the allowed dimension subspace")]
    PointNotFound(String),
}
