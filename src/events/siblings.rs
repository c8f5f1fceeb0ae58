//! Interdimensional siblings
//!
//! One succeeding sibling choice per covered dimension space point. The set of points
//! also defines the coverage of the operation carrying it.

use crate::dimension::{DimensionSpacePoint, DimensionSpacePointSet};
use crate::value_objects::NodeAggregateId;
use serde::{Deserialize, Serialize};

/// Succeeding sibling choice for one dimension space point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterdimensionalSibling {
    /// The covered point
    pub dimension_space_point: DimensionSpacePoint,
    /// The sibling to insert before, or `None` to append
    pub node_aggregate_id: Option<NodeAggregateId>,
}

impl InterdimensionalSibling {
    /// Create a sibling choice
    pub fn new(
        dimension_space_point: DimensionSpacePoint,
        node_aggregate_id: Option<NodeAggregateId>,
    ) -> Self {
        Self {
            dimension_space_point,
            node_aggregate_id,
        }
    }
}

/// Ordered list of sibling choices, at most one per point
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InterdimensionalSiblings(Vec<InterdimensionalSibling>);

impl InterdimensionalSiblings {
    /// Create from sibling choices; later choices for the same point are dropped
    pub fn new(siblings: impl IntoIterator<Item = InterdimensionalSibling>) -> Self {
        let mut unique: Vec<InterdimensionalSibling> = Vec::new();
        for sibling in siblings {
            if !unique
                .iter()
                .any(|s| s.dimension_space_point == sibling.dimension_space_point)
            {
                unique.push(sibling);
            }
        }
        Self(unique)
    }

    /// Append to every point of the set
    pub fn append_to(points: &DimensionSpacePointSet) -> Self {
        Self::new(
            points
                .iter()
                .map(|p| InterdimensionalSibling::new(p.clone(), None)),
        )
    }

    /// The covered points
    pub fn to_dimension_space_point_set(&self) -> DimensionSpacePointSet {
        self.0
            .iter()
            .map(|s| s.dimension_space_point.clone())
            .collect()
    }

    /// The succeeding sibling chosen for a point
    pub fn succeeding_sibling_for(&self, point: &DimensionSpacePoint) -> Option<&NodeAggregateId> {
        self.0
            .iter()
            .find(|s| &s.dimension_space_point == point)
            .and_then(|s| s.node_aggregate_id.as_ref())
    }

    /// Iterate over the choices
    pub fn iter(&self) -> impl Iterator<Item = &InterdimensionalSibling> {
        self.0.iter()
    }

    /// Number of choices
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no choices
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<InterdimensionalSibling> for InterdimensionalSiblings {
    fn from_iter<T: IntoIterator<Item = InterdimensionalSibling>>(iter: T) -> Self {
        Self::new(iter)
    }
}
