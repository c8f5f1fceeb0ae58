//! Command errors
//!
//! Every variant is one specific, named rejection raised before any event is produced.

use crate::dimension::{DimensionSpaceError, DimensionSpacePoint, OriginDimensionSpacePoint};
use crate::value_objects::{
    ContentStreamId, NodeAggregateId, NodeName, NodeTypeName, ReferenceName,
};
use thiserror::Error;

/// Coarse classification of command errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Something the command refers to does not exist
    NotFound,
    /// The command clashes with the current state
    Conflict,
    /// The command breaks a structural or typing rule
    ConstraintViolation,
    /// The command itself is malformed
    InvalidInput,
}

/// Errors raised by constraint checks and command validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    // not found
    #[error("content stream {0} does not exist yet")]
    ContentStreamDoesNotExistYet(ContentStreamId),
    #[error("node aggregate {0} does currently not exist")]
    NodeAggregateCurrentlyDoesNotExist(NodeAggregateId),
    #[error("node type {0} not found")]
    NodeTypeNotFound(NodeTypeName),
    #[error("node aggregate {node_aggregate_id} does currently not cover {dimension_space_point}")]
    NodeAggregateDoesCurrentlyNotCoverDimensionSpacePoint {
        node_aggregate_id: NodeAggregateId,
        dimension_space_point: DimensionSpacePoint,
    },

    // conflict
    #[error("content stream {0} already exists")]
    ContentStreamAlreadyExists(ContentStreamId),
    #[error("node aggregate {0} does currently exist")]
    NodeAggregateCurrentlyExists(NodeAggregateId),
    #[error("root node aggregate of type {0} already exists")]
    RootNodeAggregateTypeIsAlreadyOccupied(NodeTypeName),
    #[error("node aggregate {node_aggregate_id} already occupies {origin}")]
    DimensionSpacePointIsAlreadyOccupied {
        node_aggregate_id: NodeAggregateId,
        origin: OriginDimensionSpacePoint,
    },
    #[error("node aggregate {node_aggregate_id} does not yet occupy {origin}")]
    DimensionSpacePointIsNotYetOccupied {
        node_aggregate_id: NodeAggregateId,
        origin: OriginDimensionSpacePoint,
    },
    #[error("node aggregate {node_aggregate_id} already disables {dimension_space_point}")]
    NodeAggregateCurrentlyDisablesDimensionSpacePoint {
        node_aggregate_id: NodeAggregateId,
        dimension_space_point: DimensionSpacePoint,
    },
    #[error("node aggregate {node_aggregate_id} does currently not disable {dimension_space_point}")]
    NodeAggregateDoesCurrentlyNotDisableDimensionSpacePoint {
        node_aggregate_id: NodeAggregateId,
        dimension_space_point: DimensionSpacePoint,
    },
    #[error("dimension space point {0} is already in use")]
    DimensionSpacePointIsAlreadyInUse(DimensionSpacePoint),
    #[error("node name {node_name} is already occupied below {parent_node_aggregate_id}")]
    NodeNameIsAlreadyOccupied {
        node_name: NodeName,
        parent_node_aggregate_id: NodeAggregateId,
    },
    #[error("node name {node_name} is already covered below {parent_node_aggregate_id}")]
    NodeNameIsAlreadyCovered {
        node_name: NodeName,
        parent_node_aggregate_id: NodeAggregateId,
    },

    // constraint violation
    #[error("node type {0} is abstract")]
    NodeTypeIsAbstract(NodeTypeName),
    #[error("node type {0} is of type root")]
    NodeTypeIsOfTypeRoot(NodeTypeName),
    #[error("node type {0} is not of type root")]
    NodeTypeIsNotOfTypeRoot(NodeTypeName),
    #[error("node type {child} is not allowed below {parent}")]
    NodeConstraintViolation {
        parent: NodeTypeName,
        child: NodeTypeName,
    },
    #[error("node type {grandchild} is not allowed below tethered child {tethered_name} of {grandparent}")]
    GrandchildConstraintViolation {
        grandparent: NodeTypeName,
        tethered_name: NodeName,
        grandchild: NodeTypeName,
    },
    #[error("node aggregate {0} is root")]
    NodeAggregateIsRoot(NodeAggregateId),
    #[error("node aggregate {0} is tethered")]
    NodeAggregateIsTethered(NodeAggregateId),
    #[error("node aggregate {node_aggregate_id} is a descendant of {ancestor}")]
    NodeAggregateIsDescendant {
        node_aggregate_id: NodeAggregateId,
        ancestor: NodeAggregateId,
    },
    #[error("property {property_name} is not declared by node type {node_type_name}")]
    PropertyCannotBeSet {
        property_name: String,
        node_type_name: NodeTypeName,
    },
    #[error("reference {reference_name} is not declared by node type {node_type_name}")]
    ReferenceCannotBeSet {
        reference_name: ReferenceName,
        node_type_name: NodeTypeName,
    },

    // invalid input
    #[error("dimension space point {0} is not in the allowed dimension subspace")]
    DimensionSpacePointNotFound(DimensionSpacePoint),
    #[error("{point} is no specialization of {generalization}")]
    DimensionSpacePointIsNoSpecialization {
        point: DimensionSpacePoint,
        generalization: DimensionSpacePoint,
    },
    #[error("source and target origin {0} of a variant are identical")]
    DimensionSpacePointsAreIdentical(OriginDimensionSpacePoint),
    #[error(transparent)]
    DimensionSpace(#[from] DimensionSpaceError),
}

impl CommandError {
    /// Taxonomy class of the error
    pub fn category(&self) -> ErrorCategory {
        use CommandError::*;
        match self {
            ContentStreamDoesNotExistYet(_)
            | NodeAggregateCurrentlyDoesNotExist(_)
            | NodeTypeNotFound(_)
            | NodeAggregateDoesCurrentlyNotCoverDimensionSpacePoint { .. } => {
                ErrorCategory::NotFound
            }
            ContentStreamAlreadyExists(_)
            | NodeAggregateCurrentlyExists(_)
            | RootNodeAggregateTypeIsAlreadyOccupied(_)
            | DimensionSpacePointIsAlreadyOccupied { .. }
            | DimensionSpacePointIsNotYetOccupied { .. }
            | NodeAggregateCurrentlyDisablesDimensionSpacePoint { .. }
            | NodeAggregateDoesCurrentlyNotDisableDimensionSpacePoint { .. }
            | DimensionSpacePointIsAlreadyInUse(_)
            | NodeNameIsAlreadyOccupied { .. }
            | NodeNameIsAlreadyCovered { .. } => ErrorCategory::Conflict,
            NodeTypeIsAbstract(_)
            | NodeTypeIsOfTypeRoot(_)
            | NodeTypeIsNotOfTypeRoot(_)
            | NodeConstraintViolation { .. }
            | GrandchildConstraintViolation { .. }
            | NodeAggregateIsRoot(_)
            | NodeAggregateIsTethered(_)
            | NodeAggregateIsDescendant { .. }
            | PropertyCannotBeSet { .. }
            | ReferenceCannotBeSet { .. } => ErrorCategory::ConstraintViolation,
            DimensionSpacePointNotFound(_)
            | DimensionSpacePointIsNoSpecialization { .. }
            | DimensionSpacePointsAreIdentical(_)
            | DimensionSpace(_) => ErrorCategory::InvalidInput,
        }
    }
}

/// Result type of command handling
pub type CommandResult<T> = Result<T, CommandError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(
            CommandError::ContentStreamDoesNotExistYet(ContentStreamId::from("cs")).category(),
            ErrorCategory::NotFound
        );
        assert_eq!(
            CommandError::NodeNameIsAlreadyCovered {
                node_name: NodeName::from("main"),
                parent_node_aggregate_id: NodeAggregateId::from("nody"),
            }
            .category(),
            ErrorCategory::Conflict
        );
        assert_eq!(
            CommandError::NodeTypeIsAbstract(NodeTypeName::from("Acme:Content")).category(),
            ErrorCategory::ConstraintViolation
        );
        assert_eq!(
            CommandError::DimensionSpacePointNotFound(DimensionSpacePoint::empty()).category(),
            ErrorCategory::InvalidInput
        );
    }
}
