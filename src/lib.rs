//! Content graph domain for the Composable Information Machine
//!
//! A versioned, multi-dimensional content graph. Commands are validated against the
//! read model and turned into events; the projection applies those events, in log
//! order, to relational tables of node records and hierarchy, restriction and
//! reference edges. Content streams fork cheaply and copy node records on write;
//! dimension variants share edges with their fallbacks until they are specialized.

pub mod aggregate;
pub mod commands;
pub mod dimension;
pub mod domain_events;
pub mod events;
pub mod handlers;
pub mod infrastructure;
pub mod node_types;
pub mod projections;
pub mod queries;
pub mod value_objects;

// Re-export main types
pub use aggregate::NodeAggregate;
pub use domain_events::ContentGraphEvent;
pub use events::*;

// Re-export commands and their types
pub use commands::{
    CommandError, CommandResult, ContentGraphCommand, ErrorCategory, RelationDistributionStrategy,
};

// Re-export the dimension space model
pub use dimension::{
    ContentDimensionConfig, DimensionSpaceError, DimensionSpacePoint, DimensionSpacePointSet,
    InterDimensionalVariationGraph, OriginDimensionSpacePoint, OriginDimensionSpacePointSet,
    VariantType, VariationOracle,
};

// Re-export command handlers
pub use handlers::{
    ConstraintChecker, ContentGraphCommandHandler, NodeAggregateCommandHandler, VariationResolver,
};

// Re-export infrastructure
pub use infrastructure::{ContentGraphStore, EventLog, EventLogError, InMemoryEventLog};

// Re-export node types
pub use node_types::{InMemoryNodeTypeSchema, NodeTypeDefinitions, NodeTypeSchema};

// Re-export projections
pub use projections::{
    ApplyOutcome, ContentGraphProjection, ProjectionConfig, ProjectionError, ProjectionResult,
    ProjectionStatus,
};

// Re-export query types
pub use queries::{ContentGraph, ContentSubgraph, Node, Reference, VisibilityConstraints};

// Re-export value objects
pub use value_objects::{
    ContentStreamId, NodeAggregateClassification, NodeAggregateId, NodeName,
    NodeReferenceToWrite, NodeRelationAnchorPoint, NodeTypeName, ReferenceName,
    SerializedPropertyValues,
};
