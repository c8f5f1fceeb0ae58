//! Node type schema
//!
//! Type existence, abstractness, child and grandchild constraints, tethered children
//! and property defaults, as consumed by the constraint checks.

mod definitions;
mod schema;

pub use definitions::{
    NodeTypeDefinition, NodeTypeDefinitionError, NodeTypeDefinitions, PropertyDefinition,
    TetheredChildNodeDefinition,
};
pub use schema::{InMemoryNodeTypeSchema, NodeTypeSchema};
