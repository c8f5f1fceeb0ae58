//! Serializable node type declarations

use crate::value_objects::{NodeName, NodeTypeName, ReferenceName};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors of the node type declarations
#[derive(Debug, Error)]
pub enum NodeTypeDefinitionError {
    /// The JSON could not be parsed
    #[error("node type definitions could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
    /// A declaration names a type that is not declared
    #[error("node type {node_type} refers to undeclared node type {referenced}")]
    UndeclaredNodeType {
        /// The declaring type
        node_type: NodeTypeName,
        /// The missing type
        referenced: NodeTypeName,
    },
    /// A tethered child is declared with an abstract type
    #[error("tethered child {node_name} of {node_type} must not be abstract")]
    AbstractTetheredChild {
        /// The declaring type
        node_type: NodeTypeName,
        /// The tethered child name
        node_name: NodeName,
    },
}

/// A property declaration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    /// Value set on creation when none is given
    #[serde(default)]
    pub default_value: Option<serde_json::Value>,
}

/// A tethered child declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TetheredChildNodeDefinition {
    /// The fixed type of the tethered child
    pub node_type: NodeTypeName,
    /// Types allowed below the tethered child; `None` defers to the child's own type
    #[serde(default)]
    pub allowed_child_node_types: Option<Vec<NodeTypeName>>,
}

/// One node type declaration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeTypeDefinition {
    /// Abstract types cannot be instantiated
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    /// Root types can only be instantiated as roots
    #[serde(default, rename = "root")]
    pub is_root: bool,
    /// Types allowed as regular children; `None` allows every type
    #[serde(default)]
    pub allowed_child_node_types: Option<Vec<NodeTypeName>>,
    /// Tethered children created together with a node of this type
    #[serde(default)]
    pub tethered_child_nodes: IndexMap<NodeName, TetheredChildNodeDefinition>,
    /// Declared properties
    #[serde(default)]
    pub properties: IndexMap<String, PropertyDefinition>,
    /// Declared reference names
    #[serde(default)]
    pub references: Vec<ReferenceName>,
}

/// All node type declarations by name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeTypeDefinitions(IndexMap<NodeTypeName, NodeTypeDefinition>);

impl NodeTypeDefinitions {
    /// No node types
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder style declaration
    pub fn with(mut self, name: impl Into<NodeTypeName>, definition: NodeTypeDefinition) -> Self {
        self.0.insert(name.into(), definition);
        self
    }

    /// Parse and validate a JSON document mapping type names to declarations
    pub fn from_json(json: &str) -> Result<Self, NodeTypeDefinitionError> {
        let definitions: Self = serde_json::from_str(json)?;
        definitions.validate()?;
        Ok(definitions)
    }

    /// Check that every referenced type is declared and tethered children are concrete
    pub fn validate(&self) -> Result<(), NodeTypeDefinitionError> {
        for (name, definition) in &self.0 {
            let mut referenced: Vec<&NodeTypeName> = Vec::new();
            referenced.extend(definition.allowed_child_node_types.iter().flatten());
            for tethered in definition.tethered_child_nodes.values() {
                referenced.push(&tethered.node_type);
                referenced.extend(tethered.allowed_child_node_types.iter().flatten());
            }
            if let Some(missing) = referenced.into_iter().find(|r| !self.0.contains_key(*r)) {
                return Err(NodeTypeDefinitionError::UndeclaredNodeType {
                    node_type: name.clone(),
                    referenced: missing.clone(),
                });
            }
            for (child_name, tethered) in &definition.tethered_child_nodes {
                if self.0.get(&tethered.node_type).map_or(false, |d| d.is_abstract) {
                    return Err(NodeTypeDefinitionError::AbstractTetheredChild {
                        node_type: name.clone(),
                        node_name: child_name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// A declaration by name
    pub fn get(&self, name: &NodeTypeName) -> Option<&NodeTypeDefinition> {
        self.0.get(name)
    }

    /// All declarations
    pub fn iter(&self) -> impl Iterator<Item = (&NodeTypeName, &NodeTypeDefinition)> {
        self.0.iter()
    }
}
