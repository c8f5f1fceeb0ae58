//! The node type schema capability

use super::definitions::NodeTypeDefinitions;
use crate::value_objects::{NodeName, NodeTypeName, ReferenceName, SerializedPropertyValues};

/// Node type information the command side validates against
pub trait NodeTypeSchema: Send + Sync {
    /// Whether the type is declared
    fn has_node_type(&self, node_type_name: &NodeTypeName) -> bool;

    /// Whether the type is abstract
    fn is_abstract(&self, node_type_name: &NodeTypeName) -> bool;

    /// Whether the type is a root type
    fn is_root(&self, node_type_name: &NodeTypeName) -> bool;

    /// Whether `child` may be created as a regular child of `parent`
    fn allows_child_node_type(&self, parent: &NodeTypeName, child: &NodeTypeName) -> bool;

    /// Whether `grandchild` may be created below the tethered child `tethered_name` of
    /// a `grandparent`
    fn allows_grandchild_node_type(
        &self,
        grandparent: &NodeTypeName,
        tethered_name: &NodeName,
        grandchild: &NodeTypeName,
    ) -> bool;

    /// Tethered children declared by the type, in declaration order
    fn tethered_child_nodes(&self, node_type_name: &NodeTypeName) -> Vec<(NodeName, NodeTypeName)>;

    /// Default values of the type's properties
    fn default_property_values(&self, node_type_name: &NodeTypeName) -> SerializedPropertyValues;

    /// Whether the type declares the property
    fn has_property(&self, node_type_name: &NodeTypeName, property_name: &str) -> bool;

    /// Whether the type declares the reference
    fn has_reference(&self, node_type_name: &NodeTypeName, reference_name: &ReferenceName) -> bool;

    /// The declared type of a tethered child
    fn tethered_child_node_type(
        &self,
        node_type_name: &NodeTypeName,
        tethered_name: &NodeName,
    ) -> Option<NodeTypeName> {
        self.tethered_child_nodes(node_type_name)
            .into_iter()
            .find(|(name, _)| name == tethered_name)
            .map(|(_, node_type)| node_type)
    }
}

/// Schema backed by in-memory declarations
#[derive(Debug, Clone, Default)]
pub struct InMemoryNodeTypeSchema {
    definitions: NodeTypeDefinitions,
}

impl InMemoryNodeTypeSchema {
    /// Create a schema from validated declarations
    pub fn new(definitions: NodeTypeDefinitions) -> Self {
        Self { definitions }
    }

    /// The underlying declarations
    pub fn definitions(&self) -> &NodeTypeDefinitions {
        &self.definitions
    }
}

impl NodeTypeSchema for InMemoryNodeTypeSchema {
    fn has_node_type(&self, node_type_name: &NodeTypeName) -> bool {
        self.definitions.get(node_type_name).is_some()
    }

    fn is_abstract(&self, node_type_name: &NodeTypeName) -> bool {
        self.definitions
            .get(node_type_name)
            .map_or(false, |d| d.is_abstract)
    }

    fn is_root(&self, node_type_name: &NodeTypeName) -> bool {
        self.definitions
            .get(node_type_name)
            .map_or(false, |d| d.is_root)
    }

    fn allows_child_node_type(&self, parent: &NodeTypeName, child: &NodeTypeName) -> bool {
        match self.definitions.get(parent) {
            Some(definition) => definition
                .allowed_child_node_types
                .as_ref()
                .map_or(true, |allowed| allowed.contains(child)),
            None => false,
        }
    }

    fn allows_grandchild_node_type(
        &self,
        grandparent: &NodeTypeName,
        tethered_name: &NodeName,
        grandchild: &NodeTypeName,
    ) -> bool {
        let Some(tethered) = self
            .definitions
            .get(grandparent)
            .and_then(|d| d.tethered_child_nodes.get(tethered_name))
        else {
            return true;
        };
        match &tethered.allowed_child_node_types {
            Some(allowed) => allowed.contains(grandchild),
            None => self.allows_child_node_type(&tethered.node_type, grandchild),
        }
    }

    fn tethered_child_nodes(&self, node_type_name: &NodeTypeName) -> Vec<(NodeName, NodeTypeName)> {
        self.definitions
            .get(node_type_name)
            .map(|d| {
                d.tethered_child_nodes
                    .iter()
                    .map(|(name, tethered)| (name.clone(), tethered.node_type.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn default_property_values(&self, node_type_name: &NodeTypeName) -> SerializedPropertyValues {
        self.definitions
            .get(node_type_name)
            .map(|d| {
                d.properties
                    .iter()
                    .filter_map(|(name, property)| {
                        property
                            .default_value
                            .clone()
                            .map(|value| (name.clone(), value))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn has_property(&self, node_type_name: &NodeTypeName, property_name: &str) -> bool {
        self.definitions
            .get(node_type_name)
            .map_or(false, |d| d.properties.contains_key(property_name))
    }

    fn has_reference(&self, node_type_name: &NodeTypeName, reference_name: &ReferenceName) -> bool {
        self.definitions
            .get(node_type_name)
            .map_or(false, |d| d.references.contains(reference_name))
    }
}
