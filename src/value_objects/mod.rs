//! Content graph value objects
//!
//! Value objects are immutable types that represent concepts in the content graph domain.
//! They are compared by value rather than identity and encapsulate domain validation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

macro_rules! string_value_object {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing string value
            pub fn from_string(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Get the string representation
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_value_object!(
    /// Identifies one independently forkable timeline of graph changes
    ContentStreamId
);

string_value_object!(
    /// Logical identity of "the same" node across all dimension variants and streams
    NodeAggregateId
);

string_value_object!(
    /// Name of a node type as declared in the node type schema
    NodeTypeName
);

string_value_object!(
    /// Name of a node, stored on the hierarchy edge leading to it
    NodeName
);

string_value_object!(
    /// Name of a reference property
    ReferenceName
);

impl ContentStreamId {
    /// Generate a fresh content stream id
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for ContentStreamId {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeAggregateId {
    /// Generate a fresh node aggregate id
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for NodeAggregateId {
    fn default() -> Self {
        Self::new()
    }
}

/// Opaque surrogate identity of one physical node row.
///
/// Anchors are allocated by the store from a monotonically increasing counter so that
/// a full replay allocates exactly the same anchors as incremental application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeRelationAnchorPoint(u64);

impl NodeRelationAnchorPoint {
    /// The sentinel parent of every root hierarchy edge
    pub const ROOT_EDGE: Self = Self(0);

    /// Create an anchor from its raw value
    pub fn from_u64(value: u64) -> Self {
        Self(value)
    }

    /// Raw value
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Whether this is the root edge sentinel
    pub fn is_root_edge(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for NodeRelationAnchorPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Classification of a node aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeAggregateClassification {
    /// Root of a content graph, exists only at the empty dimension space point
    Root,
    /// A regular node
    Regular,
    /// A node whose lifecycle and type are fully determined by its parent
    Tethered,
}

impl NodeAggregateClassification {
    /// Whether this is a root classification
    pub fn is_root(&self) -> bool {
        matches!(self, Self::Root)
    }

    /// Whether this is a tethered classification
    pub fn is_tethered(&self) -> bool {
        matches!(self, Self::Tethered)
    }
}

impl fmt::Display for NodeAggregateClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Self::Root => "root",
            Self::Regular => "regular",
            Self::Tethered => "tethered",
        };
        f.write_str(value)
    }
}

/// Serialized property bag of a node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SerializedPropertyValues(BTreeMap<String, serde_json::Value>);

impl SerializedPropertyValues {
    /// Create an empty property bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder style insert
    pub fn with(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.0.insert(name.into(), value);
        self
    }

    /// Get a property value
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.0.get(name)
    }

    /// Whether a property is set
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Merge other values over these, returning the result
    pub fn merge(&self, other: &SerializedPropertyValues) -> Self {
        let mut merged = self.0.clone();
        for (name, value) in &other.0 {
            merged.insert(name.clone(), value.clone());
        }
        Self(merged)
    }

    /// Remove the given property names, returning the result
    pub fn unset<'a>(&self, names: impl IntoIterator<Item = &'a String>) -> Self {
        let mut remaining = self.0.clone();
        for name in names {
            remaining.remove(name);
        }
        Self(remaining)
    }

    /// Property names in order
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Iterate over name/value pairs
    pub fn iter(&self) -> impl Iterator<Item = (&String, &serde_json::Value)> {
        self.0.iter()
    }

    /// Number of properties
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the bag is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, serde_json::Value)> for SerializedPropertyValues {
    fn from_iter<T: IntoIterator<Item = (String, serde_json::Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One reference to be written by a reference mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeReferenceToWrite {
    /// The referenced aggregate
    pub target_node_aggregate_id: NodeAggregateId,
    /// Optional properties carried on the reference
    pub properties: Option<SerializedPropertyValues>,
}

impl NodeReferenceToWrite {
    /// Reference without properties
    pub fn to(target: NodeAggregateId) -> Self {
        Self {
            target_node_aggregate_id: target,
            properties: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_property_merge_and_unset() {
        let base = SerializedPropertyValues::new()
            .with("title", json!("Hello"))
            .with("text", json!("World"));
        let update = SerializedPropertyValues::new().with("title", json!("Hi"));

        let merged = base.merge(&update);
        assert_eq!(merged.get("title"), Some(&json!("Hi")));
        assert_eq!(merged.get("text"), Some(&json!("World")));

        let unset = merged.unset(&["text".to_string()]);
        assert!(!unset.contains("text"));
        assert_eq!(unset.len(), 1);
    }

    #[test]
    fn test_root_edge_sentinel() {
        assert!(NodeRelationAnchorPoint::ROOT_EDGE.is_root_edge());
        assert!(!NodeRelationAnchorPoint::from_u64(1).is_root_edge());
    }

    #[test]
    fn test_classification_serialization() {
        let serialized = serde_json::to_string(&NodeAggregateClassification::Tethered).unwrap();
        assert_eq!(serialized, "\"tethered\"");
    }

    #[test]
    fn test_identifiers_are_transparent() {
        let id = NodeAggregateId::from("sir-david-nodenborough");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"sir-david-nodenborough\"");
        assert_ne!(ContentStreamId::new(), ContentStreamId::new());
    }
}
