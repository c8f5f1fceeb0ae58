//! Content dimension configuration

use super::DimensionSpaceError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Configured content dimensions, ordered by priority
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentDimensionConfig {
    /// Dimensions by name
    #[serde(default)]
    pub dimensions: IndexMap<String, ContentDimension>,
}

/// One content dimension with its value tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentDimension {
    /// Top level values of the dimension
    #[serde(default)]
    pub values: IndexMap<String, ContentDimensionValue>,
}

/// A dimension value and the values that specialize it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentDimensionValue {
    /// Specializations of this value
    #[serde(default)]
    pub specializations: IndexMap<String, ContentDimensionValue>,
}

impl ContentDimensionConfig {
    /// Configuration without any dimension
    pub fn none() -> Self {
        Self::default()
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, DimensionSpaceError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| DimensionSpaceError::InvalidConfiguration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Builder for a dimension with flat (unspecialized) values
    pub fn with_flat_dimension<'a>(
        mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let values = values
            .into_iter()
            .map(|v| (v.to_string(), ContentDimensionValue::default()))
            .collect();
        self.dimensions
            .insert(name.into(), ContentDimension { values });
        self
    }

    /// Every dimension needs at least one value and values are unique per dimension
    pub fn validate(&self) -> Result<(), DimensionSpaceError> {
        for (name, dimension) in &self.dimensions {
            if dimension.values.is_empty() {
                return Err(DimensionSpaceError::EmptyDimension(name.clone()));
            }
            let mut seen = Vec::new();
            let mut stack: Vec<(&String, &ContentDimensionValue)> =
                dimension.values.iter().collect();
            while let Some((value, node)) = stack.pop() {
                if seen.contains(&value) {
                    return Err(DimensionSpaceError::DuplicateDimensionValue {
                        dimension: name.clone(),
                        value: value.clone(),
                    });
                }
                seen.push(value);
                stack.extend(node.specializations.iter());
            }
        }
        Ok(())
    }
}

impl ContentDimensionValue {
    /// Leaf value
    pub fn leaf() -> Self {
        Self::default()
    }

    /// Value with the given specializations
    pub fn with_specializations(
        specializations: impl IntoIterator<Item = (String, ContentDimensionValue)>,
    ) -> Self {
        Self {
            specializations: specializations.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_configuration() {
        let config = ContentDimensionConfig::from_json(
            r#"{
                "dimensions": {
                    "language": {
                        "values": {
                            "en": { "specializations": { "en_US": {} } },
                            "de": {}
                        }
                    }
                }
            }"#,
        )
        .unwrap();

        let language = &config.dimensions["language"];
        assert_eq!(language.values.len(), 2);
        assert!(language.values["en"].specializations.contains_key("en_US"));
    }

    #[test]
    fn test_empty_dimension_is_rejected() {
        let result = ContentDimensionConfig::from_json(r#"{"dimensions": {"language": {}}}"#);
        assert!(matches!(result, Err(DimensionSpaceError::EmptyDimension(_))));
    }

    #[test]
    fn test_duplicate_value_is_rejected() {
        let result = ContentDimensionConfig::from_json(
            r#"{"dimensions": {"language": {"values": {"en": {"specializations": {"en": {}}}}}}}"#,
        );
        assert!(matches!(
            result,
            Err(DimensionSpaceError::DuplicateDimensionValue { .. })
        ));
    }
}
