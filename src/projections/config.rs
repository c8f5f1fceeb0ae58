//! Projection configuration

use super::ProjectionError;
use serde::{Deserialize, Serialize};

/// Tunables of the content graph projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Stride between sibling positions; must be even and at least 2
    pub relation_default_offset: i64,
    /// Events read from the log per catch-up batch
    pub catch_up_batch_size: usize,
    /// Accept sequence numbers beyond the expected next one
    pub allow_sequence_gaps: bool,
    /// Legacy event types that are logged and skipped instead of failing the projection
    pub skipped_legacy_event_types: Vec<String>,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            relation_default_offset: 128,
            catch_up_batch_size: 100,
            allow_sequence_gaps: false,
            skipped_legacy_event_types: vec![
                "NodeWasMoved".to_string(),
                "NodeWasRemoved".to_string(),
                "NodeReferenceWasAdded".to_string(),
                "PropertiesWereUpdated".to_string(),
            ],
        }
    }
}

impl ProjectionConfig {
    /// Parse and validate a JSON configuration; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ProjectionError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ProjectionError::InvalidConfiguration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the position algorithm relies on
    pub fn validate(&self) -> Result<(), ProjectionError> {
        if self.relation_default_offset < 2 || self.relation_default_offset % 2 != 0 {
            return Err(ProjectionError::InvalidConfiguration(format!(
                "relation_default_offset must be an even number of at least 2, got {}",
                self.relation_default_offset
            )));
        }
        if self.catch_up_batch_size == 0 {
            return Err(ProjectionError::InvalidConfiguration(
                "catch_up_batch_size must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether the event type is a skipped legacy type
    pub fn is_skipped_legacy_event_type(&self, event_type: &str) -> bool {
        self.skipped_legacy_event_types
            .iter()
            .any(|skipped| skipped == event_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProjectionConfig::default();
        assert_eq!(config.relation_default_offset, 128);
        assert!(config.is_skipped_legacy_event_type("NodeWasMoved"));
        assert!(!config.is_skipped_legacy_event_type("NodeAggregateWasMoved"));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ProjectionConfig::from_json(r#"{"allow_sequence_gaps": true}"#).unwrap();
        assert!(config.allow_sequence_gaps);
        assert_eq!(config.catch_up_batch_size, 100);
    }

    #[test]
    fn test_odd_offset_is_rejected() {
        let result = ProjectionConfig::from_json(r#"{"relation_default_offset": 127}"#);
        assert!(matches!(result, Err(ProjectionError::InvalidConfiguration(_))));
    }
}
