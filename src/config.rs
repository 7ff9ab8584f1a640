//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Tunables for a [`Session`](crate::Session).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum nesting of parameter resolutions before giving up with
    /// `ExecutionError::CyclicDependency`.
    pub max_depth: usize,

    /// Replies rejected in a row before a question counts as unanswered.
    pub max_ask_attempts: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_ask_attempts: 3,
        }
    }
}

impl EngineConfig {
    /// Parses a configuration from JSON; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidConfig` if the JSON cannot be parsed.
    pub fn from_json(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json).map_err(|e| ValidationError::InvalidConfig {
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.max_depth, 64);
        assert_eq!(config.max_ask_attempts, 3);
    }

    #[test]
    fn test_from_json_partial() {
        let config = EngineConfig::from_json(r#"{"max_depth": 8}"#).unwrap();
        assert_eq!(config.max_depth, 8);
        assert_eq!(config.max_ask_attempts, 3);
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(matches!(
            EngineConfig::from_json("{max_depth"),
            Err(ValidationError::InvalidConfig { .. })
        ));
    }
}
