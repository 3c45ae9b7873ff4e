//! Tracing parameters.
//!
//! Loaded from JSON objects, read from strings or files. Every field falls back to its
//! default when absent.

use std::{fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::*;

/// Length of a ray segment that doesn't meet any mirror.
pub const MAX_LENGTH: Float = 2000.0;

/// Bounce depth at which a chain stops growing.
pub const MAX_RAY_LEVEL: usize = 50;

/// Intersections closer than this to a ray's origin are discarded.
pub const EPSILON: Float = 1e-5;

/// Upper bound accepted for [`TraceConfig::max_level`].
pub const MAX_SUPPORTED_LEVEL: usize = 1024;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Length given to segments escaping the scene, hits at or beyond it are ignored.
    pub max_length: Float,
    /// Maximum bounce depth. A chain holds at most `max_level + 1` segments.
    pub max_level: usize,
    /// Minimum travel distance before a ray may hit a surface.
    pub epsilon: Float,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            max_length: MAX_LENGTH,
            max_level: MAX_RAY_LEVEL,
            epsilon: EPSILON,
        }
    }
}

impl TraceConfig {
    /// Parses and validates a config from a JSON object.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Self::from_object(serde_json::from_str(s)?)
    }

    /// Reads, parses and validates a JSON config file holding one object.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_object(serde_json::from_reader(BufReader::new(File::open(path)?))?)
    }

    // going through a map keeps the derive from accepting the fields as an array
    fn from_object(fields: Map<String, Value>) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_value(Value::Object(fields))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason| Err(ConfigError::Invalid { field, reason });

        if !(self.max_length.is_finite() && self.max_length > 0.0) {
            return invalid("max_length", "must be finite and positive");
        }
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return invalid("epsilon", "must be finite and positive");
        }
        if self.epsilon >= self.max_length {
            return invalid("epsilon", "must be smaller than `max_length`");
        }
        if self.max_level > MAX_SUPPORTED_LEVEL {
            return invalid("max_level", "exceeds the supported bounce depth");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let config = TraceConfig::from_json_str(r#"{ "max_level": 5 }"#).unwrap();

        assert_eq!(config.max_level, 5);
        assert_eq!(config.max_length, MAX_LENGTH);
        assert_eq!(config.epsilon, EPSILON);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            TraceConfig::from_json_str(r#"{ "epsilon": 0.0 }"#),
            Err(ConfigError::Invalid { field: "epsilon", .. })
        ));
        assert!(matches!(
            TraceConfig::from_json_str(r#"{ "max_length": -1.0 }"#),
            Err(ConfigError::Invalid { field: "max_length", .. })
        ));
        assert!(matches!(
            TraceConfig::from_json_str(r#"{ "max_level": 100000 }"#),
            Err(ConfigError::Invalid { field: "max_level", .. })
        ));
    }

    #[test]
    fn only_objects_are_configs() {
        for json in [
            "[1, 2]",
            "[2000.0, 50, 0.00001]",
            "null",
            r#"{ "epsilon": "x" }"#,
        ] {
            assert!(
                matches!(TraceConfig::from_json_str(json), Err(ConfigError::Json(_))),
                "{json}"
            );
        }
        assert_eq!(TraceConfig::from_json_str("{}").unwrap(), TraceConfig::default());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            TraceConfig::from_path("/nonexistent/catoptric.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
