//! Tool trait definition and argument access.

use agent_core::{ToolDefinition, ToolEnvelope};
use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::ToolError;

/// Arguments passed to a tool for execution.
#[derive(Debug, Clone, Default)]
pub struct ToolArgs {
    /// Parameters as supplied by the reasoning engine.
    pub params: Map<String, Value>,
}

impl ToolArgs {
    /// Create new tool arguments with the given parameters.
    pub fn new(params: Map<String, Value>) -> Self {
        Self { params }
    }

    /// Get a non-blank string parameter.
    pub fn get_string(&self, key: &str) -> Result<String, ToolError> {
        let value = self
            .params
            .get(key)
            .filter(|v| !v.is_null())
            .ok_or_else(|| ToolError::MissingParameter(key.to_string()))?;

        let text = value.as_str().ok_or_else(|| ToolError::InvalidParameter {
            name: key.to_string(),
            reason: "expected string".to_string(),
        })?;

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ToolError::MissingParameter(key.to_string()));
        }
        Ok(trimmed.to_string())
    }

    /// Get an optional string parameter.
    pub fn get_string_opt(&self, key: &str) -> Option<String> {
        self.params.get(key)?.as_str().map(|s| s.to_string())
    }

    /// Get a positive integer parameter, falling back to `default` when absent.
    ///
    /// Engines sometimes send numbers as strings (`"6"`), which are accepted.
    pub fn get_u64_or(&self, key: &str, default: u64) -> Result<u64, ToolError> {
        let invalid = |reason: &str| ToolError::InvalidParameter {
            name: key.to_string(),
            reason: reason.to_string(),
        };

        let parsed = match self.params.get(key) {
            None | Some(Value::Null) => return Ok(default),
            Some(Value::Number(n)) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64)),
            Some(Value::String(s)) if s.trim().is_empty() => return Ok(default),
            Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
            Some(_) => None,
        };

        match parsed {
            Some(0) => Err(invalid("must be at least 1")),
            Some(n) => Ok(n),
            None => Err(invalid("expected a positive integer")),
        }
    }
}

/// Trait for the tool adapters exposed to the reasoning engine.
///
/// An adapter never fails outward: upstream problems are reported inside the
/// returned [`ToolEnvelope`].
#[async_trait]
pub trait Tool: Send + Sync {
    /// The tool's unique name (used for dispatch).
    fn name(&self) -> &str;

    /// Natural-language purpose shown to the reasoning engine.
    fn description(&self) -> &str;

    /// JSON schema of the parameters object.
    fn parameters(&self) -> Value;

    /// Function-calling definition handed to the engine.
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(self.name(), self.description(), self.parameters())
    }

    /// Corrective text used when the engine omits a required argument.
    fn missing_argument_message(&self, parameter: &str) -> String {
        format!("A {} is required to call {}.", parameter, self.name())
    }

    /// Execute the tool with the given arguments.
    async fn execute(&self, args: ToolArgs) -> ToolEnvelope;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> ToolArgs {
        match value {
            Value::Object(map) => ToolArgs::new(map),
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_get_string() {
        let a = args(json!({"series_id": " UNRATE ", "blank": "  ", "n": 3, "nothing": null}));
        assert_eq!(a.get_string("series_id").unwrap(), "UNRATE");
        assert!(matches!(a.get_string("blank"), Err(ToolError::MissingParameter(_))));
        assert!(matches!(a.get_string("nothing"), Err(ToolError::MissingParameter(_))));
        assert!(matches!(a.get_string("absent"), Err(ToolError::MissingParameter(_))));
        assert!(matches!(a.get_string("n"), Err(ToolError::InvalidParameter { .. })));
    }

    #[test]
    fn test_get_u64_or() {
        let a = args(json!({"a": 6, "b": "4", "c": 2.0, "d": "x", "e": 0, "f": null, "g": -1}));
        assert_eq!(a.get_u64_or("a", 12).unwrap(), 6);
        assert_eq!(a.get_u64_or("b", 12).unwrap(), 4);
        assert_eq!(a.get_u64_or("c", 12).unwrap(), 2);
        assert_eq!(a.get_u64_or("f", 12).unwrap(), 12);
        assert_eq!(a.get_u64_or("missing", 12).unwrap(), 12);
        assert!(a.get_u64_or("d", 12).is_err());
        assert!(a.get_u64_or("e", 12).is_err());
        assert!(a.get_u64_or("g", 12).is_err());
    }
}
