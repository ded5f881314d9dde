//! Tool trait — the interface every served operation implements.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use slackline_core::{Error, Result};

// ─────────────────────────────────────────────
// Definitions
// ─────────────────────────────────────────────

/// What a tool advertises through `tools/list`.
#[derive(Clone, Debug, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

// ─────────────────────────────────────────────
// Tool trait
// ─────────────────────────────────────────────

/// Every served tool implements this trait.
///
/// The registry discovers tools via `name()`, advertises their schemas
/// via `to_definition()`, and dispatches calls via `execute()`.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name the external caller invokes (e.g. `"post_message"`).
    fn name(&self) -> &str;

    /// Human-readable description advertised to the caller.
    fn description(&self) -> &str;

    /// JSON Schema describing the parameters.
    ///
    /// Must be `{"type": "object", "properties": {...}, "required": [...]}`.
    fn parameters(&self) -> Value;

    /// Execute the tool. Each invocation is stateless end-to-end; the
    /// only cross-call state is the immutable configuration.
    async fn execute(&self, params: HashMap<String, Value>) -> Result<String>;

    /// Build the definition advertised through `tools/list`.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.parameters(),
        }
    }
}

// ─────────────────────────────────────────────
// Param helpers
// ─────────────────────────────────────────────

/// Extract a required, non-empty string param.
pub fn require_string(params: &HashMap<String, Value>, key: &str) -> Result<String> {
    match params.get(key).and_then(|v| v.as_str()) {
        Some(s) if !s.is_empty() => Ok(s.to_string()),
        Some(_) => Err(Error::Validation(format!("parameter '{key}' must not be empty"))),
        None => Err(Error::Validation(format!("missing required parameter '{key}'"))),
    }
}

/// Extract an optional string param (absent → `None`).
pub fn optional_string(params: &HashMap<String, Value>, key: &str) -> Option<String> {
    params.get(key).and_then(|v| v.as_str()).map(|s| s.to_string())
}

/// Extract an optional boolean param (absent → `false`).
pub fn optional_bool(params: &HashMap<String, Value>, key: &str) -> bool {
    params.get(key).and_then(|v| v.as_bool()).unwrap_or(false)
}

/// Extract an optional non-negative integer param. A present value of
/// the wrong type or a negative number is a validation error rather
/// than silently falling back to the default.
pub fn optional_usize(params: &HashMap<String, Value>, key: &str) -> Result<Option<usize>> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .map(|n| Some(n as usize))
            .ok_or_else(|| Error::Validation(format!("parameter '{key}' must be an integer >= 0"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_require_string_present() {
        let p = params(&[("channel_id", json!("C123"))]);
        assert_eq!(require_string(&p, "channel_id").unwrap(), "C123");
    }

    #[test]
    fn test_require_string_missing() {
        let err = require_string(&HashMap::new(), "channel_id").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_require_string_empty_rejected() {
        let p = params(&[("channel_id", json!(""))]);
        let err = require_string(&p, "channel_id").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_require_string_wrong_type_rejected() {
        let p = params(&[("channel_id", json!(42))]);
        assert!(require_string(&p, "channel_id").is_err());
    }

    #[test]
    fn test_optional_bool_defaults_false() {
        let p = params(&[("skip_log", json!(true))]);
        assert!(optional_bool(&p, "skip_log"));
        assert!(!optional_bool(&p, "missing"));
    }

    #[test]
    fn test_optional_usize() {
        let p = params(&[("lines", json!(25))]);
        assert_eq!(optional_usize(&p, "lines").unwrap(), Some(25));
        assert_eq!(optional_usize(&p, "missing").unwrap(), None);
    }

    #[test]
    fn test_optional_usize_negative_rejected() {
        let p = params(&[("lines", json!(-1))]);
        assert!(optional_usize(&p, "lines").is_err());
    }

    #[test]
    fn test_optional_usize_wrong_type_rejected() {
        let p = params(&[("lines", json!("50"))]);
        assert!(optional_usize(&p, "lines").is_err());
    }

    #[tokio::test]
    async fn test_to_definition_default() {
        struct DummyTool;

        #[async_trait]
        impl Tool for DummyTool {
            fn name(&self) -> &str {
                "dummy"
            }
            fn description(&self) -> &str {
                "A test tool"
            }
            fn parameters(&self) -> Value {
                json!({
                    "type": "object",
                    "properties": { "msg": { "type": "string" } },
                    "required": ["msg"]
                })
            }
            async fn execute(&self, _params: HashMap<String, Value>) -> Result<String> {
                Ok("ok".into())
            }
        }

        let def = DummyTool.to_definition();
        assert_eq!(def.name, "dummy");
        assert_eq!(def.description, "A test tool");
        let rendered = serde_json::to_string(&def).unwrap();
        assert!(rendered.contains("inputSchema"));
    }
}
