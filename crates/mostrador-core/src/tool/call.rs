//! Tool call type and argument accessors.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Arguments of a tool call, keyed by argument name.
pub type ToolArguments = Map<String, Value>;

/// A structured request to run one registered tool.
///
/// Calls only live for the duration of a single turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Id assigned by the model backend, a fresh UUID, or [`ToolCall::MANUAL_ID`]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub arguments: ToolArguments,
}

impl ToolCall {
    /// Id given to calls recovered from raw model text.
    pub const MANUAL_ID: &'static str = "manual";

    /// Creates a call with a freshly generated id.
    pub fn new(name: impl Into<String>, arguments: ToolArguments) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            arguments,
        }
    }

    /// Creates a call recovered from raw text.
    pub fn manual(name: impl Into<String>, arguments: ToolArguments) -> Self {
        Self {
            id: Self::MANUAL_ID.to_string(),
            name: name.into(),
            arguments,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn is_manual(&self) -> bool {
        self.id == Self::MANUAL_ID
    }

    /// Compact `name {args}` form for traces.
    pub fn summary(&self) -> String {
        format!("{} {}", self.name, Value::Object(self.arguments.clone()))
    }
}

/// Reads a string argument. Numbers and booleans are stringified; blank
/// strings count as missing.
pub fn arg_str(args: &ToolArguments, key: &str) -> Option<String> {
    match args.get(key)? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Reads a numeric argument. Numeric strings such as `"10"` or `"$25"` are
/// accepted because the model often quotes numbers.
pub fn arg_f64(args: &ToolArguments, key: &str) -> Option<f64> {
    match args.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s
                .trim()
                .chars()
                .filter(|c| !matches!(c, '$' | ',' | ' '))
                .collect();
            cleaned.parse().ok()
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> ToolArguments {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_manual_calls_are_flagged() {
        let call = ToolCall::manual("find_products", ToolArguments::new());
        assert!(call.is_manual());
        assert!(!ToolCall::new("find_products", ToolArguments::new()).is_manual());
    }

    #[test]
    fn test_arg_str_handles_blank_and_numbers() {
        let a = args(json!({"term": "  ", "size": 42, "name": " jeans "}));
        assert_eq!(arg_str(&a, "term"), None);
        assert_eq!(arg_str(&a, "size").as_deref(), Some("42"));
        assert_eq!(arg_str(&a, "name").as_deref(), Some("jeans"));
        assert_eq!(arg_str(&a, "missing"), None);
    }

    #[test]
    fn test_arg_f64_accepts_quoted_numbers() {
        let a = args(json!({"count": "5", "max": "$1,200", "float": 3.7, "bad": "muchos"}));
        assert_eq!(arg_f64(&a, "count"), Some(5.0));
        assert_eq!(arg_f64(&a, "max"), Some(1200.0));
        assert_eq!(arg_f64(&a, "float"), Some(3.7));
        assert_eq!(arg_f64(&a, "bad"), None);
    }
}
