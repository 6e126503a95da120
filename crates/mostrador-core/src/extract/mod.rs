//! Recovery of tool calls from raw model text.
//!
//! Used only when the backend's native tool-call channel is empty. At most one
//! call is recovered per response.

pub mod literal;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

pub use literal::{LiteralError, parse_literal, parse_permissive};

use crate::tool::{ToolArguments, ToolCall};

/// `"name": "x", {` where the model forgot the `"arguments":` label.
static MISSING_ARGUMENTS_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(["']name["']\s*:\s*["'][^"']*["']\s*,)\s*\{"#).expect("valid regex")
});

/// Greedy span from the first `{` to the last `}` that mentions a name key.
static CALL_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)\{.*["']name["'].*\}"#).expect("valid regex"));

/// Inserts the missing `"arguments":` label, at most once.
pub fn repair_missing_arguments_key(text: &str) -> String {
    MISSING_ARGUMENTS_KEY
        .replace(text, r#"$1 "arguments": {"#)
        .into_owned()
}

/// Tries to recover a structured call from unstructured model output.
///
/// Returns `None` when no call can be recovered; the text should then be
/// treated as plain chat.
pub fn extract_tool_calls(text: &str) -> Option<Vec<ToolCall>> {
    let repaired = repair_missing_arguments_key(text);
    let span = CALL_SPAN.find(&repaired)?.as_str();

    let value = match parse_permissive(span) {
        Ok(value) => value,
        Err(err) => {
            debug!(error = %err, "Could not parse candidate tool call");
            return None;
        }
    };

    let object = value.as_object()?;
    let name = object.get("name")?.as_str()?.trim();
    if name.is_empty() {
        return None;
    }

    let arguments = object
        .get("arguments")
        .or_else(|| object.get("args"))
        .map(coerce_arguments)
        .unwrap_or_default();

    debug!(tool = name, "Recovered tool call from raw text");
    Some(vec![ToolCall::manual(name, arguments)])
}

/// Arguments sometimes arrive JSON-encoded inside a string.
fn coerce_arguments(raw: &Value) -> ToolArguments {
    match raw {
        Value::Object(map) => map.clone(),
        Value::String(s) => parse_permissive(s)
            .ok()
            .and_then(|v| v.as_object().cloned())
            .unwrap_or_default(),
        _ => ToolArguments::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn single(text: &str) -> ToolCall {
        let mut calls = extract_tool_calls(text).expect("a call");
        assert_eq!(calls.len(), 1);
        calls.remove(0)
    }

    #[test]
    fn test_repairs_missing_arguments_key() {
        let call = single(r#"blah {"name": "find_products", {"search_term": "jeans"}} blah"#);
        assert_eq!(call.name, "find_products");
        assert_eq!(Value::Object(call.arguments), json!({"search_term": "jeans"}));
        assert_eq!(call.id, ToolCall::MANUAL_ID);
    }

    #[test]
    fn test_repair_applies_once() {
        let repaired = repair_missing_arguments_key(r#"{"name": "a", {}} {"name": "b", {}}"#);
        assert_eq!(repaired.matches("\"arguments\"").count(), 1);
    }

    #[test]
    fn test_single_quoted_call_uses_literal_parser() {
        let call = single("{'name': 'chat_response', 'arguments': {'message': 'hi'}}");
        assert_eq!(call.name, "chat_response");
        assert_eq!(call.arguments["message"], "hi");
    }

    #[test]
    fn test_args_key_and_string_arguments() {
        let call = single(r#"{"name": "get_price", "args": {"product": "jeans"}}"#);
        assert_eq!(call.arguments["product"], "jeans");

        let call = single(r#"{"name": "get_price", "arguments": "{\"product\": \"remera\"}"}"#);
        assert_eq!(call.arguments["product"], "remera");

        let call = single(r#"{"name": "recommend_products"}"#);
        assert!(call.arguments.is_empty());
    }

    #[test]
    fn test_code_fences_are_tolerated() {
        let call = single("```json\n{\"name\": \"get_store_hours\", \"arguments\": {}}\n```");
        assert_eq!(call.name, "get_store_hours");
    }

    #[test]
    fn test_plain_text_has_no_call() {
        assert!(extract_tool_calls("Hola, ¿en qué te puedo ayudar?").is_none());
        assert!(extract_tool_calls(r#"{"text": "sin nombre"}"#).is_none());
        assert!(extract_tool_calls(r#"{"name": 42}"#).is_none());
        assert!(extract_tool_calls(r#"{"name": "x", "arguments": {"#).is_none());
    }

    #[test]
    fn test_multiple_attempts_are_not_separated() {
        // the greedy span swallows both objects and fails to parse
        let text = r#"{"name": "a", "arguments": {}} y también {"name": "b", "arguments": {}}"#;
        assert!(extract_tool_calls(text).is_none());
    }
}
