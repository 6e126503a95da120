//! Cleans model output before it is shown to the user.
//!
//! Raw tool-call syntax must never reach the customer. When the sanitizer
//! gives up it returns `None` and the caller falls back to the last raw tool
//! result (see [`with_fallback`]).

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::extract::parse_permissive;

/// Answers shorter than this are considered broken.
pub const MIN_ANSWER_CHARS: usize = 5;

static NAME_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r#"["']name["']\s*:"#).expect("valid regex"));

static BRACE_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"));

static KEY_FRAGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"["']?(?:name|arguments|args|text|message)["']?\s*:\s*"#).expect("valid regex")
});

/// Extracts human-readable text from model output.
///
/// - structured-call shape (`"name":` plus a brace) → `None`
/// - a parseable brace span → `arguments.text`, `text` or `message`, else `None`
/// - an unparseable brace span → the text with brace and key fragments stripped
/// - no brace at all → the text unchanged
pub fn sanitize(text: &str) -> Option<String> {
    let has_brace = text.contains('{') || text.contains('}');
    if !has_brace {
        return Some(text.to_string());
    }
    if NAME_KEY.is_match(text) {
        return None;
    }

    if let Some(span) = BRACE_SPAN.find(text) {
        if let Ok(value) = parse_permissive(span.as_str()) {
            return readable_field(&value);
        }
    }

    let without_keys = KEY_FRAGMENT.replace_all(text, "");
    let stripped: String = without_keys.chars().filter(|c| !matches!(c, '{' | '}')).collect();
    let stripped = stripped.trim();
    if stripped.is_empty() {
        None
    } else {
        Some(stripped.to_string())
    }
}

fn readable_field(value: &Value) -> Option<String> {
    value
        .get("arguments")
        .and_then(|args| args.get("text"))
        .or_else(|| value.get("text"))
        .or_else(|| value.get("message"))
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
}

/// Returns `candidate` unless it is missing or implausibly short, in which
/// case `fallback` is used so the user always gets an answer.
pub fn with_fallback(candidate: Option<String>, fallback: &str) -> String {
    match candidate {
        Some(answer) if answer.trim().chars().count() >= MIN_ANSWER_CHARS => answer,
        _ => fallback.to_string(),
    }
}
