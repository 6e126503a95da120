//! Alias resolution for tool names and argument keys.
//!
//! Small models emit plausible but wrong names ("search_products",
//! `{"query": ...}`). A known synonym must never make dispatch fail, so every
//! call goes through [`normalize`] before it reaches the registry.

use serde_json::Value;

use super::call::{ToolArguments, ToolCall};
use super::registry::ToolKind;

const NAME_ALIASES: &[(&str, ToolKind)] = &[
    ("search_products", ToolKind::FindProducts),
    ("product_search", ToolKind::FindProducts),
    ("search", ToolKind::FindProducts),
    ("buscar_productos", ToolKind::FindProducts),
    ("buscar", ToolKind::FindProducts),
    ("refine", ToolKind::RefineProducts),
    ("filter_products", ToolKind::RefineProducts),
    ("get_price", ToolKind::GetProductPrice),
    ("price", ToolKind::GetProductPrice),
    ("precio", ToolKind::GetProductPrice),
    ("check_stock", ToolKind::CheckSize),
    ("check_size_availability", ToolKind::CheckSize),
    ("sample_products", ToolKind::ListSampleProducts),
    ("list_products", ToolKind::ListSampleProducts),
    ("product_summary", ToolKind::SummarizeProduct),
    ("describe_product", ToolKind::SummarizeProduct),
    ("store_hours", ToolKind::GetStoreHours),
    ("get_hours", ToolKind::GetStoreHours),
    ("horario", ToolKind::GetStoreHours),
    ("store_location", ToolKind::GetStoreLocation),
    ("get_location", ToolKind::GetStoreLocation),
    ("ubicacion", ToolKind::GetStoreLocation),
    ("return_policy", ToolKind::GetReturnPolicy),
    ("returns", ToolKind::GetReturnPolicy),
    ("chat", ToolKind::ChatResponse),
    ("respond", ToolKind::ChatResponse),
    ("reply", ToolKind::ChatResponse),
    ("respuesta", ToolKind::ChatResponse),
];

const SEARCH_TERM_ALIASES: &[&str] = &["query", "product"];

/// Maps a raw tool name onto its canonical name.
///
/// Unknown names come back unchanged; the registry reports them later as
/// "tool not found".
pub fn canonical_name(raw_name: &str) -> String {
    let trimmed = raw_name.trim();
    NAME_ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(trimmed))
        .map(|(_, kind)| kind.name().to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

/// Resolves name and argument aliases.
pub fn normalize(raw_name: &str, mut raw_args: ToolArguments) -> (String, ToolArguments) {
    let name = canonical_name(raw_name);

    if name.eq_ignore_ascii_case(ToolKind::FindProducts.name()) {
        if !raw_args.contains_key("search_term") {
            let promoted = SEARCH_TERM_ALIASES
                .iter()
                .find_map(|alias| raw_args.remove(*alias))
                .unwrap_or_else(|| Value::String(String::new()));
            raw_args.insert("search_term".to_string(), promoted);
        }
    } else if name.eq_ignore_ascii_case(ToolKind::ChatResponse.name())
        && !raw_args.contains_key("message")
    {
        let own_name = raw_name.trim();
        let promoted = raw_args
            .remove("text")
            .or_else(|| raw_args.remove(own_name))
            .or_else(|| raw_args.remove(ToolKind::ChatResponse.name()));
        if let Some(value) = promoted {
            raw_args.insert("message".to_string(), value);
        }
    }

    (name, raw_args)
}

/// Normalizes a whole call, keeping its id.
pub fn normalize_call(call: ToolCall) -> ToolCall {
    let (name, arguments) = normalize(&call.name, call.arguments);
    ToolCall {
        id: call.id,
        name,
        arguments,
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
    fn test_search_alias_with_query_key() {
        let (name, arguments) = normalize("search_products", args(json!({"query": "jeans"})));
        assert_eq!(name, "find_products");
        assert_eq!(Value::Object(arguments), json!({"search_term": "jeans"}));
    }

    #[test]
    fn test_query_wins_over_product() {
        let (_, arguments) = normalize(
            "find_products",
            args(json!({"product": "remera", "query": "jeans"})),
        );
        assert_eq!(arguments["search_term"], "jeans");
        // the losing alias is left alone
        assert_eq!(arguments["product"], "remera");
    }

    #[test]
    fn test_existing_search_term_is_kept() {
        let (_, arguments) = normalize(
            "product_search",
            args(json!({"search_term": "vestido", "query": "jeans"})),
        );
        assert_eq!(arguments["search_term"], "vestido");
    }

    #[test]
    fn test_missing_search_term_defaults_to_empty() {
        let (_, arguments) = normalize("find_products", args(json!({"sort_by_price": "asc"})));
        assert_eq!(arguments["search_term"], "");
    }

    #[test]
    fn test_chat_aliases() {
        let (name, arguments) = normalize("chat", args(json!({"text": "hola"})));
        assert_eq!(name, "chat_response");
        assert_eq!(arguments["message"], "hola");

        let (_, arguments) = normalize("chat_response", args(json!({"chat_response": "buenas"})));
        assert_eq!(arguments["message"], "buenas");

        let (_, arguments) = normalize("reply", args(json!({"reply": "qué tal"})));
        assert_eq!(arguments["message"], "qué tal");
    }

    #[test]
    fn test_unknown_name_passes_through() {
        let (name, arguments) = normalize(" launch_rocket ", args(json!({"query": "x"})));
        assert_eq!(name, "launch_rocket");
        assert_eq!(arguments["query"], "x");
    }

    #[test]
    fn test_normalize_call_keeps_id() {
        let call = ToolCall::manual("get_price", args(json!({"product": "jeans"})));
        let normalized = normalize_call(call);
        assert_eq!(normalized.id, ToolCall::MANUAL_ID);
        assert_eq!(normalized.name, "get_product_price");
    }
}
