//! Deterministic intent detection for the `rules` detection mode.
//!
//! Input is folded (lowercase, no accents) and split into words. Rules are
//! tried in a fixed order: product category / price direction, store
//! information, small talk. Anything else is left to the model as plain chat.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Value, json};
use tracing::debug;

use crate::catalog::PriceSort;
use crate::session::SessionMemory;
use crate::text::fold;
use crate::tool::{ToolArguments, ToolCall, ToolKind};

pub const GREETING_REPLY: &str = "¡Hola! Soy el asistente de la tienda. ¿Qué estás buscando hoy?";
pub const THANKS_REPLY: &str = "¡De nada! Si necesitás algo más, acá estoy.";
pub const FAREWELL_REPLY: &str = "¡Hasta luego! Gracias por visitarnos.";

/// Spanish and English category words mapped to the catalog's English token.
const CATEGORY_SYNONYMS: &[(&str, &[&str])] = &[
    ("t-shirt", &["remera", "camiseta", "playera", "t-shirt", "tshirt", "tee"]),
    ("trousers", &["pantalon", "trousers", "pants"]),
    ("jeans", &["jean", "jeans", "vaquero"]),
    ("dress", &["vestido", "dress"]),
    ("jacket", &["campera", "chaqueta", "jacket"]),
    ("coat", &["abrigo", "tapado", "coat"]),
    ("trainers", &["zapatilla", "trainer", "trainers", "sneaker"]),
    ("shoes", &["zapato", "shoe", "shoes"]),
    ("boots", &["bota", "boot", "boots"]),
    ("hoodie", &["buzo", "sudadera", "hoodie"]),
    ("jumper", &["sueter", "sweater", "pullover", "jumper"]),
    ("shirt", &["camisa", "shirt"]),
    ("skirt", &["falda", "pollera", "skirt"]),
    ("shorts", &["short", "shorts", "bermuda"]),
    ("bag", &["bolso", "cartera", "mochila", "bag"]),
    ("blouse", &["blusa", "blouse"]),
];

const HOURS_WORDS: &[&str] = &[
    "horario", "horarios", "hora", "horas", "abren", "abierto", "abiertos", "cierran", "cerrado",
];
const LOCATION_WORDS: &[&str] = &[
    "donde", "ubicacion", "ubicados", "ubicada", "direccion", "local", "sucursal",
];
const RETURN_WORDS: &[&str] = &["devolucion", "devoluciones", "devolver", "reembolso"];
const EXCHANGE_WORDS: &[&str] = &["cambio", "cambios", "cambiar"];
const SHIPPING_WORDS: &[&str] = &["envio", "envios", "enviar", "envian", "delivery"];
const PAYMENT_WORDS: &[&str] = &[
    "pago", "pagos", "pagar", "tarjeta", "tarjetas", "transferencia", "efectivo", "cuotas",
];
const GREETING_WORDS: &[&str] = &["hola", "buenas", "buenos", "buen", "hello", "hi", "hey"];
const THANKS_WORDS: &[&str] = &["gracias", "thanks", "thank"];
const FAREWELL_WORDS: &[&str] = &["chau", "adios", "bye"];

static SIZE_MENTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:talles?|tallas?|size)\s+([a-z0-9]+)").expect("valid regex"));

/// Rule-based replacement for model tool-call detection.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentClassifier;

impl IntentClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Returns the call the input asks for, or `None` when the input should
    /// be answered as plain chat.
    pub fn classify(&self, input: &str, memory: &SessionMemory) -> Option<ToolCall> {
        let folded = fold(input);
        let words = tokenize(&folded);
        if words.is_empty() {
            return None;
        }

        let call = product_search(&folded, &words, memory)
            .or_else(|| store_info(&words))
            .or_else(|| small_talk(&words));

        match &call {
            Some(call) => debug!(tool = %call.name, "Rule matched"),
            None => debug!("No rule matched"),
        }
        call
    }
}

fn tokenize(folded: &str) -> Vec<&str> {
    folded
        .split(|c: char| !(c.is_alphanumeric() || c == '-'))
        .map(|w| w.trim_matches('-'))
        .filter(|w| !w.is_empty())
        .collect()
}

fn has_any(words: &[&str], vocabulary: &[&str]) -> bool {
    words.iter().any(|w| vocabulary.contains(w))
}

/// Maps a word to its category token, trying the word itself then the word
/// without a plural `-es` or `-s`.
pub fn category_token(word: &str) -> Option<&'static str> {
    let candidates = [
        Some(word),
        word.strip_suffix("es"),
        word.strip_suffix('s'),
    ];
    candidates.into_iter().flatten().find_map(|candidate| {
        CATEGORY_SYNONYMS
            .iter()
            .find(|(_, synonyms)| synonyms.contains(&candidate))
            .map(|(token, _)| *token)
    })
}

/// Detects a price-direction keyword.
pub fn price_direction(folded: &str) -> Option<PriceSort> {
    let words = tokenize(folded);
    let cheap = words.iter().any(|w| {
        w.starts_with("barat") || w.starts_with("economic") || matches!(*w, "cheap" | "cheaper" | "cheapest")
    }) || ["menor precio", "mas bajo", "mas bajos"].iter().any(|p| folded.contains(p));
    if cheap {
        return Some(PriceSort::Asc);
    }

    let expensive = words.iter().any(|w| {
        matches!(*w, "caro" | "cara" | "caros" | "caras" | "expensive")
            || w.starts_with("carisim")
            || w.starts_with("costos")
    }) || ["mayor precio", "mas alto", "mas altos"].iter().any(|p| folded.contains(p));
    expensive.then_some(PriceSort::Desc)
}

fn product_search(folded: &str, words: &[&str], memory: &SessionMemory) -> Option<ToolCall> {
    let category = words.iter().find_map(|w| category_token(w));
    let sort = price_direction(folded);

    let term = match (category, sort) {
        (Some(token), _) => token.to_string(),
        (None, Some(_)) => memory.last_search_term.clone().unwrap_or_default(),
        (None, None) => return None,
    };

    let mut args = ToolArguments::new();
    args.insert("search_term".into(), Value::String(term));
    if let Some(sort) = sort {
        args.insert("sort_by_price".into(), json!(sort.as_ref()));
    }
    if let Some(size) = SIZE_MENTION.captures(folded).and_then(|c| c.get(1)) {
        args.insert("size_filter".into(), json!(size.as_str().to_uppercase()));
    }
    Some(ToolCall::new(ToolKind::FindProducts.name(), args))
}

fn store_info(words: &[&str]) -> Option<ToolCall> {
    let no_args = |kind: ToolKind| ToolCall::new(kind.name(), ToolArguments::new());
    let topic = |topic: &str| {
        let mut args = ToolArguments::new();
        args.insert("topic".into(), json!(topic));
        ToolCall::new(ToolKind::BusinessInfo.name(), args)
    };

    if has_any(words, HOURS_WORDS) {
        Some(no_args(ToolKind::GetStoreHours))
    } else if has_any(words, LOCATION_WORDS) {
        Some(no_args(ToolKind::GetStoreLocation))
    } else if has_any(words, RETURN_WORDS) {
        Some(no_args(ToolKind::GetReturnPolicy))
    } else if has_any(words, EXCHANGE_WORDS) {
        Some(topic("cambios"))
    } else if has_any(words, SHIPPING_WORDS) {
        Some(topic("envios"))
    } else if has_any(words, PAYMENT_WORDS) {
        Some(topic("pagos"))
    } else {
        None
    }
}

fn small_talk(words: &[&str]) -> Option<ToolCall> {
    let reply = if has_any(words, GREETING_WORDS) {
        GREETING_REPLY
    } else if has_any(words, THANKS_WORDS) {
        THANKS_REPLY
    } else if has_any(words, FAREWELL_WORDS) {
        FAREWELL_REPLY
    } else {
        return None;
    };

    let mut args = ToolArguments::new();
    args.insert("message".into(), json!(reply));
    Some(ToolCall::new(ToolKind::ChatResponse.name(), args))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(input: &str) -> Option<ToolCall> {
        IntentClassifier::new().classify(input, &SessionMemory::new())
    }

    #[test]
    fn test_category_with_cheap_keyword() {
        let call = classify("remeras más baratas").expect("a call");
        assert_eq!(call.name, "find_products");
        assert_eq!(call.arguments["search_term"], "t-shirt");
        assert_eq!(call.arguments["sort_by_price"], "asc");
        assert!(!call.arguments.contains_key("size_filter"));
    }

    #[test]
    fn test_plural_forms_map_to_category() {
        assert_eq!(category_token("pantalones"), Some("trousers"));
        assert_eq!(category_token("zapatillas"), Some("trainers"));
        assert_eq!(category_token("dresses"), Some("dress"));
        assert_eq!(category_token("mesa"), None);
    }

    #[test]
    fn test_size_is_extracted() {
        let call = classify("¿tenés jeans en talle m?").expect("a call");
        assert_eq!(call.arguments["search_term"], "jeans");
        assert_eq!(call.arguments["size_filter"], "M");
        assert!(!call.arguments.contains_key("sort_by_price"));
    }

    #[test]
    fn test_bare_price_follow_up_reuses_last_term() {
        let mut memory = SessionMemory::new();
        memory.remember_search("t-shirt", "• Basic tee → $10.00");

        let call = IntentClassifier::new()
            .classify("¿y lo más caro?", &memory)
            .expect("a call");
        assert_eq!(call.name, "find_products");
        assert_eq!(call.arguments["search_term"], "t-shirt");
        assert_eq!(call.arguments["sort_by_price"], "desc");
    }

    #[test]
    fn test_bare_price_without_memory_searches_everything() {
        let call = classify("lo más barato").expect("a call");
        assert_eq!(call.arguments["search_term"], "");
        assert_eq!(call.arguments["sort_by_price"], "asc");
    }

    #[test]
    fn test_store_information() {
        assert_eq!(classify("¿Cuál es el horario?").unwrap().name, "get_store_hours");
        assert_eq!(classify("¿Dónde están?").unwrap().name, "get_store_location");
        assert_eq!(classify("quiero hacer una devolución").unwrap().name, "get_return_policy");

        let call = classify("¿hacen envíos al interior?").unwrap();
        assert_eq!(call.name, "business_info");
        assert_eq!(call.arguments["topic"], "envios");

        let call = classify("¿puedo pagar con tarjeta?").unwrap();
        assert_eq!(call.arguments["topic"], "pagos");
    }

    #[test]
    fn test_decomposed_accents_are_classified() {
        assert_eq!(
            classify("¿Do\u{301}nde esta\u{301}n?").unwrap().name,
            "get_store_location"
        );
        assert_eq!(
            classify("quiero hacer una devolucio\u{301}n").unwrap().name,
            "get_return_policy"
        );
        let call = classify("pantalo\u{301}n ma\u{301}s barato").expect("a call");
        assert_eq!(call.arguments["search_term"], "trousers");
    }

    #[test]
    fn test_small_talk() {
        let call = classify("Hola!").unwrap();
        assert_eq!(call.name, "chat_response");
        assert_eq!(call.arguments["message"], GREETING_REPLY);

        let call = classify("muchas gracias").unwrap();
        assert_eq!(call.arguments["message"], THANKS_REPLY);
    }

    #[test]
    fn test_unmatched_input_is_chat() {
        assert!(classify("contame un chiste").is_none());
        assert!(classify("   ").is_none());
    }
}
