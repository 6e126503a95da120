//! Builtin tools the assistant can call.
//!
//! The set is closed and known at compile time. It is built once and cached
//! for the lifetime of the application.

use std::str::FromStr;
use std::sync::OnceLock;

use serde::Serialize;
use serde_json::{Map, Value, json};
use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator};

/// The closed set of tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, EnumString, AsRefStr, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ToolKind {
    FindProducts,
    RefineProducts,
    GetProductPrice,
    CheckSize,
    ListSampleProducts,
    GetProductBySku,
    GetSimilarProducts,
    SummarizeProduct,
    RecommendProducts,
    GetStoreHours,
    GetStoreLocation,
    GetReturnPolicy,
    BusinessInfo,
    ChatResponse,
}

impl ToolKind {
    /// Canonical tool name.
    pub fn name(&self) -> &str {
        self.as_ref()
    }

    /// The chat tool answers verbatim and skips the re-phrasing pass.
    pub fn is_chat(&self) -> bool {
        matches!(self, Self::ChatResponse)
    }
}

/// Declared type of a tool argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
}

/// Default value of an optional argument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamDefault {
    Str(&'static str),
    Number(f64),
}

impl ParamDefault {
    pub fn to_value(self) -> Value {
        match self {
            Self::Str(s) => Value::String(s.to_string()),
            Self::Number(n) => json!(n),
        }
    }
}

/// One declared argument of a tool.
#[derive(Debug, Clone, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    pub param_type: ParamType,
    pub description: &'static str,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<ParamDefault>,
    /// Allowed values, if restricted
    #[serde(skip_serializing_if = "is_unrestricted")]
    pub allowed: &'static [&'static str],
}

fn is_unrestricted(allowed: &&'static [&'static str]) -> bool {
    allowed.is_empty()
}

impl ParamSpec {
    fn required(name: &'static str, param_type: ParamType, description: &'static str) -> Self {
        Self {
            name,
            param_type,
            description,
            required: true,
            default: None,
            allowed: &[],
        }
    }

    fn optional(name: &'static str, param_type: ParamType, description: &'static str) -> Self {
        Self {
            name,
            param_type,
            description,
            required: false,
            default: None,
            allowed: &[],
        }
    }

    fn with_default(mut self, default: ParamDefault) -> Self {
        self.default = Some(default);
        self
    }

    fn one_of(mut self, allowed: &'static [&'static str]) -> Self {
        self.allowed = allowed;
        self
    }
}

/// A registered tool: name, description advertised to the model, and arguments.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub kind: ToolKind,
    pub description: &'static str,
    pub params: Vec<ParamSpec>,
}

impl ToolSpec {
    pub fn name(&self) -> &str {
        self.kind.name()
    }

    /// Signature line such as `find_products(search_term, size_filter?)`.
    pub fn signature(&self) -> String {
        let params: Vec<String> = self
            .params
            .iter()
            .map(|p| {
                if p.required {
                    p.name.to_string()
                } else {
                    format!("{}?", p.name)
                }
            })
            .collect();
        format!("{}({})", self.name(), params.join(", "))
    }

    /// Function declaration in the JSON-schema shape used by chat backends.
    pub fn to_function_schema(&self) -> Value {
        let mut properties = Map::new();
        for param in &self.params {
            let mut property = json!({
                "type": param.param_type,
                "description": param.description,
            });
            if let Some(default) = param.default {
                property["default"] = default.to_value();
            }
            if !param.allowed.is_empty() {
                property["enum"] = json!(param.allowed);
            }
            properties.insert(param.name.to_string(), property);
        }
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();

        json!({
            "type": "function",
            "function": {
                "name": self.name(),
                "description": self.description,
                "parameters": {
                    "type": "object",
                    "properties": properties,
                    "required": required,
                }
            }
        })
    }
}

const SORT_VALUES: &[&str] = &["asc", "desc"];

fn spec_for(kind: ToolKind) -> ToolSpec {
    use ParamType::{Number, String};

    let (description, params) = match kind {
        ToolKind::FindProducts => (
            "Busca productos del catálogo por nombre. Puede filtrar por talle y ordenar por precio.",
            vec![
                ParamSpec::optional("search_term", String, "Texto a buscar en el nombre del producto")
                    .with_default(ParamDefault::Str("")),
                ParamSpec::optional("size_filter", String, "Talle que debe tener el producto"),
                ParamSpec::optional("sort_by_price", String, "Orden por precio").one_of(SORT_VALUES),
            ],
        ),
        ToolKind::RefineProducts => (
            "Refina la última búsqueda del usuario por color, talle o precio máximo.",
            vec![
                ParamSpec::optional("color", String, "Color deseado"),
                ParamSpec::optional("size", String, "Talle deseado"),
                ParamSpec::optional("max_price", Number, "Precio máximo"),
                ParamSpec::optional("sort_by_price", String, "Orden por precio").one_of(SORT_VALUES),
            ],
        ),
        ToolKind::GetProductPrice => (
            "Obtiene el precio de un producto específico.",
            vec![ParamSpec::required("product", String, "Nombre del producto")],
        ),
        ToolKind::CheckSize => (
            "Verifica si un producto tiene disponible un talle.",
            vec![
                ParamSpec::required("product", String, "Nombre del producto"),
                ParamSpec::required("size", String, "Talle a verificar"),
            ],
        ),
        ToolKind::ListSampleProducts => (
            "Lista productos al azar del catálogo para mostrar ejemplos.",
            vec![
                ParamSpec::optional("count", Number, "Cantidad de productos (máximo 30)")
                    .with_default(ParamDefault::Number(10.0)),
            ],
        ),
        ToolKind::GetProductBySku => (
            "Devuelve un producto exacto por su SKU.",
            vec![ParamSpec::required("sku", String, "Código SKU del producto")],
        ),
        ToolKind::GetSimilarProducts => (
            "Devuelve productos de la misma categoría que el SKU indicado.",
            vec![ParamSpec::required("sku", String, "Código SKU del producto base")],
        ),
        ToolKind::SummarizeProduct => (
            "Resume en una frase un producto: nombre, color y precio.",
            vec![ParamSpec::required("sku", String, "Código SKU del producto")],
        ),
        ToolKind::RecommendProducts => (
            "Recomienda productos populares de precio medio.",
            vec![],
        ),
        ToolKind::GetStoreHours => ("Informa el horario de atención de la tienda.", vec![]),
        ToolKind::GetStoreLocation => ("Informa la dirección de la tienda.", vec![]),
        ToolKind::GetReturnPolicy => ("Informa la política de cambios y devoluciones.", vec![]),
        ToolKind::BusinessInfo => (
            "Información general del negocio: envíos, pagos o cambios.",
            vec![
                ParamSpec::required("topic", String, "Tema consultado")
                    .one_of(&["envios", "pagos", "cambios"]),
            ],
        ),
        ToolKind::ChatResponse => (
            "Responde cuando NO se necesita acceder a datos (saludos, charla).",
            vec![ParamSpec::required("message", String, "Respuesta para el usuario")],
        ),
    };

    ToolSpec {
        kind,
        description,
        params,
    }
}

/// Read-only registry of every builtin tool.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: Vec<ToolSpec>,
}

static BUILTIN_REGISTRY: OnceLock<ToolRegistry> = OnceLock::new();

impl ToolRegistry {
    /// Returns the registry of builtin tools, initialized on first access.
    pub fn builtin() -> &'static ToolRegistry {
        BUILTIN_REGISTRY.get_or_init(|| ToolRegistry {
            tools: ToolKind::iter().map(spec_for).collect(),
        })
    }

    pub fn specs(&self) -> &[ToolSpec] {
        &self.tools
    }

    /// Exact, case-insensitive lookup by canonical name.
    pub fn lookup(&self, name: &str) -> Option<&ToolSpec> {
        let kind = ToolKind::from_str(name.trim()).ok()?;
        self.get(kind)
    }

    pub fn get(&self, kind: ToolKind) -> Option<&ToolSpec> {
        self.tools.iter().find(|spec| spec.kind == kind)
    }

    /// Human-readable capability list for the system prompt.
    pub fn advertisement(&self) -> String {
        self.tools
            .iter()
            .map(|spec| format!("- {}: {}", spec.signature(), spec.description))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Tool declarations for backends with a native tool-call channel.
    pub fn function_schemas(&self) -> Vec<Value> {
        self.tools.iter().map(ToolSpec::to_function_schema).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_is_registered() {
        let registry = ToolRegistry::builtin();
        assert_eq!(registry.specs().len(), ToolKind::iter().count());
    }

    #[test]
    fn test_lookup_is_case_insensitive_and_exact() {
        let registry = ToolRegistry::builtin();
        assert_eq!(
            registry.lookup("Find_Products").map(|s| s.kind),
            Some(ToolKind::FindProducts)
        );
        assert!(registry.lookup("find_product").is_none());
        assert!(registry.lookup("search_products").is_none());
    }

    #[test]
    fn test_signature_marks_optional_params() {
        let spec = ToolRegistry::builtin().get(ToolKind::CheckSize).unwrap();
        assert_eq!(spec.signature(), "check_size(product, size)");

        let spec = ToolRegistry::builtin().get(ToolKind::FindProducts).unwrap();
        assert_eq!(
            spec.signature(),
            "find_products(search_term?, size_filter?, sort_by_price?)"
        );
    }

    #[test]
    fn test_summarize_product_takes_a_sku() {
        let spec = ToolRegistry::builtin().lookup("summarize_product").unwrap();
        assert_eq!(spec.kind, ToolKind::SummarizeProduct);
        assert_eq!(spec.signature(), "summarize_product(sku)");
    }

    #[test]
    fn test_function_schema_shape() {
        let spec = ToolRegistry::builtin().get(ToolKind::ListSampleProducts).unwrap();
        let schema = spec.to_function_schema();
        assert_eq!(schema["function"]["name"], "list_sample_products");
        assert_eq!(schema["function"]["parameters"]["properties"]["count"]["type"], "number");
        assert_eq!(schema["function"]["parameters"]["properties"]["count"]["default"], 10.0);
        assert!(schema["function"]["parameters"]["required"].as_array().unwrap().is_empty());
    }
}
