//! Prompt templates for the store assistant.
//!
//! Templates are Jinja sources rendered with `minijinja` from small serializable
//! request structs.

use minijinja::Environment;
use mostrador_core::tool::ToolRegistry;
use mostrador_core::{MostradorError, Result};
use serde::Serialize;

const SYSTEM_TEMPLATE_NAME: &str = "system";
const REPHRASE_TEMPLATE_NAME: &str = "rephrase";

const SYSTEM_TEMPLATE: &str = r#"Sos el asistente virtual de {{ store_name }}, una tienda de ropa.
Respondé siempre en español, de forma breve y amable.

Herramientas disponibles:
{{ tools }}

Reglas:
- Si necesitás datos del catálogo o de la tienda, respondé SOLO con un JSON de la forma
  {"name": "<herramienta>", "arguments": {<argumentos>}}
- Usá exactamente los nombres de herramienta y de argumentos de la lista.
- Nunca inventes productos ni precios: consultá siempre una herramienta.
- Para saludos o charla que no requiere datos usá chat_response con el argumento "message".
{% if detection == "rules" -%}
- Cuando no haya herramientas disponibles, respondé en texto plano sin JSON.
{% endif %}"#;

const REPHRASE_TEMPLATE: &str = r#"El cliente preguntó: "{{ question }}"

{% if previous -%}
Productos que ya le mostraste antes:
{{ previous }}

{% endif -%}
Resultado de la herramienta {{ tool }}:
{{ result }}

Reformulá este resultado como una respuesta natural en español para el cliente.
- No uses JSON, llaves ni nombres de herramientas.
- No agregues productos ni precios que no estén en el resultado{% if previous %} o en la lista anterior{% endif %}.
{% if is_error -%}
- El resultado es un error: pedí disculpas y sugerí reformular la consulta.
{% endif %}"#;

#[derive(Debug, Clone, Serialize)]
struct SystemPromptRequest<'a> {
    store_name: &'a str,
    tools: String,
    detection: &'a str,
}

#[derive(Debug, Clone, Serialize)]
struct RephraseRequest<'a> {
    question: &'a str,
    tool: &'a str,
    result: &'a str,
    previous: Option<&'a str>,
    is_error: bool,
}

/// Renders the assistant's prompts.
pub struct PromptBuilder {
    env: Environment<'static>,
    store_name: String,
}

impl PromptBuilder {
    pub fn new(store_name: impl Into<String>) -> Result<Self> {
        let mut env = Environment::new();
        env.add_template(SYSTEM_TEMPLATE_NAME, SYSTEM_TEMPLATE)
            .map_err(prompt_error)?;
        env.add_template(REPHRASE_TEMPLATE_NAME, REPHRASE_TEMPLATE)
            .map_err(prompt_error)?;
        Ok(Self {
            env,
            store_name: store_name.into(),
        })
    }

    /// System prompt advertising every tool of `registry`.
    pub fn system_prompt(&self, registry: &ToolRegistry, detection: &str) -> Result<String> {
        let request = SystemPromptRequest {
            store_name: &self.store_name,
            tools: registry.advertisement(),
            detection,
        };
        self.render(SYSTEM_TEMPLATE_NAME, &request)
    }

    /// One-off prompt asking the model to restate a tool result in prose.
    ///
    /// `previous` is the product list shown before this turn, so answers like
    /// "más barato que la anterior" have something to compare against.
    pub fn rephrase_prompt(
        &self,
        question: &str,
        tool: &str,
        result: &str,
        previous: Option<&str>,
        is_error: bool,
    ) -> Result<String> {
        let request = RephraseRequest {
            question,
            tool,
            result,
            previous: previous.filter(|p| !p.trim().is_empty()),
            is_error,
        };
        self.render(REPHRASE_TEMPLATE_NAME, &request)
    }

    fn render<S: Serialize>(&self, name: &str, request: &S) -> Result<String> {
        self.env
            .get_template(name)
            .and_then(|template| template.render(request))
            .map_err(prompt_error)
    }
}

fn prompt_error(err: minijinja::Error) -> MostradorError {
    MostradorError::Prompt(err.to_string())
}
