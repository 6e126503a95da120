//! OllamaApiAgent - REST implementation of `ChatModel` for a local Ollama server.
//!
//! Calls `POST {host}/api/chat` with streaming disabled and temperature 0.
//! Host and model come from `AppConfig`, which already applied env overrides.

use std::time::Duration;

use async_trait::async_trait;
use mostrador_core::model::{AgentError, ChatModel, ModelReply};
use mostrador_core::session::ConversationMessage;
use mostrador_core::tool::{ToolArguments, ToolCall, ToolRegistry};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

const CHAT_PATH: &str = "/api/chat";

/// Agent implementation that talks to the Ollama HTTP API.
#[derive(Clone)]
pub struct OllamaApiAgent {
    client: Client,
    host: String,
    model: String,
}

impl OllamaApiAgent {
    /// Creates a new agent for the given host and model, without request timeout.
    pub fn new(host: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            host: host.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    /// Rebuilds the HTTP client with a per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, AgentError> {
        self.client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AgentError::ExecutionFailed(format!("Failed to build HTTP client: {err}")))?;
        Ok(self)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn build_request(&self, messages: &[ConversationMessage], tools: Option<&ToolRegistry>) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: messages
                .iter()
                .map(|m| ChatMessage {
                    role: m.role.as_str().to_string(),
                    content: m.content.clone(),
                })
                .collect(),
            stream: false,
            options: ChatOptions { temperature: 0.0 },
            tools: tools.map(ToolRegistry::function_schemas),
        }
    }

    async fn send_request(&self, body: &ChatRequest) -> Result<ModelReply, AgentError> {
        let url = format!("{}{}", self.host, CHAT_PATH);
        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|err| AgentError::ProcessError {
                status_code: None,
                message: format!("Ollama API request failed: {err}"),
                is_retryable: err.is_connect() || err.is_timeout(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Ollama error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|err| AgentError::ParseError(format!("Failed to parse Ollama response: {err}")))?;

        Ok(into_reply(parsed))
    }
}

#[async_trait]
impl ChatModel for OllamaApiAgent {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        messages: &[ConversationMessage],
        tools: Option<&ToolRegistry>,
    ) -> Result<ModelReply, AgentError> {
        let request = self.build_request(messages, tools);
        debug!(
            model = %self.model,
            messages = request.messages.len(),
            tools = request.tools.as_ref().map_or(0, Vec::len),
            "Sending chat request"
        );
        self.send_request(&request).await
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    options: ChatOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Value>>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
    #[serde(default)]
    tool_calls: Vec<ResponseToolCall>,
}

#[derive(Deserialize)]
struct ResponseToolCall {
    #[serde(default)]
    id: Option<String>,
    function: ResponseFunction,
}

#[derive(Deserialize)]
struct ResponseFunction {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

fn into_reply(response: ChatResponse) -> ModelReply {
    let tool_calls = response
        .message
        .tool_calls
        .into_iter()
        .map(|call| {
            let arguments = coerce_arguments(&call.function.arguments);
            let tool_call = ToolCall::new(call.function.name, arguments);
            match call.id.filter(|id| !id.is_empty()) {
                Some(id) => tool_call.with_id(id),
                None => tool_call,
            }
        })
        .collect();

    ModelReply {
        content: response.message.content,
        tool_calls,
    }
}

/// Arguments normally arrive as an object; some models send a JSON string.
fn coerce_arguments(raw: &Value) -> ToolArguments {
    match raw {
        Value::Object(map) => map.clone(),
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Object(map)) => map,
            _ => {
                warn!(arguments = %s, "Discarding non-object tool arguments");
                ToolArguments::new()
            }
        },
        _ => ToolArguments::new(),
    }
}

fn map_http_error(status: StatusCode, body: String) -> AgentError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.error)
        .unwrap_or_else(|_| body.clone());

    let is_retryable = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );

    AgentError::ProcessError {
        status_code: Some(status.as_u16()),
        message,
        is_retryable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(body: Value) -> ModelReply {
        into_reply(serde_json::from_value(body).expect("valid response"))
    }

    #[test]
    fn test_request_shape() {
        let agent = OllamaApiAgent::new("http://localhost:11434/", "llama3.2");
        let messages = vec![
            ConversationMessage::system("Sos un asistente."),
            ConversationMessage::user("hola"),
        ];
        let request = agent.build_request(&messages, Some(ToolRegistry::builtin()));
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(agent.host(), "http://localhost:11434");
        assert_eq!(body["model"], "llama3.2");
        assert_eq!(body["stream"], false);
        assert_eq!(body["options"]["temperature"], 0.0);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hola");
        assert_eq!(body["tools"][0]["type"], "function");

        let plain = agent.build_request(&messages, None);
        let body = serde_json::to_value(&plain).unwrap();
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn test_native_tool_calls_get_ids() {
        let reply = parse(json!({
            "model": "llama3.2",
            "message": {
                "role": "assistant",
                "content": "",
                "tool_calls": [
                    {"function": {"name": "find_products", "arguments": {"search_term": "jeans"}}},
                    {"id": "call_7", "function": {"name": "get_store_hours", "arguments": "{}"}}
                ]
            },
            "done": true
        }));

        assert_eq!(reply.tool_calls.len(), 2);
        assert_eq!(reply.tool_calls[0].arguments["search_term"], "jeans");
        assert!(!reply.tool_calls[0].id.is_empty());
        assert!(!reply.tool_calls[0].is_manual());
        assert_eq!(reply.tool_calls[1].id, "call_7");
        assert!(reply.tool_calls[1].arguments.is_empty());
    }

    #[test]
    fn test_text_only_reply() {
        let reply = parse(json!({"message": {"role": "assistant", "content": "¡Hola!"}, "done": true}));
        assert_eq!(reply.content, "¡Hola!");
        assert!(reply.tool_calls.is_empty());
    }

    #[test]
    fn test_string_arguments_are_decoded() {
        let args = coerce_arguments(&json!("{\"product\": \"remera\"}"));
        assert_eq!(args["product"], "remera");
        assert!(coerce_arguments(&json!("not json")).is_empty());
        assert!(coerce_arguments(&Value::Null).is_empty());
    }

    #[test]
    fn test_http_errors() {
        let err = map_http_error(StatusCode::NOT_FOUND, r#"{"error": "model 'prueba' not found"}"#.into());
        match err {
            AgentError::ProcessError {
                status_code,
                message,
                is_retryable,
            } => {
                assert_eq!(status_code, Some(404));
                assert_eq!(message, "model 'prueba' not found");
                assert!(!is_retryable);
            }
            other => panic!("unexpected error {:?}", other),
        }

        assert!(map_http_error(StatusCode::SERVICE_UNAVAILABLE, "busy".into()).is_retryable());
    }
}
