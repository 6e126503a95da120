//! Chat-model abstraction.
//!
//! The conversation loop only talks to a [`ChatModel`]. The HTTP backend lives
//! in the interaction crate; tests plug in scripted doubles.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::ConversationMessage;
use crate::tool::{ToolCall, ToolRegistry};

/// Errors raised by a model backend.
#[derive(Debug, Clone, Error)]
pub enum AgentError {
    #[error("Model execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Model request failed: {message}")]
    ProcessError {
        status_code: Option<u16>,
        message: String,
        is_retryable: bool,
    },

    #[error("Failed to parse model response: {0}")]
    ParseError(String),
}

impl AgentError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ProcessError {
                is_retryable: true,
                ..
            }
        )
    }
}

/// One model response: free text plus any natively structured tool calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelReply {
    pub content: String,
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
}

impl ModelReply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    pub fn with_tool_calls(mut self, tool_calls: Vec<ToolCall>) -> Self {
        self.tool_calls = tool_calls;
        self
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// A chat-completion backend.
///
/// `tools` is `Some` when the model may request tool calls for this turn and
/// `None` for plain text generation (re-phrasing, rules-mode chat).
#[async_trait]
pub trait ChatModel: Send + Sync {
    fn model_name(&self) -> &str;

    async fn generate(
        &self,
        messages: &[ConversationMessage],
        tools: Option<&ToolRegistry>,
    ) -> Result<ModelReply, AgentError>;
}
