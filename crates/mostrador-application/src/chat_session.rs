//! Chat session use case.
//!
//! One `ChatSession` lives for the whole process and drives every turn:
//! detect a tool call (model or rules), execute it, then phrase the answer.

use std::sync::Arc;

use mostrador_core::catalog::Catalog;
use mostrador_core::extract::extract_tool_calls;
use mostrador_core::intent::IntentClassifier;
use mostrador_core::model::ChatModel;
use mostrador_core::sanitize::{sanitize, with_fallback};
use mostrador_core::session::{
    ConversationHistory, ConversationMessage, DEFAULT_MAX_MESSAGES, SessionMemory,
};
use mostrador_core::store_info::StoreInfo;
use mostrador_core::tool::{
    ToolCall, ToolContext, ToolDispatcher, ToolExecution, ToolRegistry, normalize_call,
};
use mostrador_core::Result;
use mostrador_infrastructure::{AppConfig, DetectionMode};
use tracing::{debug, info, warn};

use crate::prompts::PromptBuilder;

/// Shown when the model answer cannot be cleaned into prose.
pub const UNREADABLE_REPLY: &str = "Perdón, no entendí bien. ¿Podés reformular tu consulta?";

/// Shown when a turn fails unexpectedly (backend down, prompt error...).
pub const TURN_FAILED_REPLY: &str =
    "Perdón, tuve un problema para responder. Intentá de nuevo en un momento.";

pub const DEFAULT_STORE_NAME: &str = "Mostrador";

/// Knobs of a chat session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub detection: DetectionMode,
    pub max_history_messages: usize,
    pub store_name: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            detection: DetectionMode::Model,
            max_history_messages: DEFAULT_MAX_MESSAGES,
            store_name: DEFAULT_STORE_NAME.to_string(),
        }
    }
}

impl From<&AppConfig> for SessionOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            detection: config.detection,
            max_history_messages: config.max_history_messages,
            ..Self::default()
        }
    }
}

/// What a turn produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// Final answer shown to the user
    pub reply: String,
    /// Normalized calls executed during the turn, in order
    pub tool_calls: Vec<ToolCall>,
}

impl TurnOutcome {
    fn direct(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            tool_calls: Vec::new(),
        }
    }
}

/// A conversation with the store assistant.
pub struct ChatSession {
    catalog: Arc<Catalog>,
    model: Arc<dyn ChatModel>,
    store: StoreInfo,
    dispatcher: ToolDispatcher,
    classifier: IntentClassifier,
    prompts: PromptBuilder,
    history: ConversationHistory,
    memory: SessionMemory,
    detection: DetectionMode,
}

impl ChatSession {
    /// Creates a session whose history starts with the system prompt.
    pub fn new(
        catalog: Arc<Catalog>,
        model: Arc<dyn ChatModel>,
        store: StoreInfo,
        options: SessionOptions,
    ) -> Result<Self> {
        let dispatcher = ToolDispatcher::default();
        let prompts = PromptBuilder::new(options.store_name)?;
        let system_prompt =
            prompts.system_prompt(dispatcher.registry(), &options.detection.to_string())?;

        info!(
            model = model.model_name(),
            products = catalog.len(),
            detection = %options.detection,
            "Chat session ready"
        );

        Ok(Self {
            catalog,
            model,
            store,
            dispatcher,
            classifier: IntentClassifier::new(),
            prompts,
            history: ConversationHistory::with_system_prompt(
                system_prompt,
                options.max_history_messages,
            ),
            memory: SessionMemory::new(),
            detection: options.detection,
        })
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn memory(&self) -> &SessionMemory {
        &self.memory
    }

    pub fn detection(&self) -> DetectionMode {
        self.detection
    }

    /// Runs one turn and never fails: errors are logged, the session memory
    /// is cleared and a polite message is returned instead.
    pub async fn process_turn(&mut self, input: &str) -> TurnOutcome {
        match self.handle_input(input).await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %err, "Turn failed");
                self.memory.reset();
                self.history.push_assistant(TURN_FAILED_REPLY);
                TurnOutcome::direct(TURN_FAILED_REPLY)
            }
        }
    }

    /// Runs one turn, propagating backend and prompt errors.
    pub async fn handle_input(&mut self, input: &str) -> Result<TurnOutcome> {
        self.history.push_user(input);

        let (calls, text) = self.detect(input).await?;
        if calls.is_empty() {
            let reply = sanitize(&text)
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| UNREADABLE_REPLY.to_string());
            self.history.push_assistant(reply.clone());
            return Ok(TurnOutcome::direct(reply));
        }

        // what the customer saw before this turn's searches overwrite it
        let previous_list = self.memory.last_product_list.clone();
        let mut executed = Vec::with_capacity(calls.len());
        let mut last: Option<ToolExecution> = None;
        for call in calls {
            let call = normalize_call(call);
            let mut ctx = ToolContext {
                catalog: &self.catalog,
                store: &self.store,
                memory: &mut self.memory,
            };
            // only the last result is used
            last = Some(self.dispatcher.execute(&call, &mut ctx));
            executed.push(call);
        }
        let Some(execution) = last else {
            return Ok(TurnOutcome::direct(UNREADABLE_REPLY));
        };

        let raw = execution.output.render();
        let reply = if execution.is_chat() {
            raw
        } else {
            self.history.push_assistant(raw.clone());
            self.rephrase(input, &execution, &raw, &previous_list).await
        };

        self.history.push_assistant(reply.clone());
        Ok(TurnOutcome {
            reply,
            tool_calls: executed,
        })
    }

    /// Returns the calls to execute and the model's free text.
    async fn detect(&self, input: &str) -> Result<(Vec<ToolCall>, String)> {
        match self.detection {
            DetectionMode::Model => {
                let reply = self
                    .model
                    .generate(self.history.messages(), Some(self.registry()))
                    .await?;
                if reply.has_tool_calls() {
                    debug!(calls = reply.tool_calls.len(), "Native tool calls");
                    return Ok((reply.tool_calls, reply.content));
                }
                let calls = extract_tool_calls(&reply.content).unwrap_or_default();
                Ok((calls, reply.content))
            }
            DetectionMode::Rules => {
                if let Some(call) = self.classifier.classify(input, &self.memory) {
                    return Ok((vec![call], String::new()));
                }
                let reply = self.model.generate(self.history.messages(), None).await?;
                Ok((Vec::new(), reply.content))
            }
        }
    }

    /// Asks the model to restate a tool result; falls back to the raw result.
    async fn rephrase(
        &self,
        question: &str,
        execution: &ToolExecution,
        raw: &str,
        previous_list: &str,
    ) -> String {
        let previous = (previous_list != raw).then_some(previous_list);
        let prompt = match self.prompts.rephrase_prompt(
            question,
            &execution.name,
            raw,
            previous,
            execution.output.is_error(),
        ) {
            Ok(prompt) => prompt,
            Err(err) => {
                warn!(error = %err, "Could not build re-phrase prompt");
                return raw.to_string();
            }
        };

        // transient: the prompt is never recorded in the history
        let messages = self.history.snapshot_with(ConversationMessage::user(prompt));
        match self.model.generate(&messages, None).await {
            Ok(reply) => with_fallback(sanitize(&reply.content), raw),
            Err(err) => {
                warn!(error = %err, "Re-phrasing failed, showing raw result");
                raw.to_string()
            }
        }
    }

    fn registry(&self) -> &'static ToolRegistry {
        self.dispatcher.registry()
    }
}
