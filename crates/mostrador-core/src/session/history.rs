//! Append-only conversation history with a retention cap.

use super::message::{ConversationMessage, MessageRole};

/// Default number of non-system messages kept in memory.
pub const DEFAULT_MAX_MESSAGES: usize = 40;

/// Ordered list of messages exchanged during one process lifetime.
///
/// Messages are only ever appended. System messages are pinned; once the
/// number of user/assistant messages exceeds `max_messages`, the oldest of
/// them are dropped.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    messages: Vec<ConversationMessage>,
    max_messages: usize,
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MESSAGES)
    }
}

impl ConversationHistory {
    pub fn new(max_messages: usize) -> Self {
        Self {
            messages: Vec::new(),
            max_messages: max_messages.max(1),
        }
    }

    /// Creates a history that starts with the given system prompt.
    pub fn with_system_prompt(prompt: impl Into<String>, max_messages: usize) -> Self {
        let mut history = Self::new(max_messages);
        history.messages.push(ConversationMessage::system(prompt));
        history
    }

    pub fn push(&mut self, message: ConversationMessage) {
        self.messages.push(message);
        self.enforce_retention();
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(ConversationMessage::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.push(ConversationMessage::assistant(content));
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ConversationMessage> {
        self.messages.last()
    }

    /// A copy of the messages followed by `extra`, for one-off prompts that
    /// must not be recorded.
    pub fn snapshot_with(&self, extra: ConversationMessage) -> Vec<ConversationMessage> {
        let mut messages = self.messages.clone();
        messages.push(extra);
        messages
    }

    fn enforce_retention(&mut self) {
        let conversational = self
            .messages
            .iter()
            .filter(|m| m.role != MessageRole::System)
            .count();
        let mut excess = conversational.saturating_sub(self.max_messages);
        if excess == 0 {
            return;
        }

        self.messages.retain(|m| {
            if excess > 0 && m.role != MessageRole::System {
                excess -= 1;
                false
            } else {
                true
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consecutive_assistant_messages_are_kept() {
        let mut history = ConversationHistory::default();
        history.push_user("remeras");
        history.push_assistant("• Remera → $15.00");
        history.push_assistant("Tenemos una remera a $15.");

        let roles: Vec<_> = history.messages().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![MessageRole::User, MessageRole::Assistant, MessageRole::Assistant]
        );
    }

    #[test]
    fn test_retention_drops_oldest_but_keeps_system_prompt() {
        let mut history = ConversationHistory::with_system_prompt("sos un vendedor", 3);
        for i in 0..5 {
            history.push_user(format!("mensaje {i}"));
        }

        assert_eq!(history.len(), 4);
        assert_eq!(history.messages()[0].role, MessageRole::System);
        assert_eq!(history.messages()[1].content, "mensaje 2");
        assert_eq!(history.last().unwrap().content, "mensaje 4");
    }

    #[test]
    fn test_snapshot_does_not_record() {
        let history = ConversationHistory::with_system_prompt("sys", 10);
        let snapshot = history.snapshot_with(ConversationMessage::user("transient"));
        assert_eq!(snapshot.len(), 2);
        assert_eq!(history.len(), 1);
    }
}
