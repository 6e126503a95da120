//! Short-lived context used to resolve elliptical follow-ups.

use serde::{Deserialize, Serialize};

/// What the assistant remembers about the last product search.
///
/// Written after every successful search. The term is read when a follow-up
/// only carries a refinement ("¿y lo más caro?"); the list is shown to the
/// model when the next answer is re-phrased. Cleared after a failed turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMemory {
    /// Subject of the last successful product search
    pub last_search_term: Option<String>,
    /// Rendered product list of that search
    pub last_product_list: String,
}

impl SessionMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remember_search(&mut self, term: impl Into<String>, product_list: impl Into<String>) {
        let term = term.into();
        self.last_search_term = if term.trim().is_empty() {
            None
        } else {
            Some(term)
        };
        self.last_product_list = product_list.into();
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remember_and_reset() {
        let mut memory = SessionMemory::new();
        memory.remember_search("jeans", "• Jeans → $60.00");
        assert_eq!(memory.last_search_term.as_deref(), Some("jeans"));

        memory.reset();
        assert_eq!(memory, SessionMemory::default());
    }

    #[test]
    fn test_blank_term_is_not_remembered() {
        let mut memory = SessionMemory::new();
        memory.remember_search("  ", "• Algo → $1.00");
        assert!(memory.last_search_term.is_none());
        assert!(!memory.last_product_list.is_empty());
    }
}
