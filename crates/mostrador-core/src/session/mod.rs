//! Session domain module.
//!
//! # Module Structure
//!
//! - `message`: conversation message types (`MessageRole`, `ConversationMessage`)
//! - `history`: append-only history with retention (`ConversationHistory`)
//! - `memory`: last-search context for follow-ups (`SessionMemory`)

mod history;
mod memory;
mod message;

pub use history::{ConversationHistory, DEFAULT_MAX_MESSAGES};
pub use memory::SessionMemory;
pub use message::{ConversationMessage, MessageRole};
