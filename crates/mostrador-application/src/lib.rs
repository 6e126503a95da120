//! Application layer for Mostrador.
//!
//! Coordinates the catalog, the tool dispatcher and the chat model into the
//! per-turn conversation loop.

pub mod chat_session;
pub mod prompts;

pub use chat_session::{ChatSession, SessionOptions, TurnOutcome};
pub use prompts::PromptBuilder;
