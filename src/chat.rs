//! Multi-turn conversation on top of a [`LanguageModel`](crate::llm::LanguageModel)
//!
//! The whole conversation lives in one token sequence. Each turn feeds the
//! previous sequence plus the new utterance to the model and keeps the full
//! output as the next turn's history.

mod generator;
mod history;
mod service;

#[cfg(test)]
mod proptests;
#[cfg(test)]
pub mod testing;

pub use generator::generate_response;
pub use history::{ConversationHistory, ConversationSlot};
#[allow(unused_imports)] // Public API re-exports
pub use service::{ChatError, ChatService, EMPTY_INPUT_REPLY};
