//! Token-level conversation history and the process-wide slot that holds it

use crate::llm::TokenId;
use std::sync::{Mutex, PoisonError};

/// Every utterance exchanged so far, each terminated by EOS.
///
/// Only ever grows: each turn appends the user's encoded utterance and the
/// generated reply to the previous value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationHistory(Vec<TokenId>);

impl ConversationHistory {
    pub fn new(tokens: Vec<TokenId>) -> Self {
        Self(tokens)
    }

    pub fn tokens(&self) -> &[TokenId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if `self` is `earlier` extended by zero or more tokens
    pub fn extends(&self, earlier: &ConversationHistory) -> bool {
        self.0.starts_with(&earlier.0)
    }
}

impl From<Vec<TokenId>> for ConversationHistory {
    fn from(tokens: Vec<TokenId>) -> Self {
        Self(tokens)
    }
}

/// Holds the single ongoing conversation, or nothing before the first turn.
///
/// There is one slot per process and no per-caller isolation: every client
/// talks into the same conversation.
#[derive(Debug, Default)]
pub struct ConversationSlot {
    history: Mutex<Option<ConversationHistory>>,
}

impl ConversationSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self) -> Option<ConversationHistory> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn replace(&self, history: ConversationHistory) {
        *self.history.lock().unwrap_or_else(PoisonError::into_inner) = Some(history);
    }
}
