//! Chat turns against the shared conversation

use super::{generate_response, ConversationHistory, ConversationSlot};
use crate::llm::{LanguageModel, ModelError};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

/// Reply for blank messages; the model is not consulted
pub const EMPTY_INPUT_REPLY: &str = "Please say something!";

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("generation failed: {0}")]
    Model(#[from] ModelError),
    #[error("generation task aborted: {0}")]
    Worker(String),
}

/// Runs turns of the single process-wide conversation.
///
/// Turns are serialized: the read-generate-replace sequence for one message
/// completes before the next message reads the history. A turn runs on its
/// own task, so dropping the caller's future does not abandon it.
pub struct ChatService {
    model: Arc<dyn LanguageModel>,
    slot: Arc<ConversationSlot>,
    turn: Arc<Mutex<()>>,
}

impl ChatService {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            model,
            slot: Arc::new(ConversationSlot::new()),
            turn: Arc::new(Mutex::new(())),
        }
    }

    /// Answer `message`, extending the shared conversation.
    ///
    /// Absent or blank messages get [`EMPTY_INPUT_REPLY`] and leave the
    /// history untouched. On error the history is also left untouched.
    pub async fn respond(&self, message: Option<&str>) -> Result<String, ChatError> {
        let utterance = message.map(str::trim).unwrap_or_default();
        if utterance.is_empty() {
            tracing::debug!("Blank message, skipping generation");
            return Ok(EMPTY_INPUT_REPLY.to_string());
        }

        let turn = run_turn(
            Arc::clone(&self.model),
            Arc::clone(&self.slot),
            Arc::clone(&self.turn),
            utterance.to_string(),
        );
        tokio::spawn(turn)
            .await
            .map_err(|e| ChatError::Worker(e.to_string()))?
    }

    /// Current conversation, if any turn has completed
    #[allow(dead_code)] // Inspected by tests
    pub fn history(&self) -> Option<ConversationHistory> {
        self.slot.read()
    }
}

async fn run_turn(
    model: Arc<dyn LanguageModel>,
    slot: Arc<ConversationSlot>,
    turn: Arc<Mutex<()>>,
    utterance: String,
) -> Result<String, ChatError> {
    let _turn = turn.lock_owned().await;
    let prior = slot.read();
    let prior_len = prior.as_ref().map_or(0, ConversationHistory::len);

    let reply = tokio::task::spawn_blocking(move || {
        generate_response(model.as_ref(), &utterance, prior.as_ref())
    })
    .await
    .map_err(|e| ChatError::Worker(e.to_string()))??;

    tracing::info!(
        prior_tokens = prior_len,
        input_tokens = reply.input_len,
        history_tokens = reply.history.len(),
        reply_chars = reply.text.chars().count(),
        "Chat turn completed"
    );

    slot.replace(reply.history);
    Ok(reply.text)
}
