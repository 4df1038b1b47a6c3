//! Text generation backend
//!
//! The chat core only sees [`LanguageModel`]; the GPT-2 implementation,
//! tokenizer, and file resolution live behind it.

mod dialogpt;
mod error;
mod gpt2;
mod loader;
mod tokenizer;
mod types;

pub use dialogpt::DialoGpt;
#[allow(unused_imports)] // Public API re-exports
pub use error::{ModelError, ModelErrorKind};
pub use loader::ModelSource;
pub use types::*;

use std::sync::Arc;

/// Narrow interface over a pretrained causal language model
pub trait LanguageModel: Send + Sync {
    /// Encode text into token ids, without special tokens
    fn encode(&self, text: &str) -> Result<Vec<TokenId>, ModelError>;

    /// Decode token ids into text, dropping special tokens
    fn decode(&self, tokens: &[TokenId]) -> Result<String, ModelError>;

    /// Continue `input` under `config`.
    ///
    /// Returns the full sequence: `input` followed by the generated tokens.
    fn generate(
        &self,
        input: &[TokenId],
        config: &SamplingConfig,
    ) -> Result<Vec<TokenId>, ModelError>;

    /// End-of-utterance marker token
    fn eos_token_id(&self) -> TokenId;

    /// Identifier for logs
    fn model_id(&self) -> &str;
}

/// Logging wrapper for language models
pub struct LoggingModel {
    inner: Arc<dyn LanguageModel>,
    model_id: String,
}

impl LoggingModel {
    pub fn new(inner: Arc<dyn LanguageModel>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

impl LanguageModel for LoggingModel {
    fn encode(&self, text: &str) -> Result<Vec<TokenId>, ModelError> {
        self.inner.encode(text)
    }

    fn decode(&self, tokens: &[TokenId]) -> Result<String, ModelError> {
        self.inner.decode(tokens)
    }

    fn generate(
        &self,
        input: &[TokenId],
        config: &SamplingConfig,
    ) -> Result<Vec<TokenId>, ModelError> {
        let start = std::time::Instant::now();
        let result = self.inner.generate(input, config);
        let duration = start.elapsed();

        match &result {
            Ok(output) => {
                tracing::info!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    input_tokens = input.len(),
                    output_tokens = output.len().saturating_sub(input.len()),
                    "Generation completed"
                );
                if output.len() >= config.max_length {
                    tracing::warn!(
                        model = %self.model_id,
                        total_tokens = output.len(),
                        max_length = config.max_length,
                        "Conversation reached the length cap"
                    );
                }
            }
            Err(e) => {
                tracing::error!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    input_tokens = input.len(),
                    error = %e.message,
                    kind = ?e.kind,
                    "Generation failed"
                );
            }
        }

        result
    }

    fn eos_token_id(&self) -> TokenId {
        self.inner.eos_token_id()
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
