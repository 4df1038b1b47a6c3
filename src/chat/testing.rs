//! Mock language model for testing
//!
//! Tokens are bytes shifted by one so that 0 is free to act as EOS.

use crate::llm::{LanguageModel, ModelError, SamplingConfig, TokenId};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

const MOCK_EOS: TokenId = 0;
const DEFAULT_REPLY: &str = "ok";

/// Mock model that answers with queued replies and records every call
pub struct MockModel {
    replies: Mutex<VecDeque<Result<String, ModelError>>>,
    inputs: Mutex<Vec<Vec<TokenId>>>,
    outputs: Mutex<Vec<Vec<TokenId>>>,
    configs: Mutex<Vec<SamplingConfig>>,
    delay: Option<Duration>,
}

#[allow(dead_code)]
impl MockModel {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            inputs: Mutex::new(Vec::new()),
            outputs: Mutex::new(Vec::new()),
            configs: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// Queue a reply; once the queue is empty every call answers "ok"
    pub fn with_reply(self, text: impl Into<String>) -> Self {
        self.replies.lock().unwrap().push_back(Ok(text.into()));
        self
    }

    /// Block for `delay` inside every `generate` call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn queue_error(&self, error: ModelError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    /// Encoded utterance followed by EOS, as the chat core builds it
    pub fn encode_turn(&self, text: &str) -> Vec<TokenId> {
        let mut tokens = self.encode(text).unwrap();
        tokens.push(MOCK_EOS);
        tokens
    }

    pub fn recorded_inputs(&self) -> Vec<Vec<TokenId>> {
        self.inputs.lock().unwrap().clone()
    }

    pub fn recorded_outputs(&self) -> Vec<Vec<TokenId>> {
        self.outputs.lock().unwrap().clone()
    }

    pub fn recorded_configs(&self) -> Vec<SamplingConfig> {
        self.configs.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.inputs.lock().unwrap().len()
    }
}

impl Default for MockModel {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageModel for MockModel {
    fn encode(&self, text: &str) -> Result<Vec<TokenId>, ModelError> {
        Ok(text.bytes().map(|b| TokenId::from(b) + 1).collect())
    }

    fn decode(&self, tokens: &[TokenId]) -> Result<String, ModelError> {
        let bytes = tokens
            .iter()
            .filter(|&&t| t != MOCK_EOS)
            .map(|&t| {
                u8::try_from(t - 1)
                    .map_err(|_| ModelError::invalid_input(format!("Unknown token {t}")))
            })
            .collect::<Result<Vec<u8>, _>>()?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn generate(
        &self,
        input: &[TokenId],
        config: &SamplingConfig,
    ) -> Result<Vec<TokenId>, ModelError> {
        self.inputs.lock().unwrap().push(input.to_vec());
        self.configs.lock().unwrap().push(*config);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }

        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(DEFAULT_REPLY.to_string()))?;

        if let Some(bad) = input.iter().find(|&&t| t > 256) {
            return Err(ModelError::invalid_input(format!("Unknown token {bad}")));
        }

        let mut output = input.to_vec();
        let generated = self.encode_turn(&reply);
        let room = config.remaining(input.len());
        output.extend(generated.into_iter().take(room));

        self.outputs.lock().unwrap().push(output.clone());
        Ok(output)
    }

    fn eos_token_id(&self) -> TokenId {
        MOCK_EOS
    }

    fn model_id(&self) -> &str {
        "mock"
    }
}
