//! Common types for text generation

/// Token identifier in the tokenizer's vocabulary
pub type TokenId = u32;

/// Decoding policy handed to [`super::LanguageModel::generate`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingConfig {
    /// Cap on the total sequence length (input + generated)
    pub max_length: usize,
    /// Token appended when generation stops short; also the stop token
    pub pad_token_id: TokenId,
    /// Sample stochastically; `false` means greedy argmax
    pub do_sample: bool,
    pub top_k: usize,
    pub top_p: f64,
    pub temperature: f64,
}

impl SamplingConfig {
    pub const MAX_LENGTH: usize = 500;
    pub const TOP_K: usize = 50;
    pub const TOP_P: f64 = 0.95;
    pub const TEMPERATURE: f64 = 0.7;

    /// The chat decoding policy: top-k 50, nucleus 0.95, temperature 0.7,
    /// capped at 500 total tokens.
    pub fn chat(eos_token_id: TokenId) -> Self {
        Self {
            max_length: Self::MAX_LENGTH,
            pad_token_id: eos_token_id,
            do_sample: true,
            top_k: Self::TOP_K,
            top_p: Self::TOP_P,
            temperature: Self::TEMPERATURE,
        }
    }

    /// Number of tokens that may still be generated after `input_len`.
    pub fn remaining(&self, input_len: usize) -> usize {
        self.max_length.saturating_sub(input_len)
    }
}
