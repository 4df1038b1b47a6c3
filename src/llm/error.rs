//! Language model error types

use thiserror::Error;

/// Model error with classification
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ModelError {
    pub kind: ModelErrorKind,
    pub message: String,
}

impl ModelError {
    pub fn new(kind: ModelErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn load(message: impl Into<String>) -> Self {
        Self::new(ModelErrorKind::Load, message)
    }

    pub fn tokenizer(message: impl Into<String>) -> Self {
        Self::new(ModelErrorKind::Tokenizer, message)
    }

    pub fn inference(message: impl Into<String>) -> Self {
        Self::new(ModelErrorKind::Inference, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ModelErrorKind::InvalidInput, message)
    }
}

/// Where in the pipeline an error originated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelErrorKind {
    /// Weights, config, or tokenizer files missing or unreadable - fatal at startup
    Load,
    /// Encoding or decoding text failed
    Tokenizer,
    /// Tensor computation failed during a forward pass or sampling
    Inference,
    /// Token ids outside the vocabulary or otherwise unusable as model input
    InvalidInput,
}

impl ModelErrorKind {
    /// Load errors only happen at startup; everything else fails a single request.
    pub fn is_fatal(self) -> bool {
        matches!(self, Self::Load)
    }
}

impl From<candle_core::Error> for ModelError {
    fn from(err: candle_core::Error) -> Self {
        Self::inference(err.to_string())
    }
}

impl From<tokenizers::Error> for ModelError {
    fn from(err: tokenizers::Error) -> Self {
        Self::tokenizer(err.to_string())
    }
}
