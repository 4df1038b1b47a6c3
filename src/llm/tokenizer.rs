//! Byte-level BPE tokenizer for GPT-2 family models

use super::loader::TokenizerFiles;
use super::{ModelError, TokenId};
use tokenizers::models::bpe::BPE;
use tokenizers::pre_tokenizers::byte_level::ByteLevel;
use tokenizers::{AddedToken, Tokenizer};

/// GPT-2 end-of-text marker, used by DialoGPT to separate turns
pub const EOS_TOKEN: &str = "<|endoftext|>";

pub struct ChatTokenizer {
    inner: Tokenizer,
    eos_token_id: TokenId,
}

impl ChatTokenizer {
    pub fn load(files: &TokenizerFiles) -> Result<Self, ModelError> {
        let inner = match files {
            TokenizerFiles::Json(path) => Tokenizer::from_file(path).map_err(|e| {
                ModelError::load(format!("Failed to read {}: {e}", path.display()))
            })?,
            TokenizerFiles::VocabMerges { vocab, merges } => {
                let bpe = BPE::from_file(&vocab.to_string_lossy(), &merges.to_string_lossy())
                    .build()
                    .map_err(|e| ModelError::load(format!("Failed to build BPE model: {e}")))?;
                let mut tokenizer = Tokenizer::new(bpe);
                tokenizer.with_pre_tokenizer(Some(ByteLevel::new(false, true, true)));
                tokenizer.with_decoder(Some(ByteLevel::default()));
                tokenizer.add_special_tokens(&[AddedToken::from(EOS_TOKEN, true)]);
                tokenizer
            }
        };

        let eos_token_id = inner
            .token_to_id(EOS_TOKEN)
            .ok_or_else(|| ModelError::load(format!("Tokenizer has no {EOS_TOKEN} token")))?;

        Ok(Self {
            inner,
            eos_token_id,
        })
    }

    pub fn eos_token_id(&self) -> TokenId {
        self.eos_token_id
    }

    pub fn vocab_size(&self) -> usize {
        self.inner.get_vocab_size(true)
    }

    pub fn encode(&self, text: &str) -> Result<Vec<TokenId>, ModelError> {
        let encoding = self.inner.encode(text, false)?;
        Ok(encoding.get_ids().to_vec())
    }

    /// Decode with special tokens stripped.
    pub fn decode(&self, tokens: &[TokenId]) -> Result<String, ModelError> {
        Ok(self.inner.decode(tokens, true)?)
    }
}
