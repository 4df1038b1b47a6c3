//! DialoGPT: GPT-2 weights plus byte-level BPE tokenizer behind [`LanguageModel`]

use super::gpt2::{Gpt2, Gpt2Config};
use super::loader::{ModelFiles, ModelSource, WeightsFile};
use super::tokenizer::ChatTokenizer;
use super::{LanguageModel, ModelError, SamplingConfig, TokenId};
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::generation::{LogitsProcessor, Sampling};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Mutex, PoisonError};

pub struct DialoGpt {
    model: Gpt2,
    tokenizer: ChatTokenizer,
    eos_token_id: TokenId,
    model_id: String,
    /// Hands out one sampling seed per generation call
    seeds: Mutex<StdRng>,
}

impl DialoGpt {
    /// Resolve, download if needed, and load the model. Any failure here is fatal.
    pub fn load(source: &ModelSource, seed: Option<u64>) -> Result<Self, ModelError> {
        let files = ModelFiles::resolve(source)?;
        Self::from_files(&files, source.id(), seed)
    }

    pub fn from_files(
        files: &ModelFiles,
        model_id: String,
        seed: Option<u64>,
    ) -> Result<Self, ModelError> {
        let config_text = std::fs::read_to_string(&files.config).map_err(|e| {
            ModelError::load(format!("Failed to read {}: {e}", files.config.display()))
        })?;
        let config: Gpt2Config = serde_json::from_str(&config_text)
            .map_err(|e| ModelError::load(format!("Invalid model config: {e}")))?;

        let tokenizer = ChatTokenizer::load(&files.tokenizer)?;
        if tokenizer.vocab_size() > config.vocab_size {
            return Err(ModelError::load(format!(
                "Tokenizer vocabulary ({}) is larger than the model's ({})",
                tokenizer.vocab_size(),
                config.vocab_size
            )));
        }

        let device = Device::Cpu;
        let vb = match &files.weights {
            // SAFETY: the checkpoint is not modified while the process runs.
            WeightsFile::Safetensors(path) => unsafe {
                VarBuilder::from_mmaped_safetensors(&[path], DType::F32, &device)
            },
            WeightsFile::Pytorch(path) => VarBuilder::from_pth(path, DType::F32, &device),
        }
        .map_err(|e| ModelError::load(format!("Failed to open weights: {e}")))?;

        let model = Gpt2::load(config, vb)
            .map_err(|e| ModelError::load(format!("Failed to load weights: {e}")))?;

        tracing::info!(
            model = %model_id,
            layers = model.config().n_layer,
            hidden = model.config().n_embd,
            vocab = model.config().vocab_size,
            "Model loaded"
        );

        Ok(Self::from_parts(model, tokenizer, model_id, seed))
    }

    pub(crate) fn from_parts(
        model: Gpt2,
        tokenizer: ChatTokenizer,
        model_id: String,
        seed: Option<u64>,
    ) -> Self {
        let eos_token_id = model
            .config()
            .eos_token_id
            .unwrap_or_else(|| tokenizer.eos_token_id());
        let seeds = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            model,
            tokenizer,
            eos_token_id,
            model_id,
            seeds: Mutex::new(seeds),
        }
    }

    fn next_seed(&self) -> u64 {
        self.seeds
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .gen()
    }

    fn validate(&self, input: &[TokenId]) -> Result<(), ModelError> {
        if input.is_empty() {
            return Err(ModelError::invalid_input("Cannot generate from an empty sequence"));
        }
        let vocab_size = self.model.config().vocab_size;
        if let Some(bad) = input.iter().find(|&&t| t as usize >= vocab_size) {
            return Err(ModelError::invalid_input(format!(
                "Token {bad} is outside the vocabulary of {vocab_size}"
            )));
        }
        Ok(())
    }
}

fn sampling(config: &SamplingConfig) -> Sampling {
    if config.do_sample {
        Sampling::All {
            temperature: config.temperature,
        }
    } else {
        Sampling::ArgMax
    }
}

/// Draw the next token: temperature-scaled softmax, then top-k, then top-p
/// over the renormalized top-k mass.
fn sample_token(
    processor: &mut LogitsProcessor,
    logits: &Tensor,
    config: &SamplingConfig,
) -> candle_core::Result<TokenId> {
    processor.sample_f(logits, |probs| {
        restrict_to_nucleus(probs, config.top_k, config.top_p);
    })
}

/// Zero every probability outside the `top_k` most likely tokens, then outside
/// the smallest prefix of those whose share of the kept mass reaches `top_p`.
/// At least one token always survives. `top_k == 0` disables the top-k cut.
fn restrict_to_nucleus(probs: &mut [f32], top_k: usize, top_p: f64) {
    if probs.is_empty() {
        return;
    }
    let by_prob_desc = |a: &usize, b: &usize| probs[*b].total_cmp(&probs[*a]);

    let mut order: Vec<usize> = (0..probs.len()).collect();
    let k = if top_k == 0 { order.len() } else { top_k.min(order.len()) };
    if k < order.len() {
        order.select_nth_unstable_by(k - 1, by_prob_desc);
    }
    order[..k].sort_unstable_by(by_prob_desc);

    let kept_mass: f64 = order[..k].iter().map(|&i| f64::from(probs[i])).sum();
    let threshold = top_p * kept_mass;
    let mut cumulative = 0.0;
    let mut keep = k;
    for (n, &i) in order[..k].iter().enumerate() {
        cumulative += f64::from(probs[i]);
        if cumulative >= threshold {
            keep = n + 1;
            break;
        }
    }

    for &i in &order[keep..] {
        probs[i] = 0.0;
    }
}

impl LanguageModel for DialoGpt {
    fn encode(&self, text: &str) -> Result<Vec<TokenId>, ModelError> {
        self.tokenizer.encode(text)
    }

    fn decode(&self, tokens: &[TokenId]) -> Result<String, ModelError> {
        self.tokenizer.decode(tokens)
    }

    fn generate(
        &self,
        input: &[TokenId],
        config: &SamplingConfig,
    ) -> Result<Vec<TokenId>, ModelError> {
        self.validate(input)?;

        let mut output = input.to_vec();
        if config.remaining(input.len()) == 0 {
            tracing::debug!(
                input_tokens = input.len(),
                max_length = config.max_length,
                "Input already at length cap, nothing generated"
            );
            return Ok(output);
        }

        let mut logits_processor = LogitsProcessor::from_sampling(self.next_seed(), sampling(config));
        let mut cache = self.model.new_cache();
        let mut logits = self.model.forward(input, &mut cache)?;
        loop {
            let token = sample_token(&mut logits_processor, &logits, config)?;
            output.push(token);
            if token == self.eos_token_id
                || token == config.pad_token_id
                || output.len() >= config.max_length
            {
                break;
            }
            logits = self.model.forward(&[token], &mut cache)?;
        }

        Ok(output)
    }

    fn eos_token_id(&self) -> TokenId {
        self.eos_token_id
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
