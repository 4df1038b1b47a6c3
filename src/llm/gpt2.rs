//! GPT-2 decoder stack on candle
//!
//! Loads the `GPT2LMHeadModel` checkpoint layout used by DialoGPT. Conv1D
//! projections store their weights as `[in, out]`, so they are transposed
//! into `Linear` layers at load time. The LM head is tied to the token
//! embedding.

use candle_core::{DType, Device, IndexOp, Module, Result, Tensor};
use candle_nn::{embedding, layer_norm, Embedding, LayerNorm, Linear, VarBuilder};
use serde::Deserialize;

/// Subset of the Hugging Face `config.json` needed for inference
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Gpt2Config {
    pub vocab_size: usize,
    pub n_positions: usize,
    pub n_embd: usize,
    pub n_layer: usize,
    pub n_head: usize,
    #[serde(default = "default_layer_norm_epsilon")]
    pub layer_norm_epsilon: f64,
    #[serde(default)]
    pub eos_token_id: Option<u32>,
}

fn default_layer_norm_epsilon() -> f64 {
    1e-5
}

impl Gpt2Config {
    pub fn head_dim(&self) -> usize {
        self.n_embd / self.n_head
    }
}

/// Per-layer key/value tensors for one generation call
pub struct KvCache {
    layers: Vec<Option<(Tensor, Tensor)>>,
}

impl KvCache {
    pub fn new(n_layer: usize) -> Self {
        Self {
            layers: vec![None; n_layer],
        }
    }

    /// Number of positions already cached
    pub fn seq_len(&self) -> usize {
        self.layers
            .first()
            .and_then(Option::as_ref)
            .map_or(0, |(k, _)| k.dims()[2])
    }
}

fn conv1d(n_in: usize, n_out: usize, vb: VarBuilder) -> Result<Linear> {
    let weight = vb.get((n_in, n_out), "weight")?.t()?.contiguous()?;
    let bias = vb.get(n_out, "bias")?;
    Ok(Linear::new(weight, Some(bias)))
}

struct Attention {
    c_attn: Linear,
    c_proj: Linear,
    n_head: usize,
    head_dim: usize,
}

impl Attention {
    fn load(config: &Gpt2Config, vb: VarBuilder) -> Result<Self> {
        let n_embd = config.n_embd;
        Ok(Self {
            c_attn: conv1d(n_embd, 3 * n_embd, vb.pp("c_attn"))?,
            c_proj: conv1d(n_embd, n_embd, vb.pp("c_proj"))?,
            n_head: config.n_head,
            head_dim: config.head_dim(),
        })
    }

    fn forward(
        &self,
        x: &Tensor,
        mask: Option<&Tensor>,
        cache: &mut Option<(Tensor, Tensor)>,
    ) -> Result<Tensor> {
        let (b, t, c) = x.dims3()?;
        let qkv = self.c_attn.forward(x)?;

        let split = |i: usize| -> Result<Tensor> {
            qkv.narrow(2, i * c, c)?
                .reshape((b, t, self.n_head, self.head_dim))?
                .transpose(1, 2)?
                .contiguous()
        };
        let q = split(0)?;
        let mut k = split(1)?;
        let mut v = split(2)?;

        if let Some((prev_k, prev_v)) = cache.as_ref() {
            k = Tensor::cat(&[prev_k, &k], 2)?;
            v = Tensor::cat(&[prev_v, &v], 2)?;
        }
        *cache = Some((k.clone(), v.clone()));

        #[allow(clippy::cast_precision_loss)]
        let scale = 1.0 / (self.head_dim as f64).sqrt();
        let mut att = (q.matmul(&k.t()?)? * scale)?;
        if let Some(mask) = mask {
            att = att.broadcast_add(mask)?;
        }
        let att = candle_nn::ops::softmax_last_dim(&att)?;

        let y = att
            .matmul(&v)?
            .transpose(1, 2)?
            .reshape((b, t, c))?;
        self.c_proj.forward(&y)
    }
}

struct Mlp {
    c_fc: Linear,
    c_proj: Linear,
}

impl Mlp {
    fn load(config: &Gpt2Config, vb: VarBuilder) -> Result<Self> {
        let n_embd = config.n_embd;
        Ok(Self {
            c_fc: conv1d(n_embd, 4 * n_embd, vb.pp("c_fc"))?,
            c_proj: conv1d(4 * n_embd, n_embd, vb.pp("c_proj"))?,
        })
    }

    fn forward(&self, x: &Tensor) -> Result<Tensor> {
        // GPT-2 uses the tanh approximation ("gelu_new")
        self.c_proj.forward(&self.c_fc.forward(x)?.gelu()?)
    }
}

struct Block {
    ln_1: LayerNorm,
    attn: Attention,
    ln_2: LayerNorm,
    mlp: Mlp,
}

impl Block {
    fn load(config: &Gpt2Config, vb: VarBuilder) -> Result<Self> {
        let eps = config.layer_norm_epsilon;
        Ok(Self {
            ln_1: layer_norm(config.n_embd, eps, vb.pp("ln_1"))?,
            attn: Attention::load(config, vb.pp("attn"))?,
            ln_2: layer_norm(config.n_embd, eps, vb.pp("ln_2"))?,
            mlp: Mlp::load(config, vb.pp("mlp"))?,
        })
    }

    fn forward(
        &self,
        x: &Tensor,
        mask: Option<&Tensor>,
        cache: &mut Option<(Tensor, Tensor)>,
    ) -> Result<Tensor> {
        let x = (x + self.attn.forward(&self.ln_1.forward(x)?, mask, cache)?)?;
        &x + self.mlp.forward(&self.ln_2.forward(&x)?)?
    }
}

pub struct Gpt2 {
    wte: Embedding,
    wpe: Embedding,
    blocks: Vec<Block>,
    ln_f: LayerNorm,
    lm_head: Linear,
    config: Gpt2Config,
    device: Device,
}

impl Gpt2 {
    pub fn load(config: Gpt2Config, vb: VarBuilder) -> Result<Self> {
        // Some checkpoints nest everything under `transformer.`, older ones don't
        let vb = if vb.contains_tensor("transformer.wte.weight") {
            vb.pp("transformer")
        } else {
            vb
        };

        let wte = embedding(config.vocab_size, config.n_embd, vb.pp("wte"))?;
        let wpe = embedding(config.n_positions, config.n_embd, vb.pp("wpe"))?;
        let blocks = (0..config.n_layer)
            .map(|i| Block::load(&config, vb.pp(format!("h.{i}"))))
            .collect::<Result<Vec<_>>>()?;
        let ln_f = layer_norm(config.n_embd, config.layer_norm_epsilon, vb.pp("ln_f"))?;
        let lm_head = Linear::new(wte.embeddings().clone(), None);

        Ok(Self {
            wte,
            wpe,
            blocks,
            ln_f,
            lm_head,
            device: vb.device().clone(),
            config,
        })
    }

    pub fn config(&self) -> &Gpt2Config {
        &self.config
    }

    pub fn new_cache(&self) -> KvCache {
        KvCache::new(self.config.n_layer)
    }

    /// Run `tokens` through the model, appending them to `cache`.
    ///
    /// Returns next-token logits for the last position, shape `[vocab]`.
    pub fn forward(&self, tokens: &[u32], cache: &mut KvCache) -> Result<Tensor> {
        let t = tokens.len();
        let offset = cache.seq_len();
        if t == 0 {
            candle_core::bail!("empty input");
        }
        if offset + t > self.config.n_positions {
            candle_core::bail!(
                "sequence length {} exceeds the model's {} positions",
                offset + t,
                self.config.n_positions
            );
        }

        let ids = Tensor::new(tokens, &self.device)?.unsqueeze(0)?;
        #[allow(clippy::cast_possible_truncation)]
        let positions = Tensor::arange(offset as u32, (offset + t) as u32, &self.device)?
            .unsqueeze(0)?;
        let mut x = self.wte.forward(&ids)?.broadcast_add(&self.wpe.forward(&positions)?)?;

        let mask = if t > 1 {
            Some(causal_mask(t, offset, &self.device)?)
        } else {
            None
        };
        for (block, layer_cache) in self.blocks.iter().zip(cache.layers.iter_mut()) {
            x = block.forward(&x, mask.as_ref(), layer_cache)?;
        }

        let last = self.ln_f.forward(&x)?.i((.., t - 1, ..))?;
        self.lm_head
            .forward(&last)?
            .squeeze(0)?
            .to_dtype(DType::F32)
    }
}

/// Additive mask letting query `i` see keys `0..=offset + i`.
fn causal_mask(t: usize, offset: usize, device: &Device) -> Result<Tensor> {
    let width = offset + t;
    let mask: Vec<f32> = (0..t)
        .flat_map(|i| {
            (0..width).map(move |j| if j > offset + i { f32::NEG_INFINITY } else { 0.0 })
        })
        .collect();
    Tensor::from_vec(mask, (t, width), device)?.reshape((1, 1, t, width))
}
