//! Locating model files on disk or in the Hugging Face cache

use super::ModelError;
use hf_hub::api::sync::Api;
use hf_hub::{Repo, RepoType};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.json";
const TOKENIZER_FILE: &str = "tokenizer.json";
const VOCAB_FILE: &str = "vocab.json";
const MERGES_FILE: &str = "merges.txt";
const SAFETENSORS_FILE: &str = "model.safetensors";
const PYTORCH_FILE: &str = "pytorch_model.bin";

/// Where the pretrained model comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// Download (or reuse the local cache of) a Hugging Face model repo
    Hub { repo: String, revision: String },
    /// Directory that already holds the model files
    Local(PathBuf),
}

impl ModelSource {
    /// Human-readable identifier used in logs
    pub fn id(&self) -> String {
        match self {
            Self::Hub { repo, revision } if revision == "main" => repo.clone(),
            Self::Hub { repo, revision } => format!("{repo}@{revision}"),
            Self::Local(dir) => dir.display().to_string(),
        }
    }
}

/// Tokenizer definition files
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenizerFiles {
    /// Serialized `tokenizers` pipeline
    Json(PathBuf),
    /// Raw byte-level BPE vocabulary and merge rules
    VocabMerges { vocab: PathBuf, merges: PathBuf },
}

/// Weight checkpoint, in whichever format the repo ships
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeightsFile {
    Safetensors(PathBuf),
    Pytorch(PathBuf),
}

/// Resolved paths to everything needed to build the model
#[derive(Debug, Clone)]
pub struct ModelFiles {
    pub config: PathBuf,
    pub tokenizer: TokenizerFiles,
    pub weights: WeightsFile,
}

impl ModelFiles {
    /// Resolve files for `source`, downloading from the hub if needed.
    pub fn resolve(source: &ModelSource) -> Result<Self, ModelError> {
        match source {
            ModelSource::Local(dir) => Self::from_dir(dir),
            ModelSource::Hub { repo, revision } => {
                let api = Api::new()
                    .map_err(|e| ModelError::load(format!("Failed to create hub client: {e}")))?;
                let repo = api.repo(Repo::with_revision(
                    repo.clone(),
                    RepoType::Model,
                    revision.clone(),
                ));
                Self::locate_fetched(|name| repo.get(name))
            }
        }
    }

    /// Resolve files from a local directory.
    pub fn from_dir(dir: &Path) -> Result<Self, ModelError> {
        if !dir.is_dir() {
            return Err(ModelError::load(format!(
                "Model directory {} does not exist",
                dir.display()
            )));
        }
        Self::locate(|name| {
            let path = dir.join(name);
            path.is_file().then_some(path)
        })
    }

    /// [`Self::locate`] over a fallible fetch. A missing required file reports
    /// the last fetch error, so network and auth failures are not hidden.
    fn locate_fetched<E: std::fmt::Display>(
        mut fetch: impl FnMut(&str) -> Result<PathBuf, E>,
    ) -> Result<Self, ModelError> {
        let mut last_error = None;
        let located = Self::locate(|name| match fetch(name) {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::debug!(file = name, error = %e, "File not available from hub");
                last_error = Some(e.to_string());
                None
            }
        });
        located.map_err(|e| match last_error {
            Some(cause) => ModelError::load(format!("{} ({cause})", e.message)),
            None => e,
        })
    }

    /// Pick files by name, preferring `tokenizer.json` and safetensors.
    fn locate(mut fetch: impl FnMut(&str) -> Option<PathBuf>) -> Result<Self, ModelError> {
        let config = fetch(CONFIG_FILE)
            .ok_or_else(|| ModelError::load(format!("Missing {CONFIG_FILE}")))?;

        let tokenizer = match fetch(TOKENIZER_FILE) {
            Some(path) => TokenizerFiles::Json(path),
            None => match (fetch(VOCAB_FILE), fetch(MERGES_FILE)) {
                (Some(vocab), Some(merges)) => TokenizerFiles::VocabMerges { vocab, merges },
                _ => {
                    return Err(ModelError::load(format!(
                        "Missing tokenizer: need {TOKENIZER_FILE} or {VOCAB_FILE} + {MERGES_FILE}"
                    )))
                }
            },
        };

        let weights = if let Some(path) = fetch(SAFETENSORS_FILE) {
            WeightsFile::Safetensors(path)
        } else if let Some(path) = fetch(PYTORCH_FILE) {
            WeightsFile::Pytorch(path)
        } else {
            return Err(ModelError::load(format!(
                "Missing weights: need {SAFETENSORS_FILE} or {PYTORCH_FILE}"
            )));
        };

        Ok(Self {
            config,
            tokenizer,
            weights,
        })
    }
}
