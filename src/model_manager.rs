use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex, OnceLock},
};

use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config, DTYPE};
use serde::Deserialize;
use tokenizers::{
    PaddingParams,
    PaddingStrategy,
    Tokenizer,
    TruncationParams,
};

use crate::{
    embedding::{Embedder, EmbeddingVector},
    error::{Error, Result},
};

pub const DEFAULT_MODEL_ID: &str = "sentence-transformers/all-MiniLM-L6-v2";
pub const MODEL_ENV_VAR: &str = "PASSAGEIQ_MODEL";

/// Sequence length used when the model does not declare one.
pub const DEFAULT_MAX_SEQ_LENGTH: usize = 256;

/// Select the best available compute device.
///
/// Uses CUDA when compiled with the `cuda` feature, Metal when compiled with
/// the `metal` feature, and falls back to CPU otherwise.
fn default_device() -> Device {
    #[cfg(feature = "cuda")]
    {
        if let Ok(device) = Device::new_cuda(0) {
            return device;
        }
    }

    #[cfg(feature = "metal")]
    {
        if let Ok(device) = Device::new_metal(0) {
            return device;
        }
    }

    Device::Cpu
}

#[derive(Debug, Deserialize)]
struct SentenceBertConfig {
    max_seq_length: Option<usize>,
}

/// Read `max_seq_length` from a model directory's `sentence_bert_config.json`.
fn load_max_seq_length(model_dir: &Path) -> Option<usize> {
    let config_path = model_dir.join("sentence_bert_config.json");
    let contents = std::fs::read_to_string(config_path).ok()?;
    let config: SentenceBertConfig = serde_json::from_str(&contents).ok()?;
    config.max_seq_length.filter(|&len| len > 0)
}

/// Resolve the maximum tokenized length for a model.
///
/// Local model directories may declare it in `sentence_bert_config.json`;
/// remote model IDs use [`DEFAULT_MAX_SEQ_LENGTH`].
pub fn resolve_max_seq_length(model_id: &str) -> usize {
    let model_path = Path::new(model_id);
    if model_path.is_dir()
        && let Some(len) = load_max_seq_length(model_path)
    {
        return len;
    }
    DEFAULT_MAX_SEQ_LENGTH
}

/// Paths to the files needed to run a sentence embedding model.
struct ModelFiles {
    config: PathBuf,
    tokenizer: PathBuf,
    weights: PathBuf,
}

impl ModelFiles {
    /// Locate model files in a local directory or fetch them from the
    /// Hugging Face Hub.
    fn resolve(model_id: &str) -> Result<Self> {
        let model_path = Path::new(model_id);
        if model_path.is_dir() {
            return Ok(Self {
                config: model_path.join("config.json"),
                tokenizer: model_path.join("tokenizer.json"),
                weights: model_path.join("model.safetensors"),
            });
        }

        let api = hf_hub::api::sync::Api::new()?;
        let repo = api.model(model_id.to_string());
        Ok(Self {
            config: repo.get("config.json")?,
            tokenizer: repo.get("tokenizer.json")?,
            weights: repo.get("model.safetensors")?,
        })
    }
}

/// A loaded BERT-style sentence encoder.
///
/// Produces one vector per text by mean-pooling the last hidden state over
/// the attention mask and L2-normalizing the result.
struct SentenceModel {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
}

impl SentenceModel {
    fn load(model_id: &str) -> Result<Self> {
        let files = ModelFiles::resolve(model_id)?;
        let device = default_device();

        let config: Config =
            serde_json::from_str(&std::fs::read_to_string(&files.config)?)?;

        let mut tokenizer = Tokenizer::from_file(&files.tokenizer)
            .map_err(|e| Error::Tokenizer(e.to_string()))?;
        tokenizer
            .with_padding(Some(PaddingParams {
                strategy: PaddingStrategy::BatchLongest,
                ..Default::default()
            }))
            .with_truncation(Some(TruncationParams {
                max_length: resolve_max_seq_length(model_id),
                ..Default::default()
            }))
            .map_err(|e| Error::Tokenizer(e.to_string()))?;

        // SAFETY: the weights file is not modified while mapped.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[files.weights], DTYPE, &device)?
        };
        let model = BertModel::load(vb, &config)?;

        Ok(Self {
            model,
            tokenizer,
            device,
        })
    }

    fn encode(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| Error::Tokenizer(e.to_string()))?;

        let mut ids = Vec::with_capacity(encodings.len());
        let mut masks = Vec::with_capacity(encodings.len());
        for encoding in &encodings {
            ids.push(Tensor::new(encoding.get_ids(), &self.device)?);
            masks.push(Tensor::new(encoding.get_attention_mask(), &self.device)?);
        }

        // [batch, tokens]
        let token_ids = Tensor::stack(&ids, 0)?;
        let attention_mask = Tensor::stack(&masks, 0)?;
        let token_type_ids = token_ids.zeros_like()?;

        // [batch, tokens, hidden]
        let hidden = self.model.forward(
            &token_ids,
            &token_type_ids,
            Some(&attention_mask),
        )?;

        let mask = attention_mask.to_dtype(DTYPE)?.unsqueeze(2)?;
        let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
        let counts = mask.sum(1)?;
        let pooled = summed.broadcast_div(&counts)?;

        Ok(l2_normalize(&pooled)?.to_vec2::<f32>()?)
    }
}

/// Smallest norm divided by during normalization; all-zero rows stay zero.
const NORM_EPSILON: f32 = 1e-12;

/// L2-normalize each row of a `[batch, hidden]` tensor.
fn l2_normalize(rows: &Tensor) -> Result<Tensor> {
    let norm = rows.sqr()?.sum_keepdim(1)?.sqrt()?.maximum(NORM_EPSILON)?;
    Ok(rows.broadcast_div(&norm)?)
}

/// Manages the sentence embedding model lifecycle, loading it lazily on
/// first use.
///
/// The model is loaded at most once per manager; later calls reuse it.
/// Use [`ModelManager::shared`] for the process-wide instance.
pub struct ModelManager {
    model: Mutex<Option<Arc<SentenceModel>>>,
    model_id: String,
}

impl Default for ModelManager {
    fn default() -> Self {
        Self::new()
    }
}

static SHARED: OnceLock<ModelManager> = OnceLock::new();

impl ModelManager {
    /// Creates a new `ModelManager`. The model ID is resolved from:
    /// 1. The `PASSAGEIQ_MODEL` environment variable, if set
    /// 2. Otherwise, the default model
    ///    (`sentence-transformers/all-MiniLM-L6-v2`)
    ///
    /// The model is not loaded until the first call to `embed`.
    pub fn new() -> Self {
        let model_id = std::env::var(MODEL_ENV_VAR)
            .unwrap_or_else(|_| DEFAULT_MODEL_ID.to_string());

        Self::with_model_id(model_id)
    }

    /// Creates a `ModelManager` with an explicit model ID or local model
    /// directory, bypassing environment variable resolution.
    pub fn with_model_id(model_id: String) -> Self {
        Self {
            model: Mutex::new(None),
            model_id,
        }
    }

    /// Returns the process-wide manager, creating it on first call.
    ///
    /// `model_id` is only consulted by the call that creates the manager;
    /// later calls return the existing instance unchanged.
    pub fn shared(model_id: Option<&str>) -> &'static ModelManager {
        SHARED.get_or_init(|| match model_id {
            Some(id) => Self::with_model_id(id.to_string()),
            None => Self::new(),
        })
    }

    /// Returns the model ID that will be (or has been) loaded.
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Returns `true` if the model has already been loaded into memory.
    pub fn is_loaded(&self) -> bool {
        self.model.lock().is_ok_and(|guard| guard.is_some())
    }

    /// Ensures the model is loaded, downloading from the Hugging Face Hub if
    /// needed.
    fn ensure_loaded(&self) -> Result<Arc<SentenceModel>> {
        let mut guard = self
            .model
            .lock()
            .map_err(|_| Error::Embedder("model lock poisoned".into()))?;

        if let Some(model) = guard.as_ref() {
            return Ok(Arc::clone(model));
        }

        tracing::info!(model = %self.model_id, "loading sentence embedding model");
        let model = Arc::new(SentenceModel::load(&self.model_id)?);
        *guard = Some(Arc::clone(&model));
        tracing::debug!(model = %self.model_id, "model ready");

        Ok(model)
    }
}

impl Embedder for ModelManager {
    fn embed(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>> {
        let model = self.ensure_loaded()?;
        model.encode(texts)
    }
}
