//! MiniLM sentence embedder (BERT + mean pooling).
//!
//! Use [`EncoderConfig::stub`] for tests/examples without model files.

pub mod config;

#[cfg(test)]
mod tests;

pub use config::EncoderConfig;

use std::sync::Arc;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use parking_lot::Mutex;
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use super::TextEncoder;
use crate::embedding::device::select_device;
use crate::embedding::error::EmbeddingError;

enum EncoderBackend {
    Model {
        model: Arc<Mutex<BertModel>>,
        tokenizer: Arc<Tokenizer>,
        device: Device,
    },
    Stub,
}

/// Embedding generator for semantic search (supports stub mode).
pub struct MiniLmEmbedder {
    backend: EncoderBackend,
    config: EncoderConfig,
}

impl std::fmt::Debug for MiniLmEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiniLmEmbedder")
            .field(
                "backend",
                &match &self.backend {
                    EncoderBackend::Model { device, .. } => format!("Model({device:?})"),
                    EncoderBackend::Stub => "Stub".to_string(),
                },
            )
            .field("embedding_dim", &self.config.embedding_dim)
            .field("max_seq_len", &self.config.max_seq_len)
            .finish()
    }
}

impl MiniLmEmbedder {
    /// Loads the embedder from a config (stub mode is supported).
    pub fn load(config: EncoderConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        if config.testing_stub {
            warn!("MiniLM embedder running in STUB mode (testing only)");
            return Ok(Self {
                backend: EncoderBackend::Stub,
                config,
            });
        }

        let device = select_device()?;
        debug!(?device, "Selected compute device for embedder");

        let (model, tokenizer) = Self::load_model(&config, &device)?;

        info!(
            model_dir = %config.model_dir.display(),
            embedding_dim = config.embedding_dim,
            max_seq_len = config.max_seq_len,
            "MiniLM embedding model loaded"
        );

        Ok(Self {
            backend: EncoderBackend::Model {
                model: Arc::new(Mutex::new(model)),
                tokenizer: Arc::new(tokenizer),
                device,
            },
            config,
        })
    }

    /// Creates a stub embedder (deterministic, no model files).
    pub fn stub() -> Result<Self, EmbeddingError> {
        Self::load(EncoderConfig::stub())
    }

    fn load_model(
        config: &EncoderConfig,
        device: &Device,
    ) -> Result<(BertModel, Tokenizer), EmbeddingError> {
        let config_path = config.model_dir.join("config.json");
        let weights_path = config.model_dir.join("model.safetensors");
        let tokenizer_path = config.model_dir.join("tokenizer.json");

        for path in [&config_path, &weights_path, &tokenizer_path] {
            if !path.exists() {
                return Err(EmbeddingError::ModelNotFound { path: path.clone() });
            }
        }

        let bert_config: BertConfig =
            serde_json::from_str(&std::fs::read_to_string(&config_path)?).map_err(|e| {
                EmbeddingError::ModelLoadFailed {
                    reason: format!("Failed to parse config.json: {e}"),
                }
            })?;

        if bert_config.hidden_size < config.embedding_dim {
            return Err(EmbeddingError::InvalidConfig {
                reason: format!(
                    "embedding_dim ({}) exceeds model hidden_size ({})",
                    config.embedding_dim, bert_config.hidden_size
                ),
            });
        }

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, device)
                .map_err(|e| EmbeddingError::ModelLoadFailed {
                    reason: format!("Failed to load safetensors: {e}"),
                })?
        };

        let model =
            BertModel::load(vb, &bert_config).map_err(|e| EmbeddingError::ModelLoadFailed {
                reason: format!("Failed to load BERT model: {e}"),
            })?;

        let mut tokenizer =
            Tokenizer::from_file(&tokenizer_path).map_err(|e| EmbeddingError::ModelLoadFailed {
                reason: format!("Failed to load tokenizer: {e}"),
            })?;
        tokenizer.with_truncation(Some(tokenizers::TruncationParams {
            max_length: config.max_seq_len,
            ..Default::default()
        }))
        .map_err(|e| EmbeddingError::ModelLoadFailed {
            reason: format!("Failed to configure truncation: {e}"),
        })?;

        Ok((model, tokenizer))
    }

    fn embed_with_model(
        &self,
        text: &str,
        model: &Arc<Mutex<BertModel>>,
        tokenizer: &Tokenizer,
        device: &Device,
    ) -> Result<Vec<f32>, EmbeddingError> {
        let encoding =
            tokenizer
                .encode(text, true)
                .map_err(|e| EmbeddingError::TokenizationFailed {
                    reason: e.to_string(),
                })?;

        let tokens = encoding.get_ids();
        if tokens.is_empty() {
            return Ok(vec![0.0; self.config.embedding_dim]);
        }

        debug!(
            text_len = text.len(),
            token_count = tokens.len(),
            "Generating embedding (BERT forward pass)"
        );

        let input_ids = Tensor::new(tokens, device)?.unsqueeze(0)?;
        let type_ids = Tensor::new(encoding.get_type_ids(), device)?.unsqueeze(0)?;
        let attention_mask = Tensor::new(encoding.get_attention_mask(), device)?.unsqueeze(0)?;

        // hidden_states shape: [1, seq_len, hidden_size]
        let hidden_states = model
            .lock()
            .forward(&input_ids, &type_ids, Some(&attention_mask))?;

        // Mean pooling over the sequence dimension, then L2 normalization
        // (matches sentence-transformers' pooling for MiniLM).
        let pooled = hidden_states.mean(1)?.squeeze(0)?;
        let embedding: Vec<f32> = pooled.to_vec1::<f32>()?;

        let mut embedding = embedding;
        embedding.truncate(self.config.embedding_dim);
        normalize_in_place(&mut embedding);

        Ok(embedding)
    }

    /// Returns the configured output embedding dimension.
    pub fn dim(&self) -> usize {
        self.config.embedding_dim
    }

    /// Returns `true` if running in stub mode.
    pub fn is_stub(&self) -> bool {
        matches!(self.backend, EncoderBackend::Stub)
    }

    /// Returns the encoder configuration.
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }
}

impl TextEncoder for MiniLmEmbedder {
    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        match &self.backend {
            EncoderBackend::Model {
                model,
                tokenizer,
                device,
            } => {
                // Sequential forward passes; proper batching would need
                // padding-aware pooling.
                texts
                    .iter()
                    .map(|text| self.embed_with_model(text, model, tokenizer, device))
                    .collect()
            }
            EncoderBackend::Stub => Ok(texts
                .iter()
                .map(|text| stub_embedding(text, self.config.embedding_dim))
                .collect()),
        }
    }

    fn embedding_dim(&self) -> usize {
        self.config.embedding_dim
    }
}

/// Deterministic normalized pseudo-embedding seeded from the text hash.
///
/// Identical texts always map to identical vectors, which is what the cache
/// idempotency tests rely on.
pub(crate) fn stub_embedding(text: &str, dim: usize) -> Vec<f32> {
    use std::hash::{DefaultHasher, Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    let mut state = hasher.finish();

    let mut embedding = Vec::with_capacity(dim);
    for _ in 0..dim {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
        let value = ((state >> 32) as f32 / u32::MAX as f32) * 2.0 - 1.0;
        embedding.push(value);
    }

    normalize_in_place(&mut embedding);
    embedding
}

fn normalize_in_place(embedding: &mut [f32]) {
    let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in embedding.iter_mut() {
            *x /= norm;
        }
    }
}
