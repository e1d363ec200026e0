use std::path::PathBuf;

use crate::constants::DEFAULT_MAX_SEQ_LEN;
use crate::rerank::error::RerankError;

/// Configuration for [`CrossEncoder`](super::CrossEncoder).
#[derive(Debug, Clone)]
pub struct CrossEncoderConfig {
    /// Directory with the sequence-classification model (`config.json`,
    /// `model.safetensors`, `tokenizer.json`). `None` selects the lexical
    /// stub backend.
    pub model_dir: Option<PathBuf>,
    /// Max tokens per (query, candidate) pair.
    pub max_seq_len: usize,
}

impl Default for CrossEncoderConfig {
    fn default() -> Self {
        Self {
            model_dir: None,
            max_seq_len: DEFAULT_MAX_SEQ_LEN,
        }
    }
}

impl CrossEncoderConfig {
    /// Creates a config pointing at a model directory.
    pub fn new<P: Into<PathBuf>>(model_dir: P) -> Self {
        Self {
            model_dir: Some(model_dir.into()),
            ..Default::default()
        }
    }

    /// Creates a stub config (no model files required).
    pub fn stub() -> Self {
        Self::default()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), RerankError> {
        if self.max_seq_len == 0 {
            return Err(RerankError::InvalidConfig {
                reason: "max_seq_len must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
