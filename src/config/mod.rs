//! Environment-backed configuration.
//!
//! Most settings have defaults suited to small PDF corpora. Override
//! with `CITESEEK_*` environment variables, or build a [`RagConfig`] directly
//! when several engines with different tunables need to coexist.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::path::PathBuf;

use crate::constants::{
    DEFAULT_CACHE_DIR, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, DEFAULT_FINAL_TOP_K,
    DEFAULT_RETRIEVAL_TOP_K,
};

/// Default chat model served through the OpenAI-compatible endpoint.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

/// Default OpenAI-compatible endpoint (Poe).
pub const DEFAULT_CHAT_BASE_URL: &str = "https://api.poe.com/v1";

/// Default max tokens for a chat completion.
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Pipeline configuration, passed explicitly into each component.
///
/// Use [`RagConfig::from_env`] to read `CITESEEK_*` overrides on top of
/// defaults.
#[derive(Debug, Clone)]
pub struct RagConfig {
    /// Words per chunk. Default: `500`.
    pub chunk_size: usize,

    /// Word overlap between consecutive chunks of a page. Default: `50`.
    pub chunk_overlap: usize,

    /// Stage-1 candidate width fed to the reranker. Default: `5`.
    pub retrieval_top_k: usize,

    /// Final number of cited chunks. Default: `3`.
    pub final_top_k: usize,

    /// Directory holding one embedding store per document. Default:
    /// `./.embeddings_cache`.
    pub cache_dir: PathBuf,

    /// Directory with the embedding model (config.json + model.safetensors +
    /// tokenizer.json). `None` selects the deterministic stub backend.
    pub embedder_path: Option<PathBuf>,

    /// Directory with the cross-encoder model. `None` selects the stub
    /// backend.
    pub reranker_path: Option<PathBuf>,

    /// Chat model name. Default: `gpt-4o-mini`.
    pub chat_model: String,

    /// OpenAI-compatible base URL. Default: `https://api.poe.com/v1`.
    pub chat_base_url: String,

    /// Max tokens per chat completion. Default: `2048`.
    pub max_tokens: u32,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            retrieval_top_k: DEFAULT_RETRIEVAL_TOP_K,
            final_top_k: DEFAULT_FINAL_TOP_K,
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            embedder_path: None,
            reranker_path: None,
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            chat_base_url: DEFAULT_CHAT_BASE_URL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl RagConfig {
    const ENV_CHUNK_SIZE: &'static str = "CITESEEK_CHUNK_SIZE";
    const ENV_CHUNK_OVERLAP: &'static str = "CITESEEK_CHUNK_OVERLAP";
    const ENV_RETRIEVAL_TOP_K: &'static str = "CITESEEK_RETRIEVAL_TOP_K";
    const ENV_FINAL_TOP_K: &'static str = "CITESEEK_FINAL_TOP_K";
    const ENV_CACHE_DIR: &'static str = "CITESEEK_CACHE_DIR";
    const ENV_EMBEDDER_PATH: &'static str = "CITESEEK_EMBEDDER_PATH";
    const ENV_RERANKER_PATH: &'static str = "CITESEEK_RERANKER_PATH";
    const ENV_CHAT_MODEL: &'static str = "CITESEEK_CHAT_MODEL";
    const ENV_CHAT_BASE_URL: &'static str = "CITESEEK_CHAT_BASE_URL";

    /// Loads configuration from environment variables (falling back to
    /// defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            chunk_size: Self::parse_usize_from_env(Self::ENV_CHUNK_SIZE, defaults.chunk_size)?,
            chunk_overlap: Self::parse_usize_from_env(
                Self::ENV_CHUNK_OVERLAP,
                defaults.chunk_overlap,
            )?,
            retrieval_top_k: Self::parse_usize_from_env(
                Self::ENV_RETRIEVAL_TOP_K,
                defaults.retrieval_top_k,
            )?,
            final_top_k: Self::parse_usize_from_env(Self::ENV_FINAL_TOP_K, defaults.final_top_k)?,
            cache_dir: Self::parse_path_from_env(Self::ENV_CACHE_DIR, defaults.cache_dir),
            embedder_path: Self::parse_optional_path_from_env(Self::ENV_EMBEDDER_PATH),
            reranker_path: Self::parse_optional_path_from_env(Self::ENV_RERANKER_PATH),
            chat_model: Self::parse_string_from_env(Self::ENV_CHAT_MODEL, defaults.chat_model),
            chat_base_url: Self::parse_string_from_env(
                Self::ENV_CHAT_BASE_URL,
                defaults.chat_base_url,
            ),
            max_tokens: defaults.max_tokens,
        })
    }

    /// Validates tunables and configured paths (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }

        if self.chunk_overlap == 0 {
            return Err(ConfigError::ZeroOverlap);
        }

        if self.chunk_overlap >= self.chunk_size {
            return Err(ConfigError::OverlapTooLarge {
                overlap: self.chunk_overlap,
                chunk_size: self.chunk_size,
            });
        }

        if self.retrieval_top_k == 0 {
            return Err(ConfigError::ZeroTopK {
                name: "retrieval_top_k",
            });
        }

        if self.final_top_k == 0 {
            return Err(ConfigError::ZeroTopK {
                name: "final_top_k",
            });
        }

        if self.cache_dir.exists() && !self.cache_dir.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.cache_dir.clone(),
            });
        }

        for path in [&self.embedder_path, &self.reranker_path]
            .into_iter()
            .flatten()
        {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }

        Ok(())
    }

    fn parse_usize_from_env(var: &'static str, default: usize) -> Result<usize, ConfigError> {
        match env::var(var) {
            Ok(value) => value.parse().map_err(|e| ConfigError::ParseError {
                var,
                value,
                source: e,
            }),
            Err(_) => Ok(default),
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name).map(PathBuf::from).unwrap_or(default)
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name).unwrap_or(default)
    }
}
