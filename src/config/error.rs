use std::num::ParseIntError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    ParseError {
        var: &'static str,
        value: String,
        source: ParseIntError,
    },

    #[error("chunk_size must be greater than zero")]
    ZeroChunkSize,

    #[error("chunk_overlap must be greater than zero")]
    ZeroOverlap,

    #[error("chunk_overlap ({overlap}) must be smaller than chunk_size ({chunk_size})")]
    OverlapTooLarge { overlap: usize, chunk_size: usize },

    #[error("{name} must be greater than zero")]
    ZeroTopK { name: &'static str },

    #[error("path exists but is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("path not found: {path}")]
    PathNotFound { path: PathBuf },
}
