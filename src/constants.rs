//! Cross-cutting, shared constants.
//!
//! Prefer deriving secondary constants from primary ones to avoid drift. The
//! embedding dimension is treated as an invariant across the embedding, cache
//! and retrieval modules; use [`validate_embedding_dim`] at module boundaries
//! to catch mismatches early instead of silently degrading ranking quality
//! deep in the pipeline.

/// Output dimension of the MiniLM embedding model (all-MiniLM-L6-v2).
pub const EMBEDDING_DIM: usize = 384;

/// Additive epsilon in the cosine-similarity denominator. Keeps degenerate
/// zero vectors from dividing by zero.
pub const COSINE_EPSILON: f32 = 1e-8;

/// Default words per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Default word overlap between consecutive chunks of a page.
pub const DEFAULT_CHUNK_OVERLAP: usize = 50;

/// Default stage-1 candidate width (wider than the final width so the
/// cross-encoder has something to reorder).
pub const DEFAULT_RETRIEVAL_TOP_K: usize = 5;

/// Default number of cited chunks handed to the language model.
pub const DEFAULT_FINAL_TOP_K: usize = 3;

/// Default directory for per-document embedding stores.
pub const DEFAULT_CACHE_DIR: &str = ".embeddings_cache";

/// Characters of chunk text shown per citation in the context block.
/// Display-only; the underlying chunk text is never truncated.
pub const CONTEXT_PREVIEW_CHARS: usize = 200;

/// Max tokens fed to the BERT encoders.
pub const DEFAULT_MAX_SEQ_LEN: usize = 256;

/// Error returned when an embedding dimension check fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionMismatch {
    pub expected: usize,
    pub actual: usize,
}

impl std::fmt::Display for DimensionMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "embedding dimension mismatch: expected {}, got {}",
            self.expected, self.actual
        )
    }
}

impl std::error::Error for DimensionMismatch {}

/// Validates that a runtime embedding dimension matches the expected one.
pub fn validate_embedding_dim(actual: usize, expected: usize) -> Result<(), DimensionMismatch> {
    if actual != expected {
        return Err(DimensionMismatch { expected, actual });
    }
    Ok(())
}
