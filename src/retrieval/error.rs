use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::rerank::RerankError;

/// Errors fatal to a retrieval call. Degenerate inputs (no chunks, no
/// candidates) are defined short-circuit results, never errors.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("reranking failed: {0}")]
    Rerank(#[from] RerankError),
}
