//! Text-to-vector seam and the bundled MiniLM embedder.
//!
//! The retrieval engine only depends on [`TextEncoder`]; the model runtime
//! behind it is a black box. [`MiniLmEmbedder`] is the bundled
//! implementation (candle BERT with mean pooling), with a deterministic stub
//! backend for tests and model-less environments.

pub mod device;
pub mod encoder;
pub mod error;

pub use encoder::{EncoderConfig, MiniLmEmbedder};
pub use error::EmbeddingError;

use crate::constants::EMBEDDING_DIM;

/// The black-box embedding function: text in, fixed-dimension vector out.
pub trait TextEncoder: Send + Sync {
    /// Embeds a batch of texts, one vector per input, in input order.
    /// Implementations should amortize per-call overhead across the batch.
    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Embeds a single text (e.g. a query).
    fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vectors = self.encode_batch(&[text])?;
        vectors.pop().ok_or(EmbeddingError::InferenceFailed {
            reason: "encoder returned no vector for single input".to_string(),
        })
    }

    /// Dimension of every vector this encoder produces.
    fn embedding_dim(&self) -> usize {
        EMBEDDING_DIM
    }
}

/// Encoder test double that counts model invocations.
#[cfg(any(test, feature = "mock"))]
#[derive(Debug, Default)]
pub struct CountingEncoder {
    calls: std::sync::atomic::AtomicUsize,
    texts_encoded: std::sync::atomic::AtomicUsize,
}

#[cfg(any(test, feature = "mock"))]
impl CountingEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `encode_batch` invocations so far.
    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }

    /// Total number of texts embedded so far.
    pub fn texts_encoded(&self) -> usize {
        self.texts_encoded.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "mock"))]
impl TextEncoder for CountingEncoder {
    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        use std::sync::atomic::Ordering;

        self.calls.fetch_add(1, Ordering::SeqCst);
        self.texts_encoded.fetch_add(texts.len(), Ordering::SeqCst);

        // Deterministic per-text vectors so equality checks are meaningful.
        Ok(texts
            .iter()
            .map(|text| encoder::stub_embedding(text, EMBEDDING_DIM))
            .collect())
    }
}
