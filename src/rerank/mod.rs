//! Cross-encoder reranking: stage 2 of the retrieval pipeline.
//!
//! A cross-encoder reads the (query, candidate) pair jointly, which is more
//! accurate than comparing precomputed vectors but must run once per
//! candidate at query time. That cost is why the engine only hands it the
//! small stage-1 candidate set.

pub mod bert;
pub mod config;
pub mod error;

#[cfg(test)]
mod tests;

pub use config::CrossEncoderConfig;
pub use error::RerankError;

use candle_core::Tensor;
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use crate::document::Chunk;
use crate::embedding::device::select_device;
use crate::retrieval::ScoredChunk;

use bert::BertPairScorer;

/// The black-box pair-scoring function: (query, candidate) pairs in,
/// relevance scores out (one per pair, in input order).
pub trait PairScorer: Send + Sync {
    fn predict(&self, pairs: &[(&str, &str)]) -> Result<Vec<f32>, RerankError>;
}

enum ScorerBackend {
    Model {
        model: BertPairScorer,
        tokenizer: Tokenizer,
        device: candle_core::Device,
    },
    Stub,
}

/// Cross-encoder scorer with an optional candle BERT backend.
///
/// Without a model directory it falls back to a deterministic lexical
/// overlap score, which keeps the full pipeline runnable in tests and on
/// machines without model files.
pub struct CrossEncoder {
    backend: ScorerBackend,
    config: CrossEncoderConfig,
}

impl std::fmt::Debug for CrossEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrossEncoder")
            .field("model_loaded", &self.is_model_loaded())
            .field("config", &self.config)
            .finish()
    }
}

impl CrossEncoder {
    /// Loads the cross-encoder (stub mode when no model dir is configured).
    pub fn load(config: CrossEncoderConfig) -> Result<Self, RerankError> {
        config.validate()?;

        let Some(ref model_dir) = config.model_dir else {
            info!("No cross-encoder model configured, using lexical stub scorer");
            return Ok(Self {
                backend: ScorerBackend::Stub,
                config,
            });
        };

        if !model_dir.exists() {
            return Err(RerankError::ModelNotFound {
                path: model_dir.clone(),
            });
        }

        let device = select_device().map_err(|e| RerankError::ModelLoadFailed {
            reason: e.to_string(),
        })?;

        let model = BertPairScorer::load(model_dir, &device).map_err(|e| {
            RerankError::ModelLoadFailed {
                reason: format!("Failed to load BERT cross-encoder: {e}"),
            }
        })?;

        let mut tokenizer = Tokenizer::from_file(model_dir.join("tokenizer.json")).map_err(|e| {
            RerankError::ModelLoadFailed {
                reason: format!("Failed to load tokenizer: {e}"),
            }
        })?;
        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: config.max_seq_len,
                ..Default::default()
            }))
            .map_err(|e| RerankError::ModelLoadFailed {
                reason: format!("Failed to configure truncation: {e}"),
            })?;

        info!(model_dir = %model_dir.display(), "Cross-encoder model loaded");

        Ok(Self {
            backend: ScorerBackend::Model {
                model,
                tokenizer,
                device,
            },
            config,
        })
    }

    /// Creates a stub cross-encoder.
    pub fn stub() -> Result<Self, RerankError> {
        Self::load(CrossEncoderConfig::stub())
    }

    pub fn is_model_loaded(&self) -> bool {
        matches!(self.backend, ScorerBackend::Model { .. })
    }

    pub fn config(&self) -> &CrossEncoderConfig {
        &self.config
    }

    fn score_pair_with_model(
        &self,
        query: &str,
        candidate: &str,
        model: &BertPairScorer,
        tokenizer: &Tokenizer,
        device: &candle_core::Device,
    ) -> Result<f32, RerankError> {
        let tokens = tokenizer.encode((query, candidate), true).map_err(|e| {
            RerankError::TokenizationFailed {
                reason: e.to_string(),
            }
        })?;

        let input_ids = Tensor::new(tokens.get_ids(), device)?.unsqueeze(0)?;
        let type_ids = Tensor::new(tokens.get_type_ids(), device)?.unsqueeze(0)?;
        let attention_mask = Tensor::new(tokens.get_attention_mask(), device)?.unsqueeze(0)?;

        let logits = model
            .forward(&input_ids, &type_ids, Some(&attention_mask))
            .map_err(|e| RerankError::InferenceFailed {
                reason: e.to_string(),
            })?;

        let score = logits.flatten_all()?.to_vec1::<f32>()?[0];
        Ok(score)
    }

    /// Deterministic lexical relevance in [0, 1]: a blend of query-term
    /// recall and Jaccard overlap, squashed through a sigmoid so its spread
    /// loosely resembles a calibrated cross-encoder.
    fn stub_score(query: &str, candidate: &str) -> f32 {
        use std::collections::HashSet;

        let query_lower = query.to_lowercase();
        let candidate_lower = candidate.to_lowercase();

        let query_words: HashSet<&str> = query_lower.split_whitespace().collect();
        let candidate_words: HashSet<&str> = candidate_lower.split_whitespace().collect();

        if query_words.is_empty() || candidate_words.is_empty() {
            return 0.0;
        }

        let matches = query_words.intersection(&candidate_words).count() as f32;
        let union = query_words.union(&candidate_words).count() as f32;

        let recall = matches / query_words.len() as f32;
        let jaccard = matches / union;
        let blended = 0.6 * recall + 0.4 * jaccard;

        let squashed = 1.0 / (1.0 + (-8.0 * (blended - 0.5)).exp());
        squashed.clamp(0.0, 1.0)
    }
}

impl PairScorer for CrossEncoder {
    fn predict(&self, pairs: &[(&str, &str)]) -> Result<Vec<f32>, RerankError> {
        match &self.backend {
            ScorerBackend::Model {
                model,
                tokenizer,
                device,
            } => pairs
                .iter()
                .map(|(query, candidate)| {
                    self.score_pair_with_model(query, candidate, model, tokenizer, device)
                })
                .collect(),
            ScorerBackend::Stub => Ok(pairs
                .iter()
                .map(|(query, candidate)| Self::stub_score(query, candidate))
                .collect()),
        }
    }
}

/// Top-k reranking over a [`PairScorer`].
pub struct Reranker<S: PairScorer> {
    scorer: S,
}

impl<S: PairScorer> std::fmt::Debug for Reranker<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reranker").finish_non_exhaustive()
    }
}

impl<S: PairScorer> Reranker<S> {
    pub fn new(scorer: S) -> Self {
        Self { scorer }
    }

    /// Returns a reference to the wrapped scorer.
    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    /// Scores every chunk against `query` and returns at most `top_k`
    /// results sorted by score descending (stable: ties keep input order).
    ///
    /// Any score a chunk carried before (e.g. its stage-1 cosine similarity)
    /// is overwritten, not combined. Empty input returns empty output
    /// without invoking the scorer.
    pub fn rerank(
        &self,
        query: &str,
        chunks: &[Chunk],
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>, RerankError> {
        if chunks.is_empty() {
            return Ok(vec![]);
        }

        debug!(
            query_len = query.len(),
            candidates = chunks.len(),
            top_k,
            "Reranking candidates"
        );

        let pairs: Vec<(&str, &str)> = chunks.iter().map(|c| (query, c.text.as_str())).collect();
        let scores = self.scorer.predict(&pairs)?;

        if scores.len() != pairs.len() {
            return Err(RerankError::ScoreCountMismatch {
                expected: pairs.len(),
                actual: scores.len(),
            });
        }

        let mut ranked: Vec<ScoredChunk> = chunks
            .iter()
            .zip(scores)
            .map(|(chunk, score)| ScoredChunk {
                chunk: chunk.clone(),
                score,
            })
            .collect();

        // sort_by is stable, so equal scores keep their input order.
        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked.truncate(top_k);

        if let Some(best) = ranked.first() {
            debug!(top_score = best.score, returned = ranked.len(), "Reranking complete");
        } else {
            warn!("Reranker produced no results");
        }

        Ok(ranked)
    }
}
