//! Two-stage retrieval: cosine-similarity candidate selection, then
//! cross-encoder reranking.
//!
//! The expensive cross-encoder runs once per candidate at query time, so
//! stage 1 (cosine similarity over precomputed vectors) exists purely to
//! bound reranker invocations to a small constant regardless of corpus
//! size. A plain keyword strategy is kept alongside as a model-free
//! fallback; both are reachable through [`RetrievalStrategy`].

pub mod error;


pub use error::RetrievalError;

use std::collections::HashMap;

use tracing::{debug, info};

use crate::cache::EmbeddingCache;
use crate::constants::COSINE_EPSILON;
use crate::document::{Chunk, ChunkKey, DocumentId};
use crate::embedding::TextEncoder;
use crate::rerank::{PairScorer, Reranker};

/// A chunk plus the relevance score assigned during one retrieval call.
///
/// Transient: created and discarded within a single call, never persisted.
/// The score field is overwritten between stages (cosine similarity, then
/// cross-encoder logit), not accumulated.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// Cosine similarity with a small additive epsilon in the denominator so
/// degenerate zero vectors score 0.0 instead of dividing by zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let (dot, norm_a_sq, norm_b_sq) = a.iter().zip(b.iter()).fold(
        (0.0f32, 0.0f32, 0.0f32),
        |(dot, na, nb), (&av, &bv)| (dot + av * bv, na + av * av, nb + bv * bv),
    );

    dot / (norm_a_sq.sqrt() * norm_b_sq.sqrt() + COSINE_EPSILON)
}

/// Stage 1: ranks chunks by cosine similarity against the query vector.
///
/// Chunks without an entry in `embeddings` are silently excluded (they
/// should not occur when the mapping came from
/// [`EmbeddingCache::get_embeddings`], but a missing key must not error).
/// Returns at most `top_k` chunks, sorted by similarity descending.
pub fn semantic_search(
    chunks: &[Chunk],
    embeddings: &HashMap<ChunkKey, Vec<f32>>,
    query_embedding: &[f32],
    top_k: usize,
) -> Vec<ScoredChunk> {
    let mut scored: Vec<ScoredChunk> = chunks
        .iter()
        .filter_map(|chunk| {
            embeddings.get(&chunk.key()).map(|vector| ScoredChunk {
                chunk: chunk.clone(),
                score: cosine_similarity(query_embedding, vector),
            })
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.truncate(top_k);
    scored
}

/// The central algorithm: embedding lookup → cosine pre-filter → rerank.
///
/// Embeddings for all candidate chunks come from the cache in one batch
/// call; the query goes through the cache's uncached path. Stage 1 selects
/// `retrieval_top_k` candidates; stage 2 reranks them down to `final_top_k`.
/// An empty candidate set short-circuits to an empty result without
/// invoking the reranker.
pub fn retrieve_with_reranking<E: TextEncoder, S: PairScorer>(
    query: &str,
    chunks: &[Chunk],
    cache: &EmbeddingCache<E>,
    reranker: &Reranker<S>,
    retrieval_top_k: usize,
    final_top_k: usize,
) -> Result<Vec<ScoredChunk>, RetrievalError> {
    let embeddings = cache.get_embeddings(chunks)?;
    let query_embedding = cache.embed_text(query)?;

    let candidates = semantic_search(chunks, &embeddings, &query_embedding, retrieval_top_k);

    if candidates.is_empty() {
        debug!("No stage-1 candidates, skipping reranker");
        return Ok(vec![]);
    }

    let candidate_chunks: Vec<Chunk> = candidates.into_iter().map(|s| s.chunk).collect();
    let reranked = reranker.rerank(query, &candidate_chunks, final_top_k)?;

    info!(
        corpus = chunks.len(),
        candidates = candidate_chunks.len(),
        returned = reranked.len(),
        best_score = reranked.first().map(|r| r.score),
        "Two-stage retrieval complete"
    );

    Ok(reranked)
}

/// Restricts the candidate set to a single document by exact id match.
pub fn filter_by_document(chunks: &[Chunk], doc_id: &DocumentId) -> Vec<Chunk> {
    chunks
        .iter()
        .filter(|c| &c.doc_id == doc_id)
        .cloned()
        .collect()
}

/// Legacy keyword search: Jaccard similarity between the lowercased word
/// sets of query and chunk. No stages, no cache and no model, so it works
/// when no embedding runtime is available. Ties keep input order (stable
/// sort).
pub fn simple_similarity_search(query: &str, chunks: &[Chunk], top_k: usize) -> Vec<ScoredChunk> {
    let query_lower = query.to_lowercase();
    let query_words: std::collections::HashSet<&str> = query_lower.split_whitespace().collect();

    let mut scored: Vec<ScoredChunk> = chunks
        .iter()
        .map(|chunk| {
            let chunk_lower = chunk.text.to_lowercase();
            let chunk_words: std::collections::HashSet<&str> =
                chunk_lower.split_whitespace().collect();

            let score = if !query_words.is_empty() && !chunk_words.is_empty() {
                let intersection = query_words.intersection(&chunk_words).count();
                let union = query_words.union(&chunk_words).count();
                intersection as f32 / union as f32
            } else {
                0.0
            };

            ScoredChunk {
                chunk: chunk.clone(),
                score,
            }
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.truncate(top_k);
    scored
}

/// One capability, two implementations: given query + chunks, produce
/// ranked results. Callers pick a strategy instead of branching on which
/// free function they imported.
pub trait RetrievalStrategy {
    fn retrieve(
        &self,
        query: &str,
        chunks: &[Chunk],
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>, RetrievalError>;
}

/// Two-stage semantic strategy owning its cache and reranker.
pub struct SemanticRetriever<E: TextEncoder, S: PairScorer> {
    cache: EmbeddingCache<E>,
    reranker: Reranker<S>,
    retrieval_top_k: usize,
}

impl<E: TextEncoder, S: PairScorer> SemanticRetriever<E, S> {
    /// `retrieval_top_k` is the stage-1 candidate width handed to the
    /// reranker; the final width is the `top_k` of each retrieve call.
    pub fn new(cache: EmbeddingCache<E>, reranker: Reranker<S>, retrieval_top_k: usize) -> Self {
        Self {
            cache,
            reranker,
            retrieval_top_k,
        }
    }

    pub fn cache(&self) -> &EmbeddingCache<E> {
        &self.cache
    }

    pub fn reranker(&self) -> &Reranker<S> {
        &self.reranker
    }
}

impl<E: TextEncoder, S: PairScorer> RetrievalStrategy for SemanticRetriever<E, S> {
    fn retrieve(
        &self,
        query: &str,
        chunks: &[Chunk],
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>, RetrievalError> {
        retrieve_with_reranking(
            query,
            chunks,
            &self.cache,
            &self.reranker,
            self.retrieval_top_k,
            top_k,
        )
    }
}

/// Keyword fallback strategy (Jaccard), infallible and dependency-free.
#[derive(Debug, Clone, Default)]
pub struct KeywordRetriever;

impl KeywordRetriever {
    pub fn new() -> Self {
        Self
    }
}

impl RetrievalStrategy for KeywordRetriever {
    fn retrieve(
        &self,
        query: &str,
        chunks: &[Chunk],
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>, RetrievalError> {
        Ok(simple_similarity_search(query, chunks, top_k))
    }
}
