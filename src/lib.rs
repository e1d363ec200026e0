//! Citeseek library crate (used by the CLI binary and integration tests).
//!
//! # Public API Surface
//!
//! The exports are organized by module:
//!
//! ## Core Types (Stable)
//! - [`RagConfig`], [`ConfigError`] - Pipeline configuration
//! - [`Chunk`], [`ChunkKey`], [`DocumentId`], [`DocumentInfo`] - Corpus model
//! - [`ScoredChunk`] - Retrieval results
//!
//! ## Ingestion
//! - [`PdfExtractor`], [`PdftotextExtractor`], [`ExtractedDocument`] - PDF text extraction
//! - [`chunk_document`], [`chunk_documents`] - Overlapping word-window chunking
//!
//! ## Embedding & Caching
//! - [`TextEncoder`], [`MiniLmEmbedder`], [`EncoderConfig`] - Embedding generation
//! - [`EmbeddingCache`] - Per-document persistent embedding stores
//!
//! ## Retrieval
//! - [`retrieve_with_reranking`], [`semantic_search`], [`cosine_similarity`] - Two-stage engine
//! - [`Reranker`], [`CrossEncoder`], [`PairScorer`] - Cross-encoder reranking
//! - [`RetrievalStrategy`], [`SemanticRetriever`], [`KeywordRetriever`] - Strategy seam
//!
//! ## Prompting & Answering
//! - [`build_prompt`], [`format_context`] - Cited prompt assembly
//! - [`ChatClient`] - OpenAI-compatible completion client
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod cache;
pub mod chat;
pub mod config;
pub mod constants;
pub mod document;
pub mod embedding;
pub mod prompt;
pub mod rerank;
pub mod retrieval;

pub use cache::{EmbeddingCache, StoreError};

pub use chat::{ChatClient, ChatError};

pub use config::{
    ConfigError, DEFAULT_CHAT_BASE_URL, DEFAULT_CHAT_MODEL, DEFAULT_MAX_TOKENS, RagConfig,
};

pub use constants::{
    CONTEXT_PREVIEW_CHARS, COSINE_EPSILON, DEFAULT_CACHE_DIR, DEFAULT_CHUNK_OVERLAP,
    DEFAULT_CHUNK_SIZE, DEFAULT_FINAL_TOP_K, DEFAULT_RETRIEVAL_TOP_K, DimensionMismatch,
    EMBEDDING_DIM, validate_embedding_dim,
};

pub use document::{
    Chunk, ChunkKey, DocumentId, DocumentInfo, ExtractedDocument, PdfExtractor,
    PdftotextExtractor, SourceError, chunk_document, chunk_documents,
};
#[cfg(any(test, feature = "mock"))]
pub use document::MockExtractor;

pub use embedding::{EmbeddingError, EncoderConfig, MiniLmEmbedder, TextEncoder};
#[cfg(any(test, feature = "mock"))]
pub use embedding::CountingEncoder;

pub use prompt::{build_prompt, format_context};

pub use rerank::{CrossEncoder, CrossEncoderConfig, PairScorer, Reranker, RerankError};

pub use retrieval::{
    KeywordRetriever, RetrievalError, RetrievalStrategy, ScoredChunk, SemanticRetriever,
    cosine_similarity, filter_by_document, retrieve_with_reranking, semantic_search,
    simple_similarity_search,
};
