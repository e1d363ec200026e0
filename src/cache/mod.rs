//! Embedding cache: (document, chunk) → vector, computed on miss.
//!
//! Three layers, read through in order: an in-memory map, one JSON store per
//! document on disk, and the encoder itself. Vectors are computed once per
//! chunk and are immutable afterwards. The cache exclusively owns the
//! on-disk representation; there is no eviction (corpora are small by
//! design) and no invalidation when a document changes without its byte size
//! changing; the weak name+size identity is documented on
//! [`DocumentId`](crate::document::DocumentId).

pub mod error;

#[cfg(test)]
mod tests;

pub use error::StoreError;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::document::{Chunk, ChunkKey, DocumentId};
use crate::embedding::{EmbeddingError, TextEncoder};

/// Read-through embedding cache over a [`TextEncoder`].
pub struct EmbeddingCache<E: TextEncoder> {
    encoder: E,
    cache_dir: PathBuf,
    memory: RwLock<HashMap<ChunkKey, Vec<f32>>>,
}

impl<E: TextEncoder> std::fmt::Debug for EmbeddingCache<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingCache")
            .field("cache_dir", &self.cache_dir)
            .field("memory_entries", &self.memory.read().len())
            .finish_non_exhaustive()
    }
}

impl<E: TextEncoder> EmbeddingCache<E> {
    /// Creates a cache rooted at `cache_dir`, creating the directory if
    /// absent. Directory creation is best-effort: if it fails, every store
    /// write will fail (and be logged) but lookups and embedding still work.
    pub fn new(encoder: E, cache_dir: impl Into<PathBuf>) -> Self {
        let cache_dir = cache_dir.into();

        if let Err(e) = std::fs::create_dir_all(&cache_dir) {
            warn!(
                cache_dir = %cache_dir.display(),
                error = %e,
                "Failed to create cache directory, persistence disabled"
            );
        }

        Self {
            encoder,
            cache_dir,
            memory: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the cache directory.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns a reference to the wrapped encoder.
    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Returns embeddings for every chunk in the batch, computing and
    /// persisting misses.
    ///
    /// Chunks are partitioned by owning document; each document's store is
    /// loaded once (absent or unreadable stores count as fully cold). All
    /// misses across all documents are embedded in a single batch call in
    /// chunk order, then persisted with one write per document. Every input
    /// chunk appears in the output exactly once, and a second call with the
    /// same chunks performs no encoder invocations.
    pub fn get_embeddings(
        &self,
        chunks: &[Chunk],
    ) -> Result<HashMap<ChunkKey, Vec<f32>>, EmbeddingError> {
        let mut embeddings: HashMap<ChunkKey, Vec<f32>> = HashMap::with_capacity(chunks.len());
        let mut to_embed: Vec<&Chunk> = Vec::new();

        // Partition by document, preserving first-seen document order.
        let mut doc_order: Vec<DocumentId> = Vec::new();
        let mut by_doc: HashMap<DocumentId, Vec<&Chunk>> = HashMap::new();
        for chunk in chunks {
            by_doc
                .entry(chunk.doc_id.clone())
                .or_insert_with(|| {
                    doc_order.push(chunk.doc_id.clone());
                    Vec::new()
                })
                .push(chunk);
        }

        // Resolve hits through memory then disk; queue the rest.
        let mut loaded_stores: HashMap<DocumentId, HashMap<String, Vec<f32>>> = HashMap::new();
        for doc_id in &doc_order {
            let store = self.load_store(doc_id);
            for chunk in &by_doc[doc_id] {
                let key = chunk.key();
                if let Some(vector) = self.memory.read().get(&key) {
                    embeddings.insert(key, vector.clone());
                } else if let Some(vector) = store.get(&key.to_string()) {
                    self.memory.write().insert(key.clone(), vector.clone());
                    embeddings.insert(key, vector.clone());
                } else {
                    to_embed.push(chunk);
                }
            }
            loaded_stores.insert(doc_id.clone(), store);
        }

        if to_embed.is_empty() {
            debug!(chunks = chunks.len(), "Embedding cache fully warm");
            return Ok(embeddings);
        }

        info!(
            missing = to_embed.len(),
            total = chunks.len(),
            "Computing embeddings for cache misses"
        );

        // One batch call across all documents, preserving chunk order.
        let texts: Vec<&str> = to_embed.iter().map(|c| c.text.as_str()).collect();
        let vectors = self.encoder.encode_batch(&texts)?;

        // Merge new vectors and group them back by document for persistence.
        let mut dirty_docs: Vec<DocumentId> = Vec::new();
        {
            let mut memory = self.memory.write();
            for (chunk, vector) in to_embed.iter().zip(vectors) {
                let key = chunk.key();
                let store = loaded_stores
                    .get_mut(&chunk.doc_id)
                    .expect("queued chunk belongs to a partitioned document");
                store.insert(key.to_string(), vector.clone());
                if !dirty_docs.contains(&chunk.doc_id) {
                    dirty_docs.push(chunk.doc_id.clone());
                }
                memory.insert(key.clone(), vector.clone());
                embeddings.insert(key, vector);
            }
        }

        // One write per touched document: the union of what the store held
        // and what was just computed, so partial hits never drop older keys.
        for doc_id in dirty_docs {
            let store = &loaded_stores[&doc_id];
            if let Err(e) = self.save_store(&doc_id, store) {
                warn!(doc_id = %doc_id, error = %e, "Failed to persist embedding store");
            } else {
                debug!(doc_id = %doc_id, entries = store.len(), "Persisted embedding store");
            }
        }

        Ok(embeddings)
    }

    /// Embeds a single arbitrary string (e.g. a query) with no caching.
    pub fn embed_text(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.encoder.encode(text)
    }

    fn store_path(&self, doc_id: &DocumentId) -> PathBuf {
        self.cache_dir.join(format!("{doc_id}_embeddings.json"))
    }

    /// Loads a document's persisted store; absent or unreadable stores are
    /// treated as fully cold, never as errors.
    fn load_store(&self, doc_id: &DocumentId) -> HashMap<String, Vec<f32>> {
        let path = self.store_path(doc_id);
        if !path.exists() {
            return HashMap::new();
        }

        match self.read_store(&path) {
            Ok(store) => store,
            Err(e) => {
                warn!(doc_id = %doc_id, error = %e, "Unusable embedding store, recomputing");
                HashMap::new()
            }
        }
    }

    fn read_store(&self, path: &Path) -> Result<HashMap<String, Vec<f32>>, StoreError> {
        let content = std::fs::read_to_string(path).map_err(|e| StoreError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

        serde_json::from_str(&content).map_err(|e| StoreError::Malformed {
            path: path.to_path_buf(),
            source: e,
        })
    }

    fn save_store(
        &self,
        doc_id: &DocumentId,
        store: &HashMap<String, Vec<f32>>,
    ) -> Result<(), StoreError> {
        let path = self.store_path(doc_id);

        let json = serde_json::to_string(store).map_err(|e| StoreError::Write {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        std::fs::write(&path, json).map_err(|e| StoreError::Write {
            path,
            reason: e.to_string(),
        })
    }
}
