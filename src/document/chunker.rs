//! Page-aware overlapping word-window chunker.

use std::path::Path;

use tracing::{debug, info};

use super::extract::PdfExtractor;
use super::{Chunk, DocumentId, SourceError};

/// Chunks one document into overlapping word windows.
///
/// Each page is split on whitespace independently; a window of `chunk_size`
/// words slides over it, advancing `chunk_size - overlap` words per step, so
/// consecutive chunks within a page share exactly `overlap` words. The final
/// window of a page may be shorter than `chunk_size`; no tail content is
/// dropped and nothing is padded. Pages with no extractable text yield no
/// chunks. Chunk indices are global across the document, never reset per
/// page.
///
/// Panics unless `overlap < chunk_size` (a zero stride would never
/// terminate); `RagConfig::validate` enforces this upstream.
pub fn chunk_document<E: PdfExtractor>(
    extractor: &E,
    path: &Path,
    chunk_size: usize,
    overlap: usize,
) -> Result<Vec<Chunk>, SourceError> {
    assert!(
        chunk_size > 0 && overlap < chunk_size,
        "overlap ({overlap}) must be smaller than chunk_size ({chunk_size})"
    );

    let extracted = extractor.extract(path)?;
    let doc_id = DocumentId::from_name_and_size(&extracted.name, extracted.size);

    let stride = chunk_size - overlap;
    let mut chunks = Vec::new();
    let mut index: u32 = 0;

    for (page_idx, page_text) in extracted.pages.iter().enumerate() {
        if page_text.trim().is_empty() {
            continue;
        }

        let words: Vec<&str> = page_text.split_whitespace().collect();
        let page = (page_idx + 1) as u32;

        let mut start = 0;
        while start < words.len() {
            let end = (start + chunk_size).min(words.len());
            chunks.push(Chunk {
                doc_id: doc_id.clone(),
                doc_name: extracted.name.clone(),
                index,
                page,
                text: words[start..end].join(" "),
                start_word: start,
                end_word: end,
            });
            index += 1;
            start += stride;
        }
    }

    debug!(
        doc_id = %doc_id,
        pages = extracted.pages.len(),
        chunks = chunks.len(),
        chunk_size,
        overlap,
        "Chunked document"
    );

    Ok(chunks)
}

/// Chunks several documents into one corpus by concatenation.
///
/// No reindexing happens: each chunk keeps its own document id and
/// per-document index, so only `(doc_id, index)` pairs are unique across the
/// corpus.
pub fn chunk_documents<E: PdfExtractor>(
    extractor: &E,
    paths: &[&Path],
    chunk_size: usize,
    overlap: usize,
) -> Result<Vec<Chunk>, SourceError> {
    let mut all_chunks = Vec::new();
    for path in paths {
        all_chunks.extend(chunk_document(extractor, path, chunk_size, overlap)?);
    }

    info!(
        documents = paths.len(),
        chunks = all_chunks.len(),
        "Chunked corpus"
    );

    Ok(all_chunks)
}
