//! Document identity, the text-extraction seam and the chunker.
//!
//! A document is identified by a short fingerprint of its file name and byte
//! size. The fingerprint is stable across re-reads of an unmodified file but
//! it is *not* a content hash: two different files sharing a name and size
//! collide, and an in-place edit that keeps the size produces the same id.
//! The embedding cache inherits both properties.

pub mod chunker;
pub mod error;
pub mod extract;

pub use chunker::{chunk_document, chunk_documents};
pub use error::SourceError;
pub use extract::{ExtractedDocument, PdfExtractor, PdftotextExtractor};

#[cfg(any(test, feature = "mock"))]
pub use extract::MockExtractor;

use std::fmt;
use std::path::Path;

/// 8-hex-char document fingerprint derived from file name and byte size.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(String);

impl DocumentId {
    /// Wraps a raw id string (useful for tests and store maintenance tools).
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fingerprints a file on disk. Fails if the file cannot be stat'ed.
    pub fn for_file(path: &Path) -> Result<Self, SourceError> {
        let metadata = std::fs::metadata(path).map_err(|e| SourceError::Open {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(Self::from_name_and_size(&file_name(path), metadata.len()))
    }

    /// Fingerprints a (name, size) pair directly. Truncating the blake3 hash
    /// to 8 hex chars (32 bits) is plenty for the small corpora this engine
    /// targets; a collision costs a shared cache file, not data corruption.
    pub fn from_name_and_size(name: &str, size: u64) -> Self {
        let hash = blake3::hash(format!("{name}_{size}").as_bytes());
        Self(hash.to_hex()[..8].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Basic document metadata for display and summaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInfo {
    pub id: DocumentId,
    pub name: String,
    pub page_count: usize,
}

impl DocumentInfo {
    /// One-line human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "PDF '{}' with {} pages (ID: {})",
            self.name, self.page_count, self.id
        )
    }
}

/// Composite key associating an embedding vector with exactly one chunk.
///
/// The [`Display`](fmt::Display) form `"{doc_id}_{index}"` is what the
/// persisted store uses, so it must stay stable across releases.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkKey {
    pub doc_id: DocumentId,
    pub index: u32,
}

impl fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.doc_id, self.index)
    }
}

/// The unit of retrieval: a bounded word-window of one document page.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// Owning document fingerprint.
    pub doc_id: DocumentId,
    /// Display name of the owning document (for citations).
    pub doc_name: String,
    /// Zero-based index, unique per document, assigned in page-then-offset
    /// order across the whole document (never reset per page).
    pub index: u32,
    /// 1-based source page number.
    pub page: u32,
    /// Raw chunk text.
    pub text: String,
    /// Start word offset within the page.
    pub start_word: usize,
    /// End word offset within the page (exclusive).
    pub end_word: usize,
}

impl Chunk {
    /// Key used by the embedding cache.
    pub fn key(&self) -> ChunkKey {
        ChunkKey {
            doc_id: self.doc_id.clone(),
            index: self.index,
        }
    }
}

/// Returns document metadata without chunking it.
pub fn document_info<E: PdfExtractor>(
    extractor: &E,
    path: &Path,
) -> Result<DocumentInfo, SourceError> {
    let extracted = extractor.extract(path)?;
    Ok(DocumentInfo {
        id: DocumentId::from_name_and_size(&extracted.name, extracted.size),
        name: extracted.name,
        page_count: extracted.pages.len(),
    })
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_fingerprint_determinism() {
        let a = DocumentId::from_name_and_size("report.pdf", 1024);
        let b = DocumentId::from_name_and_size("report.pdf", 1024);

        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_length() {
        let id = DocumentId::from_name_and_size("report.pdf", 1024);

        assert_eq!(id.as_str().len(), 8);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_fingerprint_sensitivity() {
        let inputs = [
            ("report.pdf", 1024),
            ("report.pdf", 1025),
            ("Report.pdf", 1024),
            ("report2.pdf", 1024),
        ];

        let ids: HashSet<_> = inputs
            .iter()
            .map(|(name, size)| DocumentId::from_name_and_size(name, *size))
            .collect();

        assert_eq!(ids.len(), inputs.len());
    }

    #[test]
    fn test_chunk_key_display_form() {
        let key = ChunkKey {
            doc_id: DocumentId::new("abc12345"),
            index: 7,
        };

        assert_eq!(key.to_string(), "abc12345_7");
    }

    #[test]
    fn test_document_summary() {
        let info = DocumentInfo {
            id: DocumentId::new("abc12345"),
            name: "manual.pdf".to_string(),
            page_count: 12,
        };

        assert_eq!(
            info.summary(),
            "PDF 'manual.pdf' with 12 pages (ID: abc12345)"
        );
    }
}
