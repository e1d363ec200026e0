//! Text-extraction seam.
//!
//! PDF parsing itself is an external collaborator: the engine only needs a
//! per-page text sequence plus the file's name and byte size. The default
//! implementation shells out to `pdftotext` (poppler) and splits its output
//! on form feeds; swap in another [`PdfExtractor`] for other formats or for
//! tests.

use std::path::Path;
use std::process::Command;

use tracing::{debug, warn};

use super::SourceError;

/// A document reduced to its extractable text, one string per page. A page's
/// text may be empty (scanned or image-only pages).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    /// File name used for citations and fingerprinting.
    pub name: String,
    /// File size in bytes, the second fingerprint component.
    pub size: u64,
    /// Per-page extracted text, in page order.
    pub pages: Vec<String>,
}

/// The external text-extraction collaborator.
pub trait PdfExtractor {
    /// Opens `path` and extracts per-page text. Fails only when the source
    /// cannot be opened or parsed at all; pages without text are returned as
    /// empty strings, never as errors.
    fn extract(&self, path: &Path) -> Result<ExtractedDocument, SourceError>;
}

/// Extractor backed by the `pdftotext` binary (poppler-utils).
///
/// `pdftotext` separates pages with form feeds in its stdout output, which
/// gives us the page boundaries the chunker needs without invoking the tool
/// once per page.
#[derive(Debug, Clone, Default)]
pub struct PdftotextExtractor;

impl PdftotextExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl PdfExtractor for PdftotextExtractor {
    fn extract(&self, path: &Path) -> Result<ExtractedDocument, SourceError> {
        let metadata = std::fs::metadata(path).map_err(|e| SourceError::Open {
            path: path.to_path_buf(),
            source: e,
        })?;

        let output = Command::new("pdftotext")
            .arg(path)
            .arg("-") // stdout
            .output()
            .map_err(|e| SourceError::Open {
                path: path.to_path_buf(),
                source: e,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(path = %path.display(), %stderr, "pdftotext failed");
            return Err(SourceError::ExtractionFailed {
                path: path.to_path_buf(),
                reason: stderr.trim().to_string(),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout);

        // pdftotext emits a trailing form feed after the last page.
        let mut pages: Vec<String> = text.split('\u{c}').map(str::to_string).collect();
        if pages.last().is_some_and(|p| p.trim().is_empty()) {
            pages.pop();
        }

        debug!(
            path = %path.display(),
            pages = pages.len(),
            bytes = metadata.len(),
            "Extracted document text"
        );

        Ok(ExtractedDocument {
            name: super::file_name(path),
            size: metadata.len(),
            pages,
        })
    }
}

/// In-memory extractor serving canned pages, keyed by file name.
#[cfg(any(test, feature = "mock"))]
#[derive(Debug, Clone, Default)]
pub struct MockExtractor {
    documents: std::collections::HashMap<String, ExtractedDocument>,
}

#[cfg(any(test, feature = "mock"))]
impl MockExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a document under `name` with the given pages. The fake byte
    /// size is derived from the total text length so distinct contents get
    /// distinct fingerprints.
    pub fn with_document(mut self, name: &str, pages: &[&str]) -> Self {
        let size: u64 = pages.iter().map(|p| p.len() as u64).sum();
        self.documents.insert(
            name.to_string(),
            ExtractedDocument {
                name: name.to_string(),
                size,
                pages: pages.iter().map(|p| p.to_string()).collect(),
            },
        );
        self
    }
}

#[cfg(any(test, feature = "mock"))]
impl PdfExtractor for MockExtractor {
    fn extract(&self, path: &Path) -> Result<ExtractedDocument, SourceError> {
        let name = super::file_name(path);
        self.documents
            .get(&name)
            .cloned()
            .ok_or_else(|| SourceError::Open {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
    }
}
