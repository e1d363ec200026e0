use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while opening or extracting a source document. Fatal to the
/// enclosing chunking call; never raised for empty or unextractable pages.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to open document {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("text extraction failed for {path}: {reason}")]
    ExtractionFailed { path: PathBuf, reason: String },
}
