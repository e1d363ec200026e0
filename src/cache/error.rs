use std::path::PathBuf;
use thiserror::Error;

/// Errors touching a per-document embedding store.
///
/// These never escape the cache: read failures degrade to an empty store
/// (recompute), write failures are logged and swallowed (persistence is
/// best-effort). The type exists so the internal helpers can report *why*
/// a store was skipped.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read embedding store {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("embedding store {path} is malformed: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write embedding store {path}: {reason}")]
    Write { path: PathBuf, reason: String },
}
