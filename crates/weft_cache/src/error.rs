//! Error types for cache operations.

use std::path::PathBuf;

/// Errors that can occur during cache operations.
///
/// Reads of persisted state are fail-safe and turn into cache misses; these
/// errors cover lookups of absent entries and failed writes.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// No entry is recorded for the artifact.
    #[error("no cache entry for artifact `{artifact}`")]
    NotFound {
        /// The artifact identity that was looked up.
        artifact: String,
    },

    /// An I/O error occurred while reading or writing cache files.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A serialization or deserialization error occurred.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },
}
