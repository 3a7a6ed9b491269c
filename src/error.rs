//! Error handling types and utilities.

use std::path::PathBuf;

/// A specialized Result type for sphinx-search plumbing.
///
/// This is an alias for `anyhow::Result` with context added via `.context()` and
/// `.with_context()` methods in the binary and server layers. Engine operations
/// never return it: bad queries and bad HTML degrade to empty output instead.
pub type Result<T> = anyhow::Result<T>;

/// Error returned when loading a serialized search index fails.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The index file could not be read.
    #[error("failed to read search index at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The payload is not valid JSON (after stripping any `Search.setIndex(...)` wrapper).
    #[error("search index is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error returned when fetching a document's rendered HTML fails.
///
/// Fetch failures are isolated per result: callers turn them into a missing
/// preview rather than propagating them.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("document '{docname}' not found at {}", path.display())]
    NotFound { docname: String, path: PathBuf },
    #[error("failed to read document '{docname}': {source}")]
    Io {
        docname: String,
        #[source]
        source: std::io::Error,
    },
}

/// Error returned when a configuration file cannot be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
