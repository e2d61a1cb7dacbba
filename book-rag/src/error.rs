//! Error types for the `book-rag` crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building, loading, or querying the book corpus.
#[derive(Debug, Error)]
pub enum RagError {
    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The persisted corpus files are missing or unreadable.
    #[error("Corpus not built ({}): {message}", path.display())]
    CorpusNotBuilt {
        /// The file that could not be read.
        path: PathBuf,
        /// A description of the failure.
        message: String,
    },

    /// The persisted corpus files disagree with each other.
    #[error("Corpus mismatch: {0}")]
    CorpusMismatch(String),

    /// A query could not be scored against the corpus.
    #[error("Search error: {0}")]
    SearchError(String),

    /// The `.npy` embeddings file could not be decoded or encoded.
    #[error("NumPy format error: {0}")]
    NpyError(String),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An error in the corpus build pipeline.
    #[error("Pipeline error: {0}")]
    PipelineError(String),

    /// An I/O error outside of corpus loading (e.g. reading book sources).
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// The path being accessed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl RagError {
    pub(crate) fn embedding(provider: &str, message: impl Into<String>) -> Self {
        Self::EmbeddingError { provider: provider.to_string(), message: message.into() }
    }

    /// Returns `true` if this error means the corpus has not been built yet.
    pub fn is_corpus_not_built(&self) -> bool {
        matches!(self, Self::CorpusNotBuilt { .. })
    }
}

/// A convenience result type for corpus operations.
pub type Result<T> = std::result::Result<T, RagError>;
