//! Persisted corpus files.
//!
//! The corpus lives in two files in one directory: `embeddings.npy` holds an
//! `n × D` float matrix and `metadata.json` holds the `n` chunk records in the
//! same order. The files are only ever written together.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::document::Chunk;
use crate::error::{RagError, Result};
use crate::index::RetrievalIndex;
use crate::npy;

/// File name of the embedding matrix.
pub const EMBEDDINGS_FILE: &str = "embeddings.npy";

/// File name of the chunk metadata.
pub const METADATA_FILE: &str = "metadata.json";

/// Location of the persisted corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusFiles {
    dir: PathBuf,
}

/// Which corpus files are present on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorpusStatus {
    /// `embeddings.npy` exists.
    pub embeddings_ready: bool,
    /// `metadata.json` exists.
    pub metadata_ready: bool,
}

impl CorpusStatus {
    /// Both files are present.
    pub fn is_ready(&self) -> bool {
        self.embeddings_ready && self.metadata_ready
    }
}

impl CorpusFiles {
    /// Corpus files inside `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory holding the corpus.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the embeddings file.
    pub fn embeddings_path(&self) -> PathBuf {
        self.dir.join(EMBEDDINGS_FILE)
    }

    /// Path of the metadata file.
    pub fn metadata_path(&self) -> PathBuf {
        self.dir.join(METADATA_FILE)
    }

    /// Check which files exist without reading them.
    pub fn status(&self) -> CorpusStatus {
        CorpusStatus {
            embeddings_ready: self.embeddings_path().is_file(),
            metadata_ready: self.metadata_path().is_file(),
        }
    }

    /// Read both files and build a [`RetrievalIndex`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::CorpusNotBuilt`] if either file is missing or
    /// cannot be decoded, and [`RagError::CorpusMismatch`] if they are not
    /// aligned.
    pub fn load(&self) -> Result<RetrievalIndex> {
        let metadata_path = self.metadata_path();
        let metadata = fs::read(&metadata_path).map_err(|e| not_built(&metadata_path, e))?;
        let chunks: Vec<Chunk> =
            serde_json::from_slice(&metadata).map_err(|e| not_built(&metadata_path, e))?;

        let embeddings_path = self.embeddings_path();
        let bytes = fs::read(&embeddings_path).map_err(|e| not_built(&embeddings_path, e))?;
        let embeddings = npy::decode_matrix(&bytes).map_err(|e| not_built(&embeddings_path, e))?;

        let index = RetrievalIndex::build(chunks, embeddings)?;
        info!(
            dir = %self.dir.display(),
            chunk_count = index.len(),
            dimensions = index.dimensions(),
            "loaded corpus"
        );
        Ok(index)
    }

    /// Write both files.
    ///
    /// Each file is written under a temporary name first and then renamed, and
    /// the metadata file is renamed last, so an interrupted save never leaves
    /// a new embeddings file next to stale metadata that still parses.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::CorpusMismatch`] if the inputs are not aligned,
    /// and [`RagError::Io`] if writing fails.
    pub fn save(&self, chunks: &[Chunk], embeddings: &[Vec<f32>]) -> Result<()> {
        if chunks.len() != embeddings.len() {
            return Err(RagError::CorpusMismatch(format!(
                "{} metadata records but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }

        fs::create_dir_all(&self.dir).map_err(|source| io_error(&self.dir, source))?;

        let metadata = serde_json::to_vec_pretty(chunks)
            .map_err(|e| RagError::PipelineError(format!("failed to serialize metadata: {e}")))?;
        let matrix = npy::encode_matrix(embeddings)?;

        let embeddings_tmp = self.dir.join(format!("{EMBEDDINGS_FILE}.tmp"));
        let metadata_tmp = self.dir.join(format!("{METADATA_FILE}.tmp"));
        fs::write(&embeddings_tmp, matrix).map_err(|source| io_error(&embeddings_tmp, source))?;
        fs::write(&metadata_tmp, metadata).map_err(|source| io_error(&metadata_tmp, source))?;

        if let Err(e) = fs::remove_file(self.metadata_path()) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(error = %e, "could not remove previous metadata file");
            }
        }
        fs::rename(&embeddings_tmp, self.embeddings_path())
            .map_err(|source| io_error(&embeddings_tmp, source))?;
        fs::rename(&metadata_tmp, self.metadata_path())
            .map_err(|source| io_error(&metadata_tmp, source))?;

        info!(dir = %self.dir.display(), chunk_count = chunks.len(), "saved corpus");
        Ok(())
    }
}

fn not_built(path: &Path, err: impl std::fmt::Display) -> RagError {
    RagError::CorpusNotBuilt { path: path.to_path_buf(), message: err.to_string() }
}

fn io_error(path: &Path, source: std::io::Error) -> RagError {
    RagError::Io { path: path.to_path_buf(), source }
}
