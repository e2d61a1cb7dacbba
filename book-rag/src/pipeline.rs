//! Offline corpus build: read chapters → chunk → embed → persist.
//!
//! # Example
//!
//! ```rust,ignore
//! use book_rag::{CorpusBuilder, CorpusFiles, RagConfig, read_chapters};
//!
//! let builder = CorpusBuilder::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(embedder))
//!     .build()?;
//!
//! let chapters = read_chapters("../book_content")?;
//! let corpus = builder.build_corpus(&chapters).await?;
//! corpus.save(&CorpusFiles::new("."))?;
//! ```

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::{error, info};

use crate::chunking::WordWindowChunker;
use crate::config::RagConfig;
use crate::corpus::CorpusFiles;
use crate::document::{Chapter, Chunk};
use crate::embedding::{EmbedRole, EmbeddingProvider};
use crate::error::{RagError, Result};

/// Read every `*.md` file in `dir`, in filename order.
///
/// # Errors
///
/// Returns [`RagError::Io`] if the directory or a file cannot be read.
pub fn read_chapters(dir: impl AsRef<Path>) -> Result<Vec<Chapter>> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir).map_err(|source| RagError::Io { path: dir.into(), source })?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|source| RagError::Io { path: dir.into(), source })?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
            paths.push(path);
        }
    }
    paths.sort();

    paths
        .into_iter()
        .map(|path| {
            let content = fs::read_to_string(&path)
                .map_err(|source| RagError::Io { path: path.clone(), source })?;
            let filename = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            Ok(Chapter::from_markdown(filename, content))
        })
        .collect()
}

/// The chunks of a book with their embeddings, in corpus order.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltCorpus {
    /// Chunk metadata.
    pub chunks: Vec<Chunk>,
    /// One embedding per chunk.
    pub embeddings: Vec<Vec<f32>>,
}

impl BuiltCorpus {
    /// Persist both halves of the corpus.
    pub fn save(&self, files: &CorpusFiles) -> Result<()> {
        files.save(&self.chunks, &self.embeddings)
    }
}

/// Builds a [`BuiltCorpus`] from chapters. Construct one via [`CorpusBuilder::builder()`].
pub struct CorpusBuilder {
    config: RagConfig,
    chunker: WordWindowChunker,
    embedding_provider: Arc<dyn EmbeddingProvider>,
}

impl CorpusBuilder {
    /// Create a new [`CorpusBuilderBuilder`].
    pub fn builder() -> CorpusBuilderBuilder {
        CorpusBuilderBuilder::default()
    }

    /// Return a reference to the configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Chunk every chapter, numbering chunks sequentially across the book.
    pub fn chunk_chapters(&self, chapters: &[Chapter]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        for chapter in chapters {
            let chapter_chunks = self.chunker.chunk_chapter(chapter, chunks.len());
            info!(chapter = %chapter.title, chunk_count = chapter_chunks.len(), "chunked chapter");
            chunks.extend(chapter_chunks);
        }
        chunks
    }

    /// Chunk and embed all chapters.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::PipelineError`] naming the chunk whose embedding
    /// failed. Nothing is persisted by this method.
    pub async fn build_corpus(&self, chapters: &[Chapter]) -> Result<BuiltCorpus> {
        let chunks = self.chunk_chapters(chapters);
        let total = chunks.len();
        info!(chapter_count = chapters.len(), chunk_count = total, "embedding corpus");

        let mut embeddings = Vec::with_capacity(total);
        for chunk in &chunks {
            info!(chunk_id = chunk.chunk_id, total, "creating embedding");
            let embedding =
                self.embedding_provider.embed(&chunk.text, EmbedRole::Document).await.map_err(|e| {
                    error!(chunk_id = chunk.chunk_id, error = %e, "embedding failed");
                    RagError::PipelineError(format!(
                        "embedding failed for chunk {} ({}): {e}",
                        chunk.chunk_id, chunk.chapter_title
                    ))
                })?;
            embeddings.push(embedding);
        }

        Ok(BuiltCorpus { chunks, embeddings })
    }
}

/// Builder for constructing a [`CorpusBuilder`].
#[derive(Default)]
pub struct CorpusBuilderBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
}

impl CorpusBuilderBuilder {
    /// Set the chunking configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Build the [`CorpusBuilder`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if the embedding provider is missing
    /// or the chunk window is invalid. The configuration defaults to
    /// [`RagConfig::default()`].
    pub fn build(self) -> Result<CorpusBuilder> {
        let config = self.config.unwrap_or_default();
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::ConfigError("embedding_provider is required".to_string()))?;
        let chunker = WordWindowChunker::from_config(&config)?;
        Ok(CorpusBuilder { config, chunker, embedding_provider })
    }
}
