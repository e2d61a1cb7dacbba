//! # book-rag
//!
//! Retrieval over a single book: word-window chunking, Gemini embeddings,
//! persisted corpus files, and a brute-force cosine-similarity index.
//!
//! The corpus is built offline ([`CorpusBuilder`]) and written as two aligned
//! files ([`CorpusFiles`]). At query time the files are loaded once into an
//! immutable [`RetrievalIndex`] that is searched with a query embedding.
//!
//! ```rust,ignore
//! use book_rag::{CorpusFiles, EmbedRole, EmbeddingProvider};
//!
//! let index = CorpusFiles::new(".").load()?;
//! let query = embedder.embed("What is a branch?", EmbedRole::Query).await?;
//! for hit in index.search(&query, 3)? {
//!     println!("{:.3} {}", hit.score, hit.chunk.chapter_title);
//! }
//! ```

pub mod chunking;
pub mod config;
pub mod corpus;
pub mod document;
pub mod embedding;
pub mod error;
pub mod gemini;
pub mod index;
pub mod npy;
pub mod pipeline;

pub use chunking::{WordWindowChunker, WordWindows};
pub use config::{RagConfig, RagConfigBuilder};
pub use corpus::{CorpusFiles, CorpusStatus, EMBEDDINGS_FILE, METADATA_FILE};
pub use document::{Chapter, Chunk, SearchResult};
pub use embedding::{EmbedRole, EmbeddingProvider};
pub use error::{RagError, Result};
pub use gemini::GeminiEmbeddingProvider;
pub use index::RetrievalIndex;
pub use pipeline::{BuiltCorpus, CorpusBuilder, CorpusBuilderBuilder, read_chapters};
