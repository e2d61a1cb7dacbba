//! Offline corpus builder: chapters → chunks → embeddings → `embeddings.npy` + `metadata.json`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use book_rag::{CorpusBuilder, CorpusFiles, GeminiEmbeddingProvider, RagConfig, read_chapters};
use clap::Parser;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "build-corpus", about = "Chunk and embed the book into the retrieval corpus")]
struct Cli {
    /// Directory of chapter markdown files (defaults to BOOK_CONTENT_DIR).
    #[arg(long)]
    content_dir: Option<PathBuf>,

    /// Output directory for the corpus files (defaults to BOOK_CORPUS_DIR).
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Words per chunk (defaults to BOOK_CHUNK_SIZE, else 600).
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Words shared by consecutive chunks (defaults to BOOK_CHUNK_OVERLAP, else 100).
    #[arg(long)]
    overlap: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = book_server::init()?;
    let cli = Cli::parse();

    let content_dir = cli.content_dir.unwrap_or_else(|| settings.content_dir.clone());
    let files = CorpusFiles::new(cli.out_dir.unwrap_or_else(|| settings.corpus_dir.clone()));

    let config = RagConfig::builder()
        .chunk_size(cli.chunk_size.unwrap_or(settings.rag.chunk_size))
        .chunk_overlap(cli.overlap.unwrap_or(settings.rag.chunk_overlap))
        .top_k(settings.rag.top_k)
        .build()?;
    let embedder = GeminiEmbeddingProvider::new(settings.api_key()?)?.with_model(&settings.embedding_model);
    let builder =
        CorpusBuilder::builder().config(config).embedding_provider(Arc::new(embedder)).build()?;

    let chapters = read_chapters(&content_dir)
        .with_context(|| format!("failed to read chapters from {}", content_dir.display()))?;
    info!(chapters = chapters.len(), dir = %content_dir.display(), "read chapters");

    let corpus = builder.build_corpus(&chapters).await?;
    corpus.save(&files)?;

    info!(
        chunks = corpus.chunks.len(),
        embeddings = %files.embeddings_path().display(),
        metadata = %files.metadata_path().display(),
        "corpus written"
    );
    Ok(())
}
