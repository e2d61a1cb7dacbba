//! End-to-end corpus build: markdown directory → chunks → embeddings → files → index.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use book_rag::{
    CorpusBuilder, CorpusFiles, EmbedRole, EmbeddingProvider, RagConfig, RagError, read_chapters,
};

/// Deterministic bag-of-letters embeddings so that texts sharing letters score higher.
struct LetterEmbedder {
    calls: AtomicUsize,
    fail_on: Option<usize>,
}

impl LetterEmbedder {
    fn new() -> Self {
        Self { calls: AtomicUsize::new(0), fail_on: None }
    }
}

#[async_trait]
impl EmbeddingProvider for LetterEmbedder {
    async fn embed(&self, text: &str, role: EmbedRole) -> book_rag::Result<Vec<f32>> {
        assert_eq!(role, EmbedRole::Document);
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on == Some(call) {
            return Err(RagError::EmbeddingError {
                provider: "letters".into(),
                message: "rate limited".into(),
            });
        }
        let mut v = vec![0.0f32; 26];
        for b in text.bytes().filter(u8::is_ascii_lowercase) {
            v[(b - b'a') as usize] += 1.0;
        }
        Ok(v)
    }

    fn name(&self) -> &str {
        "letters"
    }
}

fn write_book(dir: &std::path::Path) {
    std::fs::write(
        dir.join("02-anatomy.md"),
        "# The Anatomy of Git\n\nblobs trees commits refs objects hashes index staging",
    )
    .unwrap();
    std::fs::write(dir.join("01-chaos.md"), "# The Chaos of Final_v2\n\nfiles copies versions")
        .unwrap();
    std::fs::write(dir.join("notes.txt"), "ignored").unwrap();
}

#[tokio::test]
async fn builds_persists_and_reloads_corpus() {
    let book = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_book(book.path());

    let chapters = read_chapters(book.path()).unwrap();
    assert_eq!(chapters.len(), 2);
    assert_eq!(chapters[0].filename, "01-chaos.md");
    assert_eq!(chapters[1].title, "The Anatomy of Git");

    let config = RagConfig::builder().chunk_size(6).chunk_overlap(2).top_k(3).build().unwrap();
    let builder = CorpusBuilder::builder()
        .config(config)
        .embedding_provider(Arc::new(LetterEmbedder::new()))
        .build()
        .unwrap();

    let corpus = builder.build_corpus(&chapters).await.unwrap();
    assert_eq!(corpus.chunks.len(), corpus.embeddings.len());
    let ids: Vec<usize> = corpus.chunks.iter().map(|c| c.chunk_id).collect();
    assert_eq!(ids, (0..corpus.chunks.len()).collect::<Vec<_>>());
    assert_eq!(corpus.chunks[0].chapter_title, "The Chaos of Final_v2");

    let files = CorpusFiles::new(out.path());
    corpus.save(&files).unwrap();
    let index = files.load().unwrap();
    assert_eq!(index.len(), corpus.chunks.len());

    let query = corpus.embeddings[corpus.embeddings.len() - 1].clone();
    let hits = index.search(&query, 3).unwrap();
    assert_eq!(hits[0].chunk, corpus.chunks[corpus.chunks.len() - 1]);
}

#[tokio::test]
async fn embedding_failure_names_the_chunk() {
    let book = tempfile::tempdir().unwrap();
    write_book(book.path());
    let chapters = read_chapters(book.path()).unwrap();

    let embedder = Arc::new(LetterEmbedder { calls: AtomicUsize::new(0), fail_on: Some(1) });
    let builder = CorpusBuilder::builder().embedding_provider(embedder.clone()).build().unwrap();

    let err = builder.build_corpus(&chapters).await.unwrap_err();
    match err {
        RagError::PipelineError(message) => assert!(message.contains("chunk 1")),
        other => panic!("unexpected error: {other}"),
    }
    // One request per chunk, stopping at the first failure.
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn builder_requires_embedding_provider() {
    assert!(matches!(CorpusBuilder::builder().build(), Err(RagError::ConfigError(_))));
}

#[test]
fn missing_book_directory_is_io_error() {
    let err = read_chapters("/definitely/not/a/book").unwrap_err();
    assert!(matches!(err, RagError::Io { .. }));
}
