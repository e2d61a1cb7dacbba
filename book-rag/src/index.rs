//! Brute-force cosine-similarity index over the loaded corpus.
//!
//! [`RetrievalIndex`] holds the chunk metadata and the embedding matrix side by
//! side, so `embeddings[i]` always describes `chunks[i]`. It is immutable once
//! built and can be shared across requests behind an `Arc` without locking.

use std::cmp::Ordering;

use tracing::debug;

use crate::document::{Chunk, SearchResult};
use crate::error::{RagError, Result};

/// An immutable in-memory index of the book corpus.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalIndex {
    chunks: Vec<Chunk>,
    embeddings: Vec<Vec<f32>>,
    norms: Vec<f64>,
    dimensions: usize,
}

impl RetrievalIndex {
    /// Build an index from positionally aligned metadata and embeddings.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::CorpusMismatch`] if the two sequences differ in
    /// length or the embeddings do not all share one dimension.
    pub fn build(chunks: Vec<Chunk>, embeddings: Vec<Vec<f32>>) -> Result<Self> {
        if chunks.len() != embeddings.len() {
            return Err(RagError::CorpusMismatch(format!(
                "{} metadata records but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }

        let dimensions = embeddings.first().map_or(0, Vec::len);
        if let Some((row, embedding)) =
            embeddings.iter().enumerate().find(|(_, e)| e.len() != dimensions)
        {
            return Err(RagError::CorpusMismatch(format!(
                "embedding {row} has {} dimensions, expected {dimensions}",
                embedding.len()
            )));
        }

        let norms = embeddings.iter().map(|e| magnitude(e)).collect();
        debug!(chunk_count = chunks.len(), dimensions, "built retrieval index");
        Ok(Self { chunks, embeddings, norms, dimensions })
    }

    /// Number of chunks in the index.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Returns `true` if the index holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Embedding dimension (0 for an empty index).
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// The indexed chunks in corpus order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// The embedding rows in corpus order.
    pub fn embeddings(&self) -> &[Vec<f32>] {
        &self.embeddings
    }

    /// Return the `k` chunks most similar to `query`, best first.
    ///
    /// Zero-magnitude vectors score `f32::NEG_INFINITY`. Equal scores keep
    /// corpus order.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::SearchError`] if the query dimension differs from
    /// the corpus dimension.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        if self.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dimensions {
            return Err(RagError::SearchError(format!(
                "query has {} dimensions, corpus has {}",
                query.len(),
                self.dimensions
            )));
        }

        let query_norm = magnitude(query);
        let mut scored: Vec<(usize, f32)> = self
            .embeddings
            .iter()
            .zip(&self.norms)
            .map(|(embedding, &norm)| cosine_similarity(embedding, norm, query, query_norm))
            .enumerate()
            .collect();

        // `sort_by` is stable, so ties stay in corpus order.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(i, score)| SearchResult { chunk: self.chunks[i].clone(), score })
            .collect())
    }
}

// Accumulated in f64: squares of tiny f32 components underflow to zero in f32.
fn magnitude(v: &[f32]) -> f64 {
    v.iter().map(|&x| f64::from(x) * f64::from(x)).sum::<f64>().sqrt()
}

/// Cosine similarity with precomputed magnitudes. Degenerate inputs rank last.
fn cosine_similarity(a: &[f32], norm_a: f64, b: &[f32], norm_b: f64) -> f32 {
    if norm_a == 0.0 || norm_b == 0.0 {
        return f32::NEG_INFINITY;
    }
    let dot: f64 = a.iter().zip(b).map(|(&x, &y)| f64::from(x) * f64::from(y)).sum();
    let score = (dot / norm_a / norm_b) as f32;
    if score.is_nan() { f32::NEG_INFINITY } else { score }
}
