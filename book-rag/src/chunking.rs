//! Word-window chunking of chapter text.
//!
//! Text is whitespace-normalized, split into words, and covered by windows of
//! `chunk_size` words that advance by `chunk_size - chunk_overlap` words. The
//! last window may be shorter than `chunk_size`; it is kept rather than dropped.

use crate::config::{RagConfig, validate_window};
use crate::document::{Chapter, Chunk};
use crate::error::Result;

/// Splits text into overlapping word windows.
///
/// # Example
///
/// ```rust,ignore
/// use book_rag::WordWindowChunker;
///
/// let chunker = WordWindowChunker::new(600, 100)?;
/// let pieces: Vec<String> = chunker.split(&text).collect();
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordWindowChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl WordWindowChunker {
    /// Create a chunker.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`](crate::RagError::ConfigError) if
    /// `chunk_size` is zero or `chunk_overlap >= chunk_size`, since the window
    /// would never advance.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        validate_window(chunk_size, chunk_overlap)?;
        Ok(Self { chunk_size, chunk_overlap })
    }

    /// Create a chunker from an already validated [`RagConfig`].
    pub fn from_config(config: &RagConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// Split `text` into chunks. The returned iterator is lazy and can be
    /// recreated any number of times from the same input.
    pub fn split<'a>(&self, text: &'a str) -> WordWindows<'a> {
        WordWindows {
            words: text.split_whitespace().collect(),
            chunk_size: self.chunk_size,
            stride: self.chunk_size - self.chunk_overlap,
            start: 0,
            done: false,
        }
    }

    /// Split a chapter into [`Chunk`]s, numbering them from `first_chunk_id`.
    pub fn chunk_chapter(&self, chapter: &Chapter, first_chunk_id: usize) -> Vec<Chunk> {
        self.split(&chapter.content)
            .enumerate()
            .map(|(chunk_index, text)| Chunk {
                chunk_id: first_chunk_id + chunk_index,
                chapter_title: chapter.title.clone(),
                source_filename: chapter.filename.clone(),
                chunk_index,
                text,
            })
            .collect()
    }
}

/// Iterator over the word windows of one text. Created by [`WordWindowChunker::split`].
#[derive(Debug, Clone)]
pub struct WordWindows<'a> {
    words: Vec<&'a str>,
    chunk_size: usize,
    stride: usize,
    start: usize,
    done: bool,
}

impl Iterator for WordWindows<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.done || self.start >= self.words.len() {
            return None;
        }
        let end = (self.start + self.chunk_size).min(self.words.len());
        let chunk = self.words[self.start..end].join(" ");
        if end == self.words.len() {
            self.done = true;
        } else {
            self.start += self.stride;
        }
        Some(chunk)
    }
}
