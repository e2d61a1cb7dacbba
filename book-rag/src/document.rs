//! Data types for chapters, chunks, and search results.

use serde::{Deserialize, Serialize};

/// A chapter of the book as read from its markdown source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    /// The chapter title, taken from the first level-one heading.
    pub title: String,
    /// The markdown file the chapter was read from.
    pub filename: String,
    /// The raw markdown content.
    pub content: String,
}

impl Chapter {
    /// Create a chapter, deriving its title from the first level-one heading
    /// and falling back to the filename.
    pub fn from_markdown(filename: impl Into<String>, content: impl Into<String>) -> Self {
        let filename = filename.into();
        let content = content.into();
        let title = content
            .lines()
            .find_map(heading_text)
            .map(str::to_string)
            .unwrap_or_else(|| filename.clone());
        Self { title, filename, content }
    }
}

/// The text of a `#` heading: one `#`, at least one whitespace character, then a title.
fn heading_text(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('#')?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest.trim()).filter(|title| !title.is_empty())
}

/// One retrievable slice of a chapter.
///
/// Serialized with the field names of the persisted `metadata.json` file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    /// Sequential identifier, unique across the corpus.
    pub chunk_id: usize,
    /// Title of the chapter this chunk belongs to.
    #[serde(rename = "chapter")]
    pub chapter_title: String,
    /// Markdown file the chapter was read from.
    #[serde(rename = "filename")]
    pub source_filename: String,
    /// Position of this chunk within its chapter.
    pub chunk_index: usize,
    /// The chunk text.
    #[serde(rename = "content")]
    pub text: String,
}

/// A retrieved [`Chunk`] paired with its cosine similarity score.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// The similarity score (higher is more relevant).
    pub score: f32,
}
