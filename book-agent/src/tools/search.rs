use std::sync::Arc;

use async_trait::async_trait;
use book_rag::{CorpusFiles, EmbedRole, EmbeddingProvider, RagError, RetrievalIndex, SearchResult};
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use super::{Tool, ToolError};

/// Passages returned per search.
pub const DEFAULT_TOP_K: usize = 3;

/// Semantic search over the book corpus.
///
/// The corpus is loaded once and shared read-only. If it could not be
/// loaded, the tool still registers and answers every call with a
/// [`ToolError::CorpusNotBuilt`] so the model can tell the user.
#[derive(Clone)]
pub struct SearchBookTool {
    index: Result<Arc<RetrievalIndex>, String>,
    embedder: Arc<dyn EmbeddingProvider>,
    top_k: usize,
}

impl SearchBookTool {
    pub fn new(index: Arc<RetrievalIndex>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { index: Ok(index), embedder, top_k: DEFAULT_TOP_K }
    }

    /// A tool whose corpus is unavailable for the given reason.
    pub fn without_corpus(reason: impl Into<String>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { index: Err(reason.into()), embedder, top_k: DEFAULT_TOP_K }
    }

    /// Load the persisted corpus, falling back to [`without_corpus`](Self::without_corpus).
    pub fn from_files(files: &CorpusFiles, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        match files.load() {
            Ok(index) => Self::new(Arc::new(index), embedder),
            Err(e) => {
                warn!(dir = %files.dir().display(), error = %e, "corpus unavailable; search will report it");
                Self::without_corpus(e.to_string(), embedder)
            }
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Passages returned per search.
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn is_ready(&self) -> bool {
        self.index.is_ok()
    }

    /// Embed `query`, retrieve the closest passages and format them for the model.
    pub async fn search_book_content(&self, query: &str) -> Result<String, ToolError> {
        let index = self.index.as_ref().map_err(|reason| ToolError::CorpusNotBuilt(reason.clone()))?;

        let embedding = self.embedder.embed(query, EmbedRole::Query).await.map_err(|e| match e {
            RagError::EmbeddingError { message, .. } => ToolError::Embedding(message),
            other => ToolError::Embedding(other.to_string()),
        })?;

        let hits = index.search(&embedding, self.top_k).map_err(|e| ToolError::Search(e.to_string()))?;
        debug!(query_len = query.len(), hits = hits.len(), "book search complete");
        Ok(format_hits(&hits))
    }
}

/// `[Chapter: <title>]\n<text>\n` per hit, separated by `\n---\n`.
fn format_hits(hits: &[SearchResult]) -> String {
    hits.iter()
        .map(|hit| format!("[Chapter: {}]\n{}\n", hit.chunk.chapter_title, hit.chunk.text))
        .collect::<Vec<_>>()
        .join("\n---\n")
}

#[async_trait]
impl Tool for SearchBookTool {
    fn name(&self) -> &str {
        "search_book_content"
    }

    fn description(&self) -> &str {
        "Search the Git book content using semantic search. Use this when user asks questions about Git, version control, GitHub, or any topic covered in the book."
    }

    fn parameters_schema(&self) -> Option<Value> {
        Some(json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The user's question or search query"
                }
            },
            "required": ["query"]
        }))
    }

    async fn execute(&self, args: &Map<String, Value>) -> Result<String, ToolError> {
        let query = args
            .get("query")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::InvalidArguments("missing required 'query' argument".into()))?;
        self.search_book_content(query).await
    }
}

impl std::fmt::Debug for SearchBookTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchBookTool")
            .field("corpus_ready", &self.is_ready())
            .field("embedder", &self.embedder.name())
            .field("top_k", &self.top_k)
            .finish()
    }
}
