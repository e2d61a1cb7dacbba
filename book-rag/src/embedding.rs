//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Why a text is being embedded.
///
/// The remote service weights document and query embeddings differently, so
/// the role travels with every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmbedRole {
    /// A corpus passage embedded at indexing time.
    Document,
    /// A user query embedded at search time.
    Query,
}

/// A provider that generates vector embeddings from text input.
///
/// No retry policy is applied; callers that want one wrap the provider.
///
/// # Example
///
/// ```rust,ignore
/// use book_rag::{EmbedRole, EmbeddingProvider};
///
/// let embedding = provider.embed("what is a commit?", EmbedRole::Query).await?;
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str, role: EmbedRole) -> Result<Vec<f32>>;

    /// Name used in logs and error messages.
    fn name(&self) -> &str;
}
