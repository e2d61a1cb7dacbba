//! The language model seam.

use async_trait::async_trait;

use crate::content::{Content, FunctionDeclaration};
use crate::error::Result;

/// A hosted chat model that can request tool calls.
///
/// Implementations are stateless between calls: the full conversation is
/// passed on every request.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Model identifier, used in logs and error messages.
    fn name(&self) -> &str;

    /// Produce the next model message for `contents`, offering `tools`.
    async fn generate(&self, contents: &[Content], tools: &[FunctionDeclaration]) -> Result<Content>;
}
