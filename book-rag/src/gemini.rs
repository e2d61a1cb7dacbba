//! Gemini embedding provider using the `embedContent` REST endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::embedding::{EmbedRole, EmbeddingProvider};
use crate::error::{RagError, Result};

/// The default Gemini API base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// The default embedding model.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-004";

const PROVIDER: &str = "Gemini";

/// An [`EmbeddingProvider`] backed by the Gemini embedding API.
///
/// [`EmbedRole::Document`] maps to the `RETRIEVAL_DOCUMENT` task type and
/// [`EmbedRole::Query`] to `RETRIEVAL_QUERY`.
///
/// # Example
///
/// ```rust,ignore
/// use book_rag::gemini::GeminiEmbeddingProvider;
///
/// let provider = GeminiEmbeddingProvider::new("your-api-key")?;
/// let embedding = provider.embed("hello world", EmbedRole::Query).await?;
/// ```
#[derive(Debug, Clone)]
pub struct GeminiEmbeddingProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiEmbeddingProvider {
    /// Create a new provider using the given API key and the default model.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(RagError::ConfigError("Gemini API key must not be empty".to_string()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Set the embedding model (with or without the `models/` prefix).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        self.model = model.strip_prefix("models/").map(str::to_string).unwrap_or(model);
        self
    }

    /// Point the provider at a different API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// The model name without the `models/` prefix.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:embedContent", self.base_url, self.model)
    }
}

// ── Gemini API request/response types ──────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum TaskType {
    RetrievalDocument,
    RetrievalQuery,
}

impl From<EmbedRole> for TaskType {
    fn from(role: EmbedRole) -> Self {
        match role {
            EmbedRole::Document => TaskType::RetrievalDocument,
            EmbedRole::Query => TaskType::RetrievalQuery,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedContentRequest<'a> {
    model: String,
    content: RequestContent<'a>,
    task_type: TaskType,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: [TextPart<'a>; 1],
}

#[derive(Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct EmbedContentResponse {
    embedding: ContentEmbedding,
}

#[derive(Deserialize)]
struct ContentEmbedding {
    #[serde(default)]
    values: Vec<f32>,
}

fn build_request<'a>(model: &str, text: &'a str, role: EmbedRole) -> EmbedContentRequest<'a> {
    EmbedContentRequest {
        model: format!("models/{model}"),
        content: RequestContent { parts: [TextPart { text }] },
        task_type: role.into(),
    }
}

fn parse_response(body: &str) -> Result<Vec<f32>> {
    let response: EmbedContentResponse = serde_json::from_str(body)
        .map_err(|e| RagError::embedding(PROVIDER, format!("failed to parse response: {e}")))?;
    if response.embedding.values.is_empty() {
        return Err(RagError::embedding(PROVIDER, "API returned an empty embedding"));
    }
    Ok(response.embedding.values)
}

// ── EmbeddingProvider implementation ───────────────────────────────

#[async_trait]
impl EmbeddingProvider for GeminiEmbeddingProvider {
    #[instrument(skip_all, fields(model = %self.model, ?role))]
    async fn embed(&self, text: &str, role: EmbedRole) -> Result<Vec<f32>> {
        debug!(provider = PROVIDER, text_len = text.len(), "embedding single text");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&build_request(&self.model, text, role))
            .send()
            .await
            .map_err(|e| {
                error!(provider = PROVIDER, error = %e, "request failed");
                RagError::embedding(PROVIDER, format!("request failed: {e}"))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "failed to read response body");
            RagError::embedding(PROVIDER, format!("failed to read response: {e}"))
        })?;

        if !status.is_success() {
            error!(provider = PROVIDER, %status, "API error");
            return Err(RagError::embedding(PROVIDER, format!("API returned {status}: {body}")));
        }

        parse_response(&body)
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_carries_task_type_per_role() {
        let doc = serde_json::to_value(build_request("text-embedding-004", "passage", EmbedRole::Document))
            .unwrap();
        assert_eq!(
            doc,
            json!({
                "model": "models/text-embedding-004",
                "content": {"parts": [{"text": "passage"}]},
                "taskType": "RETRIEVAL_DOCUMENT"
            })
        );

        let query =
            serde_json::to_value(build_request("text-embedding-004", "q", EmbedRole::Query)).unwrap();
        assert_eq!(query["taskType"], "RETRIEVAL_QUERY");
    }

    #[test]
    fn parses_embedding_values() {
        let values = parse_response(r#"{"embedding": {"values": [0.5, -0.25, 1.0]}}"#).unwrap();
        assert_eq!(values, vec![0.5, -0.25, 1.0]);
    }

    #[test]
    fn empty_or_malformed_output_is_an_embedding_error() {
        let empty = parse_response(r#"{"embedding": {"values": []}}"#).unwrap_err();
        assert!(matches!(empty, RagError::EmbeddingError { .. }));

        let malformed = parse_response(r#"{"error": "quota"}"#).unwrap_err();
        assert!(matches!(malformed, RagError::EmbeddingError { .. }));
    }

    #[test]
    fn model_prefix_is_normalized() {
        let provider =
            GeminiEmbeddingProvider::new("key").unwrap().with_model("models/embedding-001");
        assert_eq!(provider.model(), "embedding-001");
        assert_eq!(
            provider.with_base_url("http://localhost:9999/").endpoint(),
            "http://localhost:9999/models/embedding-001:embedContent"
        );
    }

    #[test]
    fn empty_api_key_is_a_config_error() {
        assert!(matches!(GeminiEmbeddingProvider::new("  "), Err(RagError::ConfigError(_))));
    }
}
