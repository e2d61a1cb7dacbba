//! Gemini chat model using the `generateContent` REST endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{Span, debug, error, instrument};

use crate::config::{DEFAULT_MODEL, GenerationConfig};
use crate::content::{Content, FunctionDeclaration, Role};
use crate::error::{AgentError, Result};
use crate::model::LanguageModel;

/// The default Gemini API base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// A [`LanguageModel`] backed by Gemini with function calling enabled.
///
/// Automatic function calling is never requested: every function call is
/// returned to the caller, which runs the tool and sends the result back.
#[derive(Debug, Clone)]
pub struct GeminiModel {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    generation: GenerationConfig,
}

impl GeminiModel {
    /// Create a client for the default model.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AgentError::Config("API key must not be empty".into()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            generation: GenerationConfig::default(),
        })
    }

    /// Use a different model (with or without the `models/` prefix).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        self.model = model.strip_prefix("models/").map(str::to_string).unwrap_or(model);
        self
    }

    pub fn with_generation_config(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn model_error(&self, message: impl Into<String>) -> AgentError {
        AgentError::Model { model: self.model.clone(), message: message.into() }
    }
}

// ── Wire types ─────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: &'a [Content],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolSet<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolSet<'a> {
    function_declarations: &'a [FunctionDeclaration],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerationResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
    total_token_count: Option<u32>,
}

fn build_request<'a>(
    contents: &'a [Content],
    tools: &'a [FunctionDeclaration],
    generation: GenerationConfig,
) -> GenerateContentRequest<'a> {
    let tools = if tools.is_empty() {
        Vec::new()
    } else {
        vec![ToolSet { function_declarations: tools }]
    };
    GenerateContentRequest { contents, tools, generation_config: generation }
}

/// Extract the first candidate's content.
///
/// A candidate without content (e.g. stopped for `MAX_TOKENS` before any
/// output) decodes as an empty model message.
fn first_candidate(response: GenerationResponse) -> std::result::Result<Content, String> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates returned".to_string());
        return Err(format!("response blocked: {reason}"));
    };

    if let Some(reason) = &candidate.finish_reason {
        debug!(finish_reason = %reason, "candidate finished");
    }

    let mut content =
        candidate.content.unwrap_or(Content { role: Some(Role::Model), parts: Vec::new() });
    content.role.get_or_insert(Role::Model);
    Ok(content)
}

// ── LanguageModel implementation ───────────────────────────────────

#[async_trait]
impl LanguageModel for GeminiModel {
    fn name(&self) -> &str {
        &self.model
    }

    #[instrument(skip_all, fields(
        model = %self.model,
        messages.count = contents.len(),
        tools.count = tools.len(),
        usage.prompt_tokens,
        usage.candidates_tokens,
        usage.total_tokens,
    ))]
    async fn generate(&self, contents: &[Content], tools: &[FunctionDeclaration]) -> Result<Content> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&build_request(contents, tools, self.generation))
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "request failed");
                self.model_error(format!("request failed: {e}"))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!(error = %e, "failed to read response body");
            self.model_error(format!("failed to read response: {e}"))
        })?;

        if !status.is_success() {
            error!(%status, "API error");
            return Err(self.model_error(format!("API returned {status}: {body}")));
        }

        let response: GenerationResponse = serde_json::from_str(&body)
            .map_err(|e| AgentError::MalformedResponse(e.to_string()))?;

        if let Some(usage) = &response.usage_metadata {
            Span::current()
                .record("usage.prompt_tokens", usage.prompt_token_count)
                .record("usage.candidates_tokens", usage.candidates_token_count)
                .record("usage.total_tokens", usage.total_token_count);
        }

        first_candidate(response).map_err(|message| self.model_error(message))
    }
}
