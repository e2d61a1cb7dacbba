use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use book_agent::{BookAgent, ChapterList, ChapterListTool, GeminiModel, SearchBookTool, Toolbox};
use book_rag::{CorpusFiles, EmbeddingProvider, GeminiEmbeddingProvider};
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};

use crate::config::Settings;

pub const SERVICE_NAME: &str = "Git Book Agent API";

#[derive(Clone, Debug)]
pub struct AppState {
    /// `None` when the agent could not be initialized; `/chat` then answers 503.
    pub agent: Option<Arc<BookAgent>>,
    pub chapters: ChapterList,
    pub corpus: CorpusFiles,
}

impl AppState {
    pub fn new(agent: Option<Arc<BookAgent>>, corpus: CorpusFiles) -> Self {
        let chapters = agent
            .as_ref()
            .map(|agent| agent.config().chapters.clone())
            .unwrap_or_default();
        Self { agent, chapters, corpus }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub conversation_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub agent_initialized: bool,
    pub embeddings_ready: bool,
    pub metadata_ready: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub status: String,
    pub service: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChaptersResponse {
    pub chapters: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, detail: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse { detail: detail.into() }))
}

pub fn app_router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/chat", post(chat))
        .route("/chapters", get(chapters))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Build the agent from settings: Gemini model, Gemini query embeddings, and
/// the corpus loaded once from `settings.corpus_dir`.
///
/// A missing corpus is not an error here; search reports it to the model.
pub fn build_agent(settings: &Settings) -> anyhow::Result<BookAgent> {
    let api_key = settings.api_key()?;
    let config = settings.agent_config();

    let embedder = GeminiEmbeddingProvider::new(api_key)
        .context("failed to create embedding client")?
        .with_model(&settings.embedding_model);
    let search = search_tool(settings, Arc::new(embedder));
    let toolbox = Toolbox::book(search, ChapterListTool::new(config.chapters.clone()));

    let model = GeminiModel::new(api_key)
        .context("failed to create model client")?
        .with_model(&config.model)
        .with_generation_config(config.generation);

    info!(model = %config.model, "agent initialized");
    Ok(BookAgent::new(Arc::new(model), toolbox, config))
}

fn search_tool(settings: &Settings, embedder: Arc<dyn EmbeddingProvider>) -> SearchBookTool {
    SearchBookTool::from_files(&CorpusFiles::new(&settings.corpus_dir), embedder)
        .with_top_k(settings.rag.top_k)
}

pub async fn run_server(settings: Settings) -> anyhow::Result<()> {
    let agent = match build_agent(&settings) {
        Ok(agent) => Some(Arc::new(agent)),
        Err(e) => {
            error!(error = %e, "failed to initialize agent; /chat will answer 503");
            None
        }
    };
    let state = AppState::new(agent, CorpusFiles::new(&settings.corpus_dir));
    let app = app_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.host, settings.port)
        .parse()
        .with_context(|| "invalid host/port for book-server")?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("book-server listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        status: "running".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let corpus = state.corpus.status();
    let agent_initialized = state.agent.is_some();
    let healthy = agent_initialized && corpus.is_ready();

    Json(HealthResponse {
        status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
        agent_initialized,
        embeddings_ready: corpus.embeddings_ready,
        metadata_ready: corpus.metadata_ready,
    })
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Some(agent) = state.agent.as_ref() else {
        return Err(api_error(StatusCode::SERVICE_UNAVAILABLE, "Agent not initialized"));
    };

    if request.message.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Message cannot be empty"));
    }

    let reply = agent.chat(&request.message).await.map_err(|e| {
        error!(error = %e, "chat turn failed");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("Error processing message: {e}"))
    })?;

    if reply.outcome == book_agent::TurnOutcome::Exhausted {
        warn!(tool_calls = reply.tool_calls, "answer returned after tool-call limit");
    }
    info!(outcome = ?reply.outcome, tool_calls = reply.tool_calls, "chat answered");

    Ok(Json(ChatResponse { response: reply.text, conversation_id: request.conversation_id }))
}

async fn chapters(State(state): State<AppState>) -> Json<ChaptersResponse> {
    Json(ChaptersResponse { chapters: state.chapters.render() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_tool_uses_configured_top_k() {
        let dir = tempfile::tempdir().unwrap();
        let corpus_dir = dir.path().display().to_string();
        let settings = Settings::from_lookup(|key| match key {
            "BOOK_CORPUS_DIR" => Some(corpus_dir.clone()),
            "BOOK_SEARCH_TOP_K" => Some("7".into()),
            _ => None,
        })
        .unwrap();

        let embedder = Arc::new(GeminiEmbeddingProvider::new("test-key").unwrap());
        let tool = search_tool(&settings, embedder);
        assert_eq!(tool.top_k(), 7);
        assert!(!tool.is_ready());
    }
}
