use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use book_agent::{
    AgentConfig, AgentError, BookAgent, ChapterListTool, Content, FunctionDeclaration,
    LanguageModel, SearchBookTool, Toolbox,
};
use book_rag::{Chunk, CorpusFiles, EmbedRole, EmbeddingProvider};
use book_server::{AppState, app_router};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

/// Requests one chapter listing, then answers; or fails every call.
struct StubModel {
    calls: AtomicUsize,
    fail: bool,
}

impl StubModel {
    fn new() -> Self {
        Self { calls: AtomicUsize::new(0), fail: false }
    }

    fn failing() -> Self {
        Self { calls: AtomicUsize::new(0), fail: true }
    }
}

#[async_trait]
impl LanguageModel for StubModel {
    fn name(&self) -> &str {
        "stub"
    }

    async fn generate(
        &self,
        contents: &[Content],
        _tools: &[FunctionDeclaration],
    ) -> book_agent::Result<Content> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AgentError::Model { model: "stub".into(), message: "quota exceeded".into() });
        }
        if call == 0 {
            return Ok(Content::model_tool_call("get_chapter_list", json!({})));
        }
        Ok(Content::model_text(format!("answered after {} messages", contents.len())))
    }
}

struct NoEmbedder;

#[async_trait]
impl EmbeddingProvider for NoEmbedder {
    async fn embed(&self, _text: &str, _role: EmbedRole) -> book_rag::Result<Vec<f32>> {
        Ok(vec![1.0])
    }

    fn name(&self) -> &str {
        "none"
    }
}

fn agent(model: Arc<StubModel>) -> Arc<BookAgent> {
    let search = SearchBookTool::without_corpus("not built", Arc::new(NoEmbedder));
    let toolbox = Toolbox::book(search, ChapterListTool::default());
    Arc::new(BookAgent::new(model, toolbox, AgentConfig::default()))
}

fn router(agent: Option<Arc<BookAgent>>, corpus_dir: &std::path::Path) -> Router {
    app_router(AppState::new(agent, CorpusFiles::new(corpus_dir)))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_chat(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/chat")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn chat_answers_and_echoes_conversation_id() {
    let dir = tempfile::tempdir().unwrap();
    let model = Arc::new(StubModel::new());
    let app = router(Some(agent(model.clone())), dir.path());

    let (status, body) =
        send(app, post_chat(json!({"message": "What chapters?", "conversation_id": "abc-123"}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "answered after 3 messages");
    assert_eq!(body["conversation_id"], "abc-123");
    assert_eq!(model.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn empty_message_is_rejected_without_calling_the_model() {
    let dir = tempfile::tempdir().unwrap();
    let model = Arc::new(StubModel::new());
    let app = router(Some(agent(model.clone())), dir.path());

    let (status, body) = send(app, post_chat(json!({"message": "   \n"}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"detail": "Message cannot be empty"}));
    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn chat_without_agent_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = send(router(None, dir.path()), post_chat(json!({"message": "hi"}))).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["detail"], "Agent not initialized");
}

#[tokio::test]
async fn model_failure_is_internal_error() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(Some(agent(Arc::new(StubModel::failing()))), dir.path());

    let (status, body) = send(app, post_chat(json!({"message": "hi"}))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.starts_with("Error processing message: "), "{detail}");
    assert!(detail.contains("quota exceeded"), "{detail}");
}

#[tokio::test]
async fn health_reports_missing_corpus() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) =
        send(router(Some(agent(Arc::new(StubModel::new()))), dir.path()), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "status": "unhealthy",
            "agent_initialized": true,
            "embeddings_ready": false,
            "metadata_ready": false
        })
    );
}

#[tokio::test]
async fn health_is_healthy_with_agent_and_corpus() {
    let dir = tempfile::tempdir().unwrap();
    let chunk = Chunk {
        chunk_id: 0,
        chapter_title: "The Anatomy of Git".into(),
        source_filename: "02.md".into(),
        chunk_index: 0,
        text: "Git stores snapshots.".into(),
    };
    CorpusFiles::new(dir.path()).save(&[chunk], &[vec![0.5, 0.5]]).unwrap();

    let (_, body) =
        send(router(Some(agent(Arc::new(StubModel::new()))), dir.path()), get("/health")).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["embeddings_ready"], true);
    assert_eq!(body["metadata_ready"], true);

    let (_, body) = send(router(None, dir.path()), get("/health")).await;
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["agent_initialized"], false);
}

#[tokio::test]
async fn chapters_lists_six_titles_even_without_agent() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = send(router(None, dir.path()), get("/chapters")).await;

    assert_eq!(status, StatusCode::OK);
    let chapters = body["chapters"].as_str().unwrap();
    assert_eq!(chapters.lines().count(), 6);
    assert!(chapters.starts_with("1. Chapter 1: "));
}

#[tokio::test]
async fn root_describes_service() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = send(router(None, dir.path()), get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "running");
    assert_eq!(body["service"], "Git Book Agent API");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn serves_over_tcp_with_permissive_cors() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(None, dir.path());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server run");
    });

    let response = reqwest::Client::new()
        .get(format!("http://{addr}/chapters"))
        .header("origin", "http://localhost:3000")
        .send()
        .await
        .expect("chapters response");

    assert!(response.status().is_success());
    assert_eq!(
        response.headers().get("access-control-allow-origin").and_then(|v| v.to_str().ok()),
        Some("*")
    );

    handle.abort();
}
