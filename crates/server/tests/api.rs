//! HTTP API behavior with in-process ports.

use assist_core::config::PortTimeouts;
use assist_core::{AppConfig, AppError, AppResult, Port, RagConfig};
use assist_knowledge::embeddings::providers::MockProvider;
use assist_knowledge::embeddings::EmbeddingProvider;
use assist_knowledge::rag::{GenerationSettings, PipelinePorts, PromptSet};
use assist_knowledge::{DocumentChunk, MemoryIndex, QueryPipeline};
use assist_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use assist_server::{build_router, ServerState};
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

struct StaticGenerator {
    reply: AppResult<String>,
}

#[async_trait::async_trait]
impl LlmClient for StaticGenerator {
    fn provider_name(&self) -> &str {
        "static"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        match &self.reply {
            Ok(content) => Ok(LlmResponse {
                content: content.clone(),
                model: request.model.clone(),
                usage: LlmUsage::default(),
            }),
            Err(_) => Err(AppError::port(Port::Generation, "connection refused")),
        }
    }
}

async fn app(reply: AppResult<String>) -> Router {
    let embedder = Arc::new(MockProvider::new(128));
    let text = "To reset your password open the login page and choose forgot password.";
    let chunk = DocumentChunk::new("faq-0", text, embedder.embed(text).await.unwrap())
        .with_metadata(json!({ "source": "faq.md" }));

    let config = AppConfig::default();
    let rag = RagConfig {
        rag_score_threshold: 0.1,
        ..RagConfig::default()
    };
    let timeouts = PortTimeouts::default();

    let pipeline = QueryPipeline::new(
        rag,
        PipelinePorts {
            embedder,
            index: Arc::new(MemoryIndex::with_chunks(vec![chunk])),
            generator: Arc::new(StaticGenerator { reply }),
        },
        PromptSet::builtin().unwrap(),
        GenerationSettings::from_config(&config.llm, &timeouts),
        &timeouts,
    )
    .unwrap();

    build_router(Arc::new(ServerState::new(pipeline, &config))).unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_reports_models() {
    let (status, body) = send(app(Ok("unused".to_string())).await, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["llm_model"], "llama3.1:8b");
    assert_eq!(body["embed_model"], "nomic-embed-text");
}

#[tokio::test]
async fn test_get_query_returns_answer_with_sources() {
    let app = app(Ok("Choose Forgot password on the login page.".to_string())).await;
    let (status, body) = send(app, get("/query?q=How%20do%20I%20reset%20my%20password%3F")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "Choose Forgot password on the login page.");
    assert_eq!(body["sources"][0]["source"], "faq.md");
    assert!(body["sources"][0]["score"].as_f64().unwrap() > 0.1);
    assert!(body.get("route").is_none());
}

#[tokio::test]
async fn test_post_query() {
    let app = app(Ok("Hello! How can I help?".to_string())).await;
    let (status, body) = send(app, post_json("/query", json!({ "query": "hello" }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "Hello! How can I help?");
    assert_eq!(body["sources"], json!([]));
}

#[tokio::test]
async fn test_blank_query_prompts_for_input() {
    let app = app(Ok("unused".to_string())).await;
    let (status, body) = send(app, get("/query?q=%20%20")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "Please provide a question.");
}

#[tokio::test]
async fn test_missing_query_param_prompts_for_input() {
    let (status, body) = send(app(Ok("unused".to_string())).await, get("/query")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "Please provide a question.");
}

#[tokio::test]
async fn test_generation_outage_is_503() {
    let app = app(Err(AppError::Other("down".to_string()))).await;
    let (status, body) = send(app, post_json("/query", json!({ "query": "hello" }))).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["port"], "generation");
    assert!(body["error"].as_str().unwrap().contains("connection refused"));
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (status, body) = send(app(Ok("unused".to_string())).await, get("/nope")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found");
}
