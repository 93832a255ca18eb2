//! Shared test fixtures: an app wired to in-memory collaborators

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use chronicle_core::{
    ChatMessage, ChronicleError, ChronicleResult, CompletionOptions, LlmErrorKind, LlmProvider,
    ResearchTier, SearchHit, Settings, Source, Tier1SearchProvider, Tier2SearchProvider,
};
use chronicle_research::{
    EscalationConfig, OrchestratorConfig, QualityEvaluator, ResearchOrchestrator,
    ResearchServices,
};
use chronicle_web::{create_app, AppState};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

pub struct StubTier1;

#[async_trait]
impl Tier1SearchProvider for StubTier1 {
    async fn search(&self, _query: &str, max_results: usize) -> ChronicleResult<Vec<SearchHit>> {
        Ok((1..=2)
            .take(max_results)
            .map(|i| SearchHit {
                title: format!("Archive entry {}", i),
                url: format!("https://archive.example.org/{}", i),
                snippet: format!("Snippet {}", i),
            })
            .collect())
    }

    fn name(&self) -> &str {
        "stub-tier1"
    }
}

pub struct StubTier2 {
    pub available: bool,
}

#[async_trait]
impl Tier2SearchProvider for StubTier2 {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn search(&self, _query: &str, max_results: usize) -> ChronicleResult<Vec<Source>> {
        if !self.available {
            return Err(ChronicleError::tier2_unavailable("no key"));
        }
        Ok((1..=3)
            .take(max_results)
            .map(|i| {
                Source::new(
                    format!("https://library.example.edu/{}", i),
                    format!("Deep source {}", i),
                )
                .with_tier(ResearchTier::Tier2)
                .with_credibility(0.8)
            })
            .collect())
    }

    async fn search_context(&self, _query: &str, _max_tokens: usize) -> ChronicleResult<String> {
        Ok("Extended context".to_string())
    }
}

pub struct StubLlm;

#[async_trait]
impl LlmProvider for StubLlm {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        _options: CompletionOptions,
    ) -> ChronicleResult<String> {
        let prompt = messages.last().map(|m| m.content.clone()).unwrap_or_default();
        if prompt.contains("Search context:") {
            Ok("Deep synthesis of the period.".to_string())
        } else {
            Ok("The treaty was signed in 1648.".to_string())
        }
    }

    async fn complete_json(
        &self,
        _messages: Vec<ChatMessage>,
        _schema: &serde_json::Value,
    ) -> ChronicleResult<serde_json::Value> {
        Err(ChronicleError::llm(LlmErrorKind::Failure, "stub", "no json"))
    }

    fn provider_name(&self) -> &str {
        "stub"
    }

    fn model_name(&self) -> &str {
        "stub-1"
    }
}

pub fn test_app(tier2_available: bool) -> Router {
    let orchestrator = ResearchOrchestrator::new(
        Arc::new(StubTier1),
        Arc::new(StubTier2 {
            available: tier2_available,
        }),
        Arc::new(StubLlm),
        Arc::new(QualityEvaluator::new(EscalationConfig::default())),
        OrchestratorConfig::default(),
    );
    let services = ResearchServices::new(orchestrator, true);
    create_app(AppState::from_parts(Settings::default(), services))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

pub async fn send(app: Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();

    TestResponse {
        status,
        content_type,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> TestResponse {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn get(app: Router, uri: &str) -> TestResponse {
    send(app, Method::GET, uri, None).await
}
