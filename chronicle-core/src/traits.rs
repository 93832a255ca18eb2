//! Collaborator trait definitions
//!
//! The orchestrator only talks to LLMs, search backends and extractors through these seams.

use crate::error::{ChronicleError, ChronicleResult};
use crate::types::*;
use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// Text completion service
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Complete a conversation and return the assistant text
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> ChronicleResult<String>;

    /// Complete a conversation and parse the answer as JSON matching `schema`
    async fn complete_json(
        &self,
        messages: Vec<ChatMessage>,
        schema: &serde_json::Value,
    ) -> ChronicleResult<serde_json::Value>;

    /// Provider name used in logs and health reports
    fn provider_name(&self) -> &str;

    /// Model name used in logs and health reports
    fn model_name(&self) -> &str;
}

/// Ask the provider for JSON and deserialize it into `T`
pub async fn complete_structured<T: DeserializeOwned>(
    provider: &dyn LlmProvider,
    messages: Vec<ChatMessage>,
    schema: &serde_json::Value,
) -> ChronicleResult<T> {
    let value = provider.complete_json(messages, schema).await?;
    serde_json::from_value(value).map_err(ChronicleError::from)
}

/// Cheap web search backend used by Tier 1
#[async_trait]
pub trait Tier1SearchProvider: Send + Sync {
    /// Return ranked hits for the query
    async fn search(&self, query: &str, max_results: usize) -> ChronicleResult<Vec<SearchHit>>;

    fn name(&self) -> &str;
}

/// Thorough, paid search backend used by Tier 2
#[async_trait]
pub trait Tier2SearchProvider: Send + Sync {
    /// Whether the backend is configured; calls while unavailable fail with `Tier2Unavailable`
    fn is_available(&self) -> bool;

    async fn search(&self, query: &str, max_results: usize) -> ChronicleResult<Vec<Source>>;

    /// Condensed textual context for the query, bounded by `max_tokens`
    async fn search_context(&self, query: &str, max_tokens: usize) -> ChronicleResult<String>;
}

/// HTML to text and metadata extraction
pub trait ContentExtractor: Send + Sync {
    /// Convert the main content of a page into markdown-ish text
    fn extract(&self, html: &str) -> ChronicleResult<String>;

    fn metadata(&self, html: &str) -> PageMetadata;
}

/// Decides whether a Tier 1 result must be escalated
pub trait EscalationStrategy: Send + Sync {
    fn evaluate(&self, result: &ResearchResult, query: &ResearchQuery) -> EscalationDecision;
}
