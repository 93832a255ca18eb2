//! LLM client integration using siumai
//!
//! One client type covers every supported provider. The siumai client is built lazily on
//! first use so that a missing API key only fails the calls that need it.

use crate::json::{extract_json, json_instruction};
use chronicle_core::{
    async_trait, log_llm_request, retry_async, with_timeout, ChatMessage, ChatRole, ChronicleError,
    ChronicleResult, CompletionOptions, LlmConfig, LlmErrorKind, LlmProvider, LlmProviderConfig,
    RetryConfig,
};
use futures::FutureExt;
use siumai::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// OpenAI-compatible endpoint used for OpenRouter
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
/// OpenAI-compatible endpoint used for Gemini
pub const GEMINI_OPENAI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
/// Upper bound for a single chat round trip
pub const LLM_REQUEST_TIMEOUT_MS: u64 = 120_000;

type SharedClient = Arc<dyn LlmClient + Send + Sync>;

/// `LlmProvider` backed by siumai
pub struct SiumaiLlmClient {
    config: LlmConfig,
    client: OnceCell<SharedClient>,
    retry: RetryConfig,
}

impl SiumaiLlmClient {
    pub fn new(config: LlmConfig) -> Self {
        info!(
            "Configured LLM client for provider: {} with model: {}",
            config.provider.provider_name(),
            config.provider.model()
        );

        Self {
            config,
            client: OnceCell::new(),
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    async fn default_client(&self) -> ChronicleResult<SharedClient> {
        let client = self
            .client
            .get_or_try_init(|| {
                build_client(
                    &self.config.provider,
                    self.config.temperature,
                    self.config.max_tokens,
                )
            })
            .await?;
        Ok(client.clone())
    }

    /// Reuse the cached client unless the call overrides sampling parameters
    async fn client_for(&self, options: &CompletionOptions) -> ChronicleResult<SharedClient> {
        let temperature = options.temperature.unwrap_or(self.config.temperature);
        let max_tokens = options.max_tokens.unwrap_or(self.config.max_tokens);

        if temperature == self.config.temperature && max_tokens == self.config.max_tokens {
            self.default_client().await
        } else {
            debug!(temperature, max_tokens, "Building one-off LLM client for call options");
            build_client(&self.config.provider, temperature, max_tokens).await
        }
    }
}

/// Build the siumai client for a provider configuration
async fn build_client(
    provider: &LlmProviderConfig,
    temperature: f32,
    max_tokens: u32,
) -> ChronicleResult<SharedClient> {
    let name = provider.provider_name();
    let build_error =
        |e: LlmError| ChronicleError::llm(LlmErrorKind::Failure, name, format!("Failed to build client: {}", e));

    let client: SharedClient = match provider {
        LlmProviderConfig::OpenAi {
            api_key,
            model,
            base_url,
        } => {
            let api_key = api_key
                .as_deref()
                .ok_or_else(|| ChronicleError::missing_credentials(name))?;

            let mut builder = LlmBuilder::new()
                .openai()
                .api_key(api_key)
                .model(model)
                .temperature(temperature)
                .max_tokens(max_tokens);

            if let Some(base_url) = base_url {
                builder = builder.base_url(base_url);
            }

            Arc::new(builder.build().await.map_err(build_error)?)
        }
        LlmProviderConfig::Anthropic { api_key, model } => {
            let api_key = api_key
                .as_deref()
                .ok_or_else(|| ChronicleError::missing_credentials(name))?;

            let client = LlmBuilder::new()
                .anthropic()
                .api_key(api_key)
                .model(model)
                .temperature(temperature)
                .max_tokens(max_tokens)
                .build()
                .await
                .map_err(build_error)?;

            Arc::new(client)
        }
        LlmProviderConfig::Gemini { api_key, model } => {
            let api_key = api_key
                .as_deref()
                .ok_or_else(|| ChronicleError::missing_credentials(name))?;

            let client = LlmBuilder::new()
                .openai()
                .api_key(api_key)
                .model(model)
                .base_url(GEMINI_OPENAI_BASE_URL)
                .temperature(temperature)
                .max_tokens(max_tokens)
                .build()
                .await
                .map_err(build_error)?;

            Arc::new(client)
        }
        LlmProviderConfig::OpenRouter { api_key, model } => {
            let api_key = api_key
                .as_deref()
                .ok_or_else(|| ChronicleError::missing_credentials(name))?;

            let client = LlmBuilder::new()
                .openai()
                .api_key(api_key)
                .model(model)
                .base_url(OPENROUTER_BASE_URL)
                .temperature(temperature)
                .max_tokens(max_tokens)
                .build()
                .await
                .map_err(build_error)?;

            Arc::new(client)
        }
        LlmProviderConfig::Ollama { base_url, model } => {
            let client = LlmBuilder::new()
                .ollama()
                .model(model)
                .base_url(base_url)
                .temperature(temperature)
                .max_tokens(max_tokens)
                .build()
                .await
                .map_err(build_error)?;

            Arc::new(client)
        }
    };

    Ok(client)
}

/// Map a provider error message onto the error taxonomy
pub fn classify_llm_error(provider: &str, message: &str) -> ChronicleError {
    let lower = message.to_lowercase();
    let kind = if lower.contains("rate limit") || lower.contains("429") || lower.contains("too many requests") {
        LlmErrorKind::RateLimited
    } else if lower.contains("401")
        || lower.contains("unauthorized")
        || lower.contains("invalid api key")
        || lower.contains("authentication")
    {
        LlmErrorKind::MissingCredentials
    } else {
        LlmErrorKind::Failure
    };
    ChronicleError::llm(kind, provider, message)
}

fn to_siumai_messages(messages: &[ChatMessage]) -> Vec<siumai::prelude::ChatMessage> {
    messages
        .iter()
        .map(|m| match m.role {
            ChatRole::System => system!(m.content.clone()),
            ChatRole::User => user!(m.content.clone()),
            ChatRole::Assistant => siumai::prelude::ChatMessage::assistant(m.content.clone()).build(),
        })
        .collect()
}

#[async_trait]
impl LlmProvider for SiumaiLlmClient {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> ChronicleResult<String> {
        let provider = self.provider_name().to_string();
        let client = self.client_for(&options).await?;
        log_llm_request(&provider, self.model_name(), messages.len());

        let start_time = Instant::now();
        let messages = Arc::new(messages);

        let content = retry_async(
            || {
                let client = client.clone();
                let messages = messages.clone();
                let provider = provider.clone();
                async move {
                    let response = with_timeout(
                        client.chat(to_siumai_messages(&messages)),
                        LLM_REQUEST_TIMEOUT_MS,
                        "llm_chat",
                    )
                    .await?
                    .map_err(|e| classify_llm_error(&provider, &e.to_string()))?;

                    response.content_text().map(str::to_string).ok_or_else(|| {
                        ChronicleError::llm(
                            LlmErrorKind::Failure,
                            provider.as_str(),
                            "No text content in LLM response",
                        )
                    })
                }
                .boxed()
            },
            self.retry.clone(),
            "llm_complete",
        )
        .await?;

        info!(
            "Generated response in {:?} ({} chars)",
            start_time.elapsed(),
            content.len()
        );
        Ok(content)
    }

    async fn complete_json(
        &self,
        messages: Vec<ChatMessage>,
        schema: &serde_json::Value,
    ) -> ChronicleResult<serde_json::Value> {
        let mut with_instruction = Vec::with_capacity(messages.len() + 1);
        with_instruction.push(ChatMessage::system(json_instruction(schema)));
        with_instruction.extend(messages);

        let text = self
            .complete(with_instruction, CompletionOptions::default())
            .await?;
        extract_json(self.provider_name(), &text)
    }

    fn provider_name(&self) -> &str {
        self.config.provider.provider_name()
    }

    fn model_name(&self) -> &str {
        self.config.provider.model()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(provider: LlmProviderConfig) -> LlmConfig {
        LlmConfig {
            provider,
            temperature: 0.1,
            max_tokens: 2000,
        }
    }

    #[tokio::test]
    async fn missing_key_fails_at_call_time() {
        let client = SiumaiLlmClient::new(config(LlmProviderConfig::Anthropic {
            api_key: None,
            model: "claude-3-5-haiku".to_string(),
        }));
        assert_eq!(client.provider_name(), "anthropic");
        assert_eq!(client.model_name(), "claude-3-5-haiku");

        let err = client
            .complete(vec![ChatMessage::user("hi")], CompletionOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), "llm_missing_credentials");
    }

    #[tokio::test]
    async fn every_keyed_provider_checks_credentials() {
        let providers = vec![
            LlmProviderConfig::OpenAi {
                api_key: None,
                model: "gpt-4".to_string(),
                base_url: None,
            },
            LlmProviderConfig::Gemini {
                api_key: None,
                model: "gemini-1.5-pro".to_string(),
            },
            LlmProviderConfig::OpenRouter {
                api_key: None,
                model: "meta-llama/llama-3-70b".to_string(),
            },
        ];
        for provider in providers {
            let client = SiumaiLlmClient::new(config(provider));
            let err = client
                .complete_json(vec![ChatMessage::user("hi")], &serde_json::json!({}))
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                ChronicleError::LlmProvider {
                    kind: LlmErrorKind::MissingCredentials,
                    ..
                }
            ));
        }
    }

    #[test]
    fn classifies_provider_errors() {
        let limited = classify_llm_error("openai", "HTTP 429: Rate limit exceeded");
        assert_eq!(limited.error_type(), "llm_rate_limited");
        assert!(limited.is_recoverable());

        let auth = classify_llm_error("openai", "401 Unauthorized");
        assert_eq!(auth.error_type(), "llm_missing_credentials");

        let other = classify_llm_error("openai", "model not found");
        assert_eq!(other.error_type(), "llm_failure");
    }

    #[test]
    fn converts_roles() {
        let converted = to_siumai_messages(&[
            ChatMessage::system("rules"),
            ChatMessage::user("question"),
            ChatMessage::assistant("answer"),
        ]);
        assert_eq!(converted.len(), 3);
    }
}
