//! Integration tests for chronicle-core infrastructure

use chronicle_core::{
    complete_structured, config_error, init_logging, validation_error, async_trait, ChatMessage,
    ChronicleError, ChronicleResult, CompletionOptions, ErrorContext, LlmErrorKind, LlmProvider,
    LogFormat, LoggingConfig, ResearchQuery, Settings,
};
use serde::Deserialize;

#[tokio::test]
async fn test_error_handling() {
    let error = validation_error!("Query must not be empty", "query", "test_component");

    match &error {
        ChronicleError::Validation { field, context, .. } => {
            assert_eq!(field.as_deref(), Some("query"));
            assert_eq!(context.component, "test_component");
            assert!(!context.error_id.is_empty());
        }
        _ => panic!("Expected Validation error"),
    }

    error.log();

    let network_error = ChronicleError::Network {
        message: "Connection failed".to_string(),
        source: None,
        context: ErrorContext::new("test"),
    };
    assert!(network_error.is_recoverable());
    assert!(network_error.retry_delay_ms().is_some());

    let config_error = config_error!("Invalid config", "test");
    assert!(!config_error.is_recoverable());
    assert!(config_error.retry_delay_ms().is_none());
}

#[tokio::test]
async fn test_logging_initialization() {
    let config = LoggingConfig {
        level: "debug".to_string(),
        format: LogFormat::Compact,
        filter_directives: vec!["chronicle_core=debug".to_string()],
        ..LoggingConfig::default()
    };

    // A global subscriber may already be set by another test in this process
    let _ = init_logging(&config);
    tracing::info!("logging initialised");
}

#[test]
fn test_query_validation_error_type() {
    let err = ResearchQuery::new("").validate().unwrap_err();
    assert_eq!(err.error_type(), "validation_failure");
}

#[test]
fn test_settings_defaults_serialize_to_toml() {
    let text = toml::to_string_pretty(&Settings::default()).unwrap();
    assert!(text.contains("llm_provider = \"openai\""));
    assert!(text.contains("citation_format = \"MLA\""));
    assert!(!text.contains("tavily_api_key"));
}

struct CannedProvider {
    answer: serde_json::Value,
}

#[async_trait]
impl LlmProvider for CannedProvider {
    async fn complete(
        &self,
        _messages: Vec<ChatMessage>,
        _options: CompletionOptions,
    ) -> ChronicleResult<String> {
        Ok(self.answer.to_string())
    }

    async fn complete_json(
        &self,
        _messages: Vec<ChatMessage>,
        _schema: &serde_json::Value,
    ) -> ChronicleResult<serde_json::Value> {
        if self.answer.is_null() {
            return Err(ChronicleError::llm(LlmErrorKind::Failure, "canned", "no answer"));
        }
        Ok(self.answer.clone())
    }

    fn provider_name(&self) -> &str {
        "canned"
    }

    fn model_name(&self) -> &str {
        "canned-1"
    }
}

#[derive(Debug, Deserialize)]
struct Figures {
    key_figures: Vec<String>,
}

#[tokio::test]
async fn test_complete_structured_deserializes() {
    let provider = CannedProvider {
        answer: serde_json::json!({ "key_figures": ["Julius Caesar", "Brutus"] }),
    };
    let figures: Figures = complete_structured(
        &provider,
        vec![ChatMessage::user("Who?")],
        &serde_json::json!({"type": "object"}),
    )
    .await
    .unwrap();
    assert_eq!(figures.key_figures.len(), 2);
}

#[tokio::test]
async fn test_complete_structured_reports_shape_mismatch() {
    let provider = CannedProvider {
        answer: serde_json::json!({ "unexpected": true }),
    };
    let result: ChronicleResult<Figures> = complete_structured(
        &provider,
        vec![ChatMessage::user("Who?")],
        &serde_json::json!({"type": "object"}),
    )
    .await;
    assert!(matches!(result, Err(ChronicleError::Serialization(_))));
}
