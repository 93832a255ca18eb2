//! Unified error handling system
//!
//! Provides the research error taxonomy with context, recovery suggestions, and proper error chaining

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

use crate::types::ResearchTier;

pub type ChronicleResult<T> = Result<T, ChronicleError>;

/// Error context providing additional information for debugging and recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Additional metadata
    pub metadata: std::collections::HashMap<String, String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            metadata: std::collections::HashMap::new(),
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Distinguishable failure kinds reported by an LLM completion service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmErrorKind {
    /// No API key configured for the selected provider
    MissingCredentials,
    /// The provider rejected the request because of rate limits
    RateLimited,
    /// Any other provider failure
    Failure,
}

impl std::fmt::Display for LlmErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmErrorKind::MissingCredentials => write!(f, "missing credentials"),
            LlmErrorKind::RateLimited => write!(f, "rate limited"),
            LlmErrorKind::Failure => write!(f, "failure"),
        }
    }
}

/// Main error type for the Chronicle system
#[derive(Error, Debug)]
pub enum ChronicleError {
    #[error("Insufficient results: {source_count} sources (minimum {min_required})")]
    InsufficientResults {
        source_count: usize,
        min_required: usize,
        context: ErrorContext,
    },

    #[error("Low confidence: {confidence:.2} (threshold {threshold})")]
    LowConfidence {
        confidence: f64,
        threshold: f64,
        context: ErrorContext,
    },

    #[error("Tier 2 unavailable: {reason}")]
    Tier2Unavailable {
        reason: String,
        context: ErrorContext,
    },

    #[error("LLM provider '{provider}' error: {message}")]
    LlmProvider {
        kind: LlmErrorKind,
        provider: String,
        message: String,
        retry_after_ms: Option<u64>,
        context: ErrorContext,
    },

    #[error("Web search failed in {tier}: {message}")]
    WebSearch {
        tier: ResearchTier,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Failed to extract content from {url}: {reason}")]
    ContentExtraction {
        url: String,
        reason: String,
        context: ErrorContext,
    },

    #[error("Failed to format citation as {style}: {reason}")]
    CitationFormatting {
        style: String,
        reason: String,
        context: ErrorContext,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Operation timeout: {operation}")]
    Timeout {
        operation: String,
        duration_ms: u64,
        context: ErrorContext,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },
}

impl ChronicleError {
    /// Create an LLM provider error of the given kind
    pub fn llm<P: Into<String>, M: Into<String>>(kind: LlmErrorKind, provider: P, message: M) -> Self {
        let provider = provider.into();
        let suggestion = match kind {
            LlmErrorKind::MissingCredentials => "Set the API key environment variable for the provider",
            LlmErrorKind::RateLimited => "Wait before retrying or lower the request rate",
            LlmErrorKind::Failure => "Check provider status and model name",
        };
        Self::LlmProvider {
            kind,
            message: message.into(),
            retry_after_ms: None,
            context: ErrorContext::new("llm_provider")
                .with_metadata("provider", &provider)
                .with_suggestion(suggestion),
            provider,
        }
    }

    /// Create a missing-credentials error for a provider
    pub fn missing_credentials<P: Into<String>>(provider: P) -> Self {
        let provider = provider.into();
        let message = format!(
            "API key not configured for provider '{}'. Please set the appropriate environment variable.",
            provider
        );
        Self::llm(LlmErrorKind::MissingCredentials, provider, message)
    }

    /// Create a web search error for the given tier
    pub fn web_search<M: Into<String>>(tier: ResearchTier, message: M) -> Self {
        Self::WebSearch {
            tier,
            message: message.into(),
            source: None,
            context: ErrorContext::new("web_search")
                .with_metadata("tier", &tier.to_string())
                .with_suggestion("Check network connectivity and search provider status"),
        }
    }

    /// Create a Tier 2 unavailable error
    pub fn tier2_unavailable<R: Into<String>>(reason: R) -> Self {
        Self::Tier2Unavailable {
            reason: reason.into(),
            context: ErrorContext::new("tier2")
                .with_suggestion("Set TAVILY_API_KEY and TIER2_ENABLED=true"),
        }
    }

    /// Create a validation error for a field
    pub fn validation<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        let field = field.into();
        Self::Validation {
            message: format!("field '{}': {}", field, message.into()),
            field: Some(field),
            context: ErrorContext::new("validation")
                .with_suggestion("Check the field value and format"),
        }
    }

    /// Create a citation formatting error
    pub fn citation_formatting<S: Into<String>, R: Into<String>>(style: S, reason: R) -> Self {
        Self::CitationFormatting {
            style: style.into(),
            reason: reason.into(),
            context: ErrorContext::new("citation_formatter"),
        }
    }

    /// Create a content extraction error
    pub fn content_extraction<U: Into<String>, R: Into<String>>(url: U, reason: R) -> Self {
        Self::ContentExtraction {
            url: url.into(),
            reason: reason.into(),
            context: ErrorContext::new("content_extractor"),
        }
    }

    /// Create a network error with its source
    pub fn network<M: Into<String>>(
        message: M,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Network {
            message: message.into(),
            source: Some(source),
            context: ErrorContext::new("network"),
        }
    }

    /// Get the error context
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            ChronicleError::InsufficientResults { context, .. } => Some(context),
            ChronicleError::LowConfidence { context, .. } => Some(context),
            ChronicleError::Tier2Unavailable { context, .. } => Some(context),
            ChronicleError::LlmProvider { context, .. } => Some(context),
            ChronicleError::WebSearch { context, .. } => Some(context),
            ChronicleError::ContentExtraction { context, .. } => Some(context),
            ChronicleError::CitationFormatting { context, .. } => Some(context),
            ChronicleError::Validation { context, .. } => Some(context),
            ChronicleError::Config { context, .. } => Some(context),
            ChronicleError::Network { context, .. } => Some(context),
            ChronicleError::Timeout { context, .. } => Some(context),
            ChronicleError::Internal { context, .. } => Some(context),
            ChronicleError::Io(_) | ChronicleError::Serialization(_) => None,
        }
    }

    /// Short machine-readable name of the error kind
    pub fn error_type(&self) -> &'static str {
        match self {
            ChronicleError::InsufficientResults { .. } => "insufficient_results",
            ChronicleError::LowConfidence { .. } => "low_confidence",
            ChronicleError::Tier2Unavailable { .. } => "tier2_unavailable",
            ChronicleError::LlmProvider { kind, .. } => match kind {
                LlmErrorKind::MissingCredentials => "llm_missing_credentials",
                LlmErrorKind::RateLimited => "llm_rate_limited",
                LlmErrorKind::Failure => "llm_failure",
            },
            ChronicleError::WebSearch { .. } => "web_search_failure",
            ChronicleError::ContentExtraction { .. } => "content_extraction_failure",
            ChronicleError::CitationFormatting { .. } => "citation_formatting_failure",
            ChronicleError::Validation { .. } => "validation_failure",
            ChronicleError::Config { .. } => "config",
            ChronicleError::Network { .. } => "network",
            ChronicleError::Timeout { .. } => "timeout",
            ChronicleError::Io(_) => "io",
            ChronicleError::Serialization(_) => "serialization",
            ChronicleError::Internal { .. } => "internal",
        }
    }

    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            ChronicleError::Network { .. } => true,
            ChronicleError::Timeout { .. } => true,
            ChronicleError::WebSearch { .. } => true,
            ChronicleError::LlmProvider { kind, .. } => *kind == LlmErrorKind::RateLimited,
            ChronicleError::Config { .. } => false,
            ChronicleError::Validation { .. } => false,
            ChronicleError::Tier2Unavailable { .. } => false,
            _ => false,
        }
    }

    /// Get retry delay in milliseconds for recoverable errors
    pub fn retry_delay_ms(&self) -> Option<u64> {
        match self {
            ChronicleError::Network { .. } => Some(1000),
            ChronicleError::WebSearch { .. } => Some(1000),
            ChronicleError::Timeout { .. } => Some(2000),
            ChronicleError::LlmProvider {
                kind: LlmErrorKind::RateLimited,
                retry_after_ms,
                ..
            } => Some(retry_after_ms.unwrap_or(2000)),
            _ => None,
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            ChronicleError::Internal { .. } => {
                error!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Internal error occurred"
                );
            }
            ChronicleError::Config { .. } | ChronicleError::Validation { .. } => {
                error!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Configuration or validation error"
                );
            }
            ChronicleError::Network { .. }
            | ChronicleError::Timeout { .. }
            | ChronicleError::Tier2Unavailable { .. } => {
                warn!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Network, timeout or availability error (may be recoverable)"
                );
            }
            _ => {
                error!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error_type = self.error_type(),
                    error = %self,
                    "Error occurred"
                );
            }
        }
    }
}

/// Convenience macros for creating errors with context
#[macro_export]
macro_rules! config_error {
    ($msg:expr, $component:expr) => {
        $crate::ChronicleError::Config {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your configuration file or environment variables")
                .with_suggestion("Run 'chronicle config --init' to create default config"),
        }
    };
    ($msg:expr, $component:expr, $source:expr) => {
        $crate::ChronicleError::Config {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your configuration file or environment variables"),
        }
    };
}

#[macro_export]
macro_rules! validation_error {
    ($msg:expr, $field:expr, $component:expr) => {
        $crate::ChronicleError::Validation {
            message: $msg.to_string(),
            field: Some($field.to_string()),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check the field value and format"),
        }
    };
}
