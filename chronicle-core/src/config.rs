//! Settings loading and validation
//!
//! Layers serde defaults, an optional TOML file and process environment variables.

use crate::error::{ChronicleError, ChronicleResult, ErrorContext};
use crate::types::CitationStyle;

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings file looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "chronicle.toml";

/// Tier 1 search backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tier1Backend {
    /// Keyless DuckDuckGo HTML endpoint
    #[default]
    DuckDuckGo,
    /// Brave Search API, requires `brave_api_key`
    Brave,
}

/// Tavily search depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    Basic,
    #[default]
    Advanced,
}

impl SearchDepth {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchDepth::Basic => "basic",
            SearchDepth::Advanced => "advanced",
        }
    }
}

/// Output rendering for research results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Markdown,
    Structured,
}

impl std::str::FromStr for OutputFormat {
    type Err = ChronicleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "structured" => Ok(OutputFormat::Structured),
            other => Err(ChronicleError::validation(
                "output_format",
                format!("unknown output format '{}'", other),
            )),
        }
    }
}

/// Closed set of supported LLM providers with their credentials
#[derive(Debug, Clone, PartialEq)]
pub enum LlmProviderConfig {
    OpenAi {
        api_key: Option<String>,
        model: String,
        base_url: Option<String>,
    },
    Anthropic {
        api_key: Option<String>,
        model: String,
    },
    Gemini {
        api_key: Option<String>,
        model: String,
    },
    OpenRouter {
        api_key: Option<String>,
        model: String,
    },
    Ollama {
        base_url: String,
        model: String,
    },
}

impl LlmProviderConfig {
    pub fn provider_name(&self) -> &'static str {
        match self {
            LlmProviderConfig::OpenAi { .. } => "openai",
            LlmProviderConfig::Anthropic { .. } => "anthropic",
            LlmProviderConfig::Gemini { .. } => "gemini",
            LlmProviderConfig::OpenRouter { .. } => "openrouter",
            LlmProviderConfig::Ollama { .. } => "ollama",
        }
    }

    pub fn model(&self) -> &str {
        match self {
            LlmProviderConfig::OpenAi { model, .. }
            | LlmProviderConfig::Anthropic { model, .. }
            | LlmProviderConfig::Gemini { model, .. }
            | LlmProviderConfig::OpenRouter { model, .. }
            | LlmProviderConfig::Ollama { model, .. } => model,
        }
    }

    /// Whether the credentials needed for a call are present
    pub fn has_credentials(&self) -> bool {
        match self {
            LlmProviderConfig::OpenAi { api_key, .. }
            | LlmProviderConfig::Anthropic { api_key, .. }
            | LlmProviderConfig::Gemini { api_key, .. }
            | LlmProviderConfig::OpenRouter { api_key, .. } => api_key.is_some(),
            LlmProviderConfig::Ollama { .. } => true,
        }
    }
}

/// LLM client configuration derived from settings
#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    pub provider: LlmProviderConfig,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // LLM
    pub llm_provider: String,
    pub llm_model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anthropic_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openrouter_api_key: Option<String>,
    pub ollama_base_url: String,

    // Tier 1
    pub tier1_enabled: bool,
    pub tier1_backend: Tier1Backend,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brave_api_key: Option<String>,
    pub tier1_max_sources: usize,
    pub tier1_allowed_domains: Vec<String>,

    // Tier 2
    pub tier2_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tavily_api_key: Option<String>,
    pub tier2_max_sources: usize,
    pub tier2_search_depth: SearchDepth,
    pub tier2_context_max_tokens: usize,
    pub tier2_enrich_top_k: usize,

    // Escalation
    pub enable_auto_escalation: bool,
    pub escalation_threshold: f64,
    pub min_sources_tier1: usize,
    pub min_confidence_tier1: f64,

    // Output
    pub citation_format: CitationStyle,
    pub include_access_dates: bool,
    pub default_output_format: OutputFormat,

    // API server
    pub api_host: String,
    pub api_port: u16,
    pub cors_origins: Vec<String>,

    // Logging
    pub log_level: String,
    pub log_format: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            llm_provider: "openai".to_string(),
            llm_model: "gpt-4".to_string(),
            max_tokens: 2000,
            temperature: 0.1,
            openai_api_key: None,
            openai_base_url: None,
            anthropic_api_key: None,
            google_api_key: None,
            openrouter_api_key: None,
            ollama_base_url: "http://localhost:11434".to_string(),

            tier1_enabled: true,
            tier1_backend: Tier1Backend::DuckDuckGo,
            brave_api_key: None,
            tier1_max_sources: 10,
            tier1_allowed_domains: Vec::new(),

            tier2_enabled: false,
            tavily_api_key: None,
            tier2_max_sources: 20,
            tier2_search_depth: SearchDepth::Advanced,
            tier2_context_max_tokens: 4000,
            tier2_enrich_top_k: 0,

            enable_auto_escalation: true,
            escalation_threshold: 0.7,
            min_sources_tier1: 3,
            min_confidence_tier1: 0.7,

            citation_format: CitationStyle::Mla,
            include_access_dates: true,
            default_output_format: OutputFormat::Json,

            api_host: "0.0.0.0".to_string(),
            api_port: 8000,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:8080".to_string(),
            ],

            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from defaults, an optional TOML file and the environment
    ///
    /// When `path` is `None`, `chronicle.toml` in the working directory is used if present.
    pub fn load(path: Option<&Path>) -> ChronicleResult<Self> {
        let (file_name, required) = match path {
            Some(p) => (p.to_string_lossy().to_string(), true),
            None => (DEFAULT_CONFIG_FILE.to_string(), false),
        };

        let builder = Config::builder()
            .add_source(File::new(&file_name, FileFormat::Toml).required(required))
            .add_source(
                Environment::default()
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("tier1_allowed_domains")
                    .with_list_parse_key("cors_origins"),
            );

        Self::from_config(builder.build(), &file_name)
    }

    /// Load settings from a TOML file only, ignoring the environment
    pub fn from_file<P: AsRef<Path>>(path: P) -> ChronicleResult<Self> {
        let file_name = path.as_ref().to_string_lossy().to_string();
        let built = Config::builder()
            .add_source(File::new(&file_name, FileFormat::Toml).required(true))
            .build();
        Self::from_config(built, &file_name)
    }

    fn from_config(
        built: Result<Config, config::ConfigError>,
        file_name: &str,
    ) -> ChronicleResult<Self> {
        let settings: Settings = built
            .and_then(|c| c.try_deserialize())
            .map_err(|e| ChronicleError::Config {
                message: format!("Failed to load settings: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("config")
                    .with_operation("load")
                    .with_metadata("file", file_name)
                    .with_suggestion("Check the TOML syntax and value types")
                    .with_suggestion("Check environment variables that override settings"),
            })?;

        Ok(settings.normalized())
    }

    /// Treat blank secrets as missing
    fn normalized(mut self) -> Self {
        for key in [
            &mut self.openai_api_key,
            &mut self.openai_base_url,
            &mut self.anthropic_api_key,
            &mut self.google_api_key,
            &mut self.openrouter_api_key,
            &mut self.brave_api_key,
            &mut self.tavily_api_key,
        ] {
            if key.as_deref().map(|v| v.trim().is_empty()).unwrap_or(false) {
                *key = None;
            }
        }
        self.tier1_allowed_domains = self
            .tier1_allowed_domains
            .into_iter()
            .map(|d| d.trim().to_lowercase())
            .filter(|d| !d.is_empty())
            .collect();
        self
    }

    /// Save settings to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> ChronicleResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ChronicleError::Config {
            message: format!("Failed to serialize settings: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("save_to_file"),
        })?;

        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate value ranges
    pub fn validate(&self) -> ChronicleResult<()> {
        const PROVIDERS: [&str; 6] = ["openai", "anthropic", "gemini", "google", "openrouter", "ollama"];

        if !PROVIDERS.contains(&self.llm_provider.to_lowercase().as_str()) {
            return Err(invalid(
                format!("Unknown llm_provider '{}'", self.llm_provider),
                "Use one of: openai, anthropic, gemini, openrouter, ollama",
            ));
        }
        if !(100..=100_000).contains(&self.max_tokens) {
            return Err(invalid(
                format!("max_tokens must be between 100 and 100000, got {}", self.max_tokens),
                "Set max_tokens to a value in range",
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(invalid(
                format!("temperature must be between 0 and 2, got {}", self.temperature),
                "Set temperature to a value in range",
            ));
        }
        if !(1..=50).contains(&self.tier1_max_sources) {
            return Err(invalid(
                format!("tier1_max_sources must be between 1 and 50, got {}", self.tier1_max_sources),
                "Set tier1_max_sources to a value in range",
            ));
        }
        if !(1..=100).contains(&self.tier2_max_sources) {
            return Err(invalid(
                format!("tier2_max_sources must be between 1 and 100, got {}", self.tier2_max_sources),
                "Set tier2_max_sources to a value in range",
            ));
        }
        if !(0.0..=1.0).contains(&self.escalation_threshold) {
            return Err(invalid(
                format!("escalation_threshold must be between 0 and 1, got {}", self.escalation_threshold),
                "Set escalation_threshold to a value in [0, 1]",
            ));
        }
        if !(0.0..=1.0).contains(&self.min_confidence_tier1) {
            return Err(invalid(
                format!("min_confidence_tier1 must be between 0 and 1, got {}", self.min_confidence_tier1),
                "Set min_confidence_tier1 to a value in [0, 1]",
            ));
        }
        if !(1..=20).contains(&self.min_sources_tier1) {
            return Err(invalid(
                format!("min_sources_tier1 must be between 1 and 20, got {}", self.min_sources_tier1),
                "Set min_sources_tier1 to a value in range",
            ));
        }
        if self.tier2_context_max_tokens == 0 {
            return Err(invalid(
                "tier2_context_max_tokens must be greater than 0".to_string(),
                "Set tier2_context_max_tokens to a positive value",
            ));
        }
        Ok(())
    }

    /// Tier 1 is usable when enabled and its backend has what it needs
    pub fn is_tier1_available(&self) -> bool {
        self.tier1_enabled
            && match self.tier1_backend {
                Tier1Backend::DuckDuckGo => true,
                Tier1Backend::Brave => self.brave_api_key.is_some(),
            }
    }

    /// Tier 2 is usable only when enabled and a Tavily key is present
    pub fn is_tier2_available(&self) -> bool {
        self.tier2_enabled && self.tavily_api_key.is_some()
    }

    /// Build the provider configuration for the selected LLM provider
    pub fn llm_provider_config(&self) -> ChronicleResult<LlmProviderConfig> {
        let model = self.llm_model.clone();
        let provider = match self.llm_provider.to_lowercase().as_str() {
            "openai" => LlmProviderConfig::OpenAi {
                api_key: self.openai_api_key.clone(),
                model,
                base_url: self.openai_base_url.clone(),
            },
            "anthropic" => LlmProviderConfig::Anthropic {
                api_key: self.anthropic_api_key.clone(),
                model,
            },
            "gemini" | "google" => LlmProviderConfig::Gemini {
                api_key: self.google_api_key.clone(),
                model,
            },
            "openrouter" => LlmProviderConfig::OpenRouter {
                api_key: self.openrouter_api_key.clone(),
                model,
            },
            "ollama" => LlmProviderConfig::Ollama {
                base_url: self.ollama_base_url.clone(),
                model,
            },
            other => {
                return Err(crate::config_error!(
                    format!("Unsupported LLM provider: {}", other),
                    "config"
                ))
            }
        };
        Ok(provider)
    }

    pub fn llm_config(&self) -> ChronicleResult<LlmConfig> {
        Ok(LlmConfig {
            provider: self.llm_provider_config()?,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        })
    }

    /// Socket address string for the HTTP server
    pub fn api_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

fn invalid(message: String, suggestion: &str) -> ChronicleError {
    ChronicleError::Config {
        message,
        source: None,
        context: ErrorContext::new("config")
            .with_operation("validate")
            .with_suggestion(suggestion),
    }
}
