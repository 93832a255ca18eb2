//! Unified logging system
//!
//! Structured logging through `tracing`, plus helpers for the research event stream

use serde::{Deserialize, Serialize};
use std::io;
use tracing::{info, warn};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::Settings;
use crate::types::{ResearchDepth, ResearchResult, ResearchTier};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty, compact)
    pub format: LogFormat,
    /// Whether to include file and line information
    pub include_location: bool,
    /// Whether to include thread information
    pub include_thread: bool,
    /// Whether to log to file
    pub log_to_file: bool,
    /// Log file path (if log_to_file is true)
    pub log_file_path: Option<String>,
    /// Emit a timing event when instrumented spans close
    pub enable_span_timing: bool,
    /// Custom filter directives
    pub filter_directives: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            include_location: false,
            include_thread: false,
            log_to_file: false,
            log_file_path: None,
            enable_span_timing: true,
            filter_directives: vec![
                "hyper=warn".to_string(),
                "reqwest=warn".to_string(),
                "html5ever=warn".to_string(),
            ],
        }
    }
}

impl LoggingConfig {
    /// Map `log_level` / `log_format` settings onto a logging configuration
    pub fn from_settings(settings: &Settings) -> Self {
        let format = match settings.log_format.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Compact,
        };
        Self {
            level: settings.log_level.to_lowercase(),
            format,
            ..Self::default()
        }
    }

    /// Verbose development configuration
    pub fn verbose() -> Self {
        Self {
            level: "debug".to_string(),
            format: LogFormat::Pretty,
            include_location: true,
            ..Self::default()
        }
    }
}

/// Initialize the logging system
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(
    config: &LoggingConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    for directive in &config.filter_directives {
        filter = filter.add_directive(directive.parse()?);
    }

    let span_events = if config.enable_span_timing {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let writer = make_writer(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .json()
                .with_span_events(span_events)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_thread_ids(config.include_thread)
                .with_thread_names(config.include_thread)
                .with_writer(writer);
            registry.with(fmt_layer).try_init()?;
        }
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .pretty()
                .with_span_events(span_events)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_thread_ids(config.include_thread)
                .with_thread_names(config.include_thread)
                .with_writer(writer);
            registry.with(fmt_layer).try_init()?;
        }
        LogFormat::Compact => {
            let fmt_layer = fmt::layer()
                .compact()
                .with_span_events(span_events)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_thread_ids(config.include_thread)
                .with_thread_names(config.include_thread)
                .with_writer(writer);
            registry.with(fmt_layer).try_init()?;
        }
    }

    Ok(())
}

fn make_writer(
    config: &LoggingConfig,
) -> Result<fmt::writer::BoxMakeWriter, Box<dyn std::error::Error + Send + Sync>> {
    if !config.log_to_file {
        return Ok(fmt::writer::BoxMakeWriter::new(io::stdout));
    }
    let Some(log_path) = &config.log_file_path else {
        return Err("log_file_path must be specified when log_to_file is true".into());
    };
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;
    Ok(fmt::writer::BoxMakeWriter::new(std::sync::Mutex::new(file)))
}

/// Log an incoming research request
pub fn log_research_request(query: &str, depth: ResearchDepth) {
    info!(
        event = "research_request",
        query = query,
        depth = %depth,
        "Research request received"
    );
}

/// Log a Tier 1 to Tier 2 escalation
pub fn log_tier_escalation(query: &str, reason: &str, quality_score: f64) {
    warn!(
        event = "tier_escalation",
        query = query,
        from_tier = %ResearchTier::Tier1,
        to_tier = %ResearchTier::Tier2,
        reason = reason,
        quality_score = quality_score,
        "Escalating research to Tier 2"
    );
}

/// Log the metrics of a finished research call
pub fn log_research_result(result: &ResearchResult) {
    info!(
        event = "research_result",
        query = %result.query,
        tier_used = %result.tier_used,
        source_count = result.source_count(),
        confidence = result.confidence,
        gap_count = result.gaps.len(),
        execution_time_ms = result.execution_time_ms,
        "Research completed"
    );
}

/// Log an outgoing LLM request
pub fn log_llm_request(provider: &str, model: &str, message_count: usize) {
    tracing::debug!(
        event = "llm_request",
        provider = provider,
        model = model,
        message_count = message_count,
        "Sending LLM request"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_settings_maps_format() {
        let settings = Settings {
            log_format: "json".to_string(),
            log_level: "DEBUG".to_string(),
            ..Settings::default()
        };
        let config = LoggingConfig::from_settings(&settings);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.level, "debug");

        let text = LoggingConfig::from_settings(&Settings::default());
        assert_eq!(text.format, LogFormat::Compact);
    }

    #[test]
    fn file_logging_requires_path() {
        let config = LoggingConfig {
            log_to_file: true,
            log_file_path: None,
            ..LoggingConfig::default()
        };
        assert!(make_writer(&config).is_err());
    }
}
