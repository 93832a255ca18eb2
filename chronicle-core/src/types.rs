//! Core data types shared by every Chronicle crate

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ChronicleError, ChronicleResult};

/// Upper bound for `ResearchQuery::max_sources`
pub const MAX_SOURCES_LIMIT: usize = 50;

/// Confidence at or above which a result counts as high confidence
pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.8;
/// Confidence below which a result counts as low confidence
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.6;

/// Research depth requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResearchDepth {
    /// Tier 1 only
    Basic,
    /// Tier 1, escalating to Tier 2 when quality is insufficient
    #[default]
    Auto,
    /// Tier 2 directly
    Deep,
}

impl fmt::Display for ResearchDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResearchDepth::Basic => write!(f, "basic"),
            ResearchDepth::Auto => write!(f, "auto"),
            ResearchDepth::Deep => write!(f, "deep"),
        }
    }
}

impl std::str::FromStr for ResearchDepth {
    type Err = ChronicleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Ok(ResearchDepth::Basic),
            "auto" => Ok(ResearchDepth::Auto),
            "deep" => Ok(ResearchDepth::Deep),
            other => Err(ChronicleError::validation(
                "depth",
                format!("unknown research depth '{}'", other),
            )),
        }
    }
}

/// Tier that produced a result or a source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResearchTier {
    #[default]
    Tier1,
    Tier2,
}

impl fmt::Display for ResearchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResearchTier::Tier1 => write!(f, "tier1"),
            ResearchTier::Tier2 => write!(f, "tier2"),
        }
    }
}

/// Citation style used when formatting sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CitationStyle {
    #[default]
    #[serde(rename = "MLA", alias = "mla")]
    Mla,
    #[serde(rename = "APA", alias = "apa")]
    Apa,
}

impl CitationStyle {
    /// Parse a style name; anything that is not APA falls back to MLA
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("apa") {
            CitationStyle::Apa
        } else {
            CitationStyle::Mla
        }
    }
}

impl fmt::Display for CitationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CitationStyle::Mla => write!(f, "MLA"),
            CitationStyle::Apa => write!(f, "APA"),
        }
    }
}

/// Historical time window attached to a query and copied onto its results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HistoricalPeriod {
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub era_name: Option<String>,
    pub century: Option<String>,
}

impl HistoricalPeriod {
    pub fn is_empty(&self) -> bool {
        self.start_year.is_none()
            && self.end_year.is_none()
            && self.era_name.is_none()
            && self.century.is_none()
    }
}

/// One cited web document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub url: String,
    pub title: String,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub date_published: Option<String>,
    /// Access date in `YYYY-MM-DD` form
    pub date_accessed: String,
    pub credibility_score: f64,
    pub tier: ResearchTier,
}

impl Source {
    /// Create a Tier 1 source accessed today with neutral credibility
    pub fn new<U: Into<String>, T: Into<String>>(url: U, title: T) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            author: None,
            publisher: None,
            date_published: None,
            date_accessed: today(),
            credibility_score: 0.5,
            tier: ResearchTier::Tier1,
        }
    }

    pub fn with_author<S: Into<String>>(mut self, author: S) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_publisher<S: Into<String>>(mut self, publisher: S) -> Self {
        self.publisher = Some(publisher.into());
        self
    }

    pub fn with_date_published<S: Into<String>>(mut self, date: S) -> Self {
        self.date_published = Some(date.into());
        self
    }

    pub fn with_date_accessed<S: Into<String>>(mut self, date: S) -> Self {
        self.date_accessed = date.into();
        self
    }

    /// Set the credibility score, clamped into [0, 1]
    pub fn with_credibility(mut self, score: f64) -> Self {
        self.credibility_score = clamp_unit(score);
        self
    }

    pub fn with_tier(mut self, tier: ResearchTier) -> Self {
        self.tier = tier;
        self
    }
}

/// Incoming research request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchQuery {
    pub query: String,
    #[serde(default)]
    pub depth: ResearchDepth,
    #[serde(default)]
    pub historical_period: Option<HistoricalPeriod>,
    #[serde(default)]
    pub max_sources: Option<usize>,
}

impl ResearchQuery {
    pub fn new<S: Into<String>>(query: S) -> Self {
        Self {
            query: query.into(),
            depth: ResearchDepth::default(),
            historical_period: None,
            max_sources: None,
        }
    }

    pub fn with_depth(mut self, depth: ResearchDepth) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_historical_period(mut self, period: HistoricalPeriod) -> Self {
        self.historical_period = Some(period);
        self
    }

    pub fn with_max_sources(mut self, max_sources: usize) -> Self {
        self.max_sources = Some(max_sources);
        self
    }

    /// Reject blank queries and out-of-range source limits
    pub fn validate(&self) -> ChronicleResult<()> {
        if self.query.trim().is_empty() {
            return Err(ChronicleError::validation("query", "must not be empty"));
        }
        if let Some(max) = self.max_sources {
            if max == 0 || max > MAX_SOURCES_LIMIT {
                return Err(ChronicleError::validation(
                    "max_sources",
                    format!("must be between 1 and {}, got {}", MAX_SOURCES_LIMIT, max),
                ));
            }
        }
        Ok(())
    }
}

/// Outcome of one research call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchResult {
    pub query: String,
    pub findings: String,
    pub sources: Vec<Source>,
    pub citations: Vec<String>,
    pub confidence: f64,
    pub tier_used: ResearchTier,
    pub execution_time_ms: f64,
    pub historical_period: Option<HistoricalPeriod>,
    pub gaps: Vec<String>,
}

impl ResearchResult {
    /// Start an empty result for the given query and tier
    pub fn new<S: Into<String>>(query: S, tier_used: ResearchTier) -> Self {
        Self {
            query: query.into(),
            findings: String::new(),
            sources: Vec::new(),
            citations: Vec::new(),
            confidence: 0.5,
            tier_used,
            execution_time_ms: 0.0,
            historical_period: None,
            gaps: Vec::new(),
        }
    }

    pub fn with_findings<S: Into<String>>(mut self, findings: S) -> Self {
        self.findings = findings.into();
        self
    }

    pub fn with_sources(mut self, sources: Vec<Source>) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_citations(mut self, citations: Vec<String>) -> Self {
        self.citations = citations;
        self
    }

    /// Set confidence, clamped into [0, 1]
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = clamp_unit(confidence);
        self
    }

    /// Set execution time; negative or non-finite inputs become zero
    pub fn with_execution_time_ms(mut self, elapsed_ms: f64) -> Self {
        self.execution_time_ms = if elapsed_ms.is_finite() {
            elapsed_ms.max(0.0)
        } else {
            0.0
        };
        self
    }

    pub fn with_historical_period(mut self, period: Option<HistoricalPeriod>) -> Self {
        self.historical_period = period;
        self
    }

    pub fn with_gaps(mut self, gaps: Vec<String>) -> Self {
        self.gaps = gaps;
        self
    }

    /// Replace sources and citations, keeping every other field
    pub fn with_sources_and_citations(self, sources: Vec<Source>, citations: Vec<String>) -> Self {
        Self {
            sources,
            citations,
            ..self
        }
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub fn is_high_confidence(&self) -> bool {
        self.confidence >= HIGH_CONFIDENCE_THRESHOLD
    }

    pub fn is_low_confidence(&self) -> bool {
        self.confidence < LOW_CONFIDENCE_THRESHOLD
    }
}

/// Verdict of the quality evaluator
#[derive(Debug, Clone, PartialEq)]
pub struct EscalationDecision {
    pub should_escalate: bool,
    pub reason: String,
    pub tier1_result: Option<ResearchResult>,
    pub quality_score: f64,
}

/// Narrative-ready context derived from a research result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StoryContext {
    pub setting: String,
    pub key_figures: Vec<String>,
    pub major_events: Vec<String>,
    pub atmosphere: String,
    pub daily_life_details: Vec<String>,
    pub sources: Vec<Source>,
}

/// Ranked hit returned by a Tier 1 search backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Metadata extracted from an HTML page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub date: Option<String>,
    pub publisher: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One message sent to an LLM completion service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system<S: Into<String>>(content: S) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user<S: Into<String>>(content: S) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Per-call overrides for an LLM completion
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CompletionOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl CompletionOptions {
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Clamp a score into [0, 1], mapping NaN to 0
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}
