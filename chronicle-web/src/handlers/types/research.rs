//! Research request and response types

use chronicle_core::{HistoricalPeriod, ResearchResult, Source, StoryContext};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Research request body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResearchRequest {
    /// Research question
    #[schema(example = "What was daily life like in Pompeii before 79 CE?")]
    pub query: String,
    /// Research depth: basic, auto or deep
    #[schema(example = "auto")]
    pub depth: Option<String>,
    /// Output format: json, markdown or structured
    #[schema(example = "json")]
    pub output_format: Option<String>,
    /// Citation style: MLA or APA
    #[schema(example = "MLA")]
    pub citation_format: Option<String>,
    /// Maximum number of sources per tier (1-50)
    #[schema(example = 10)]
    pub max_sources: Option<usize>,
    pub historical_period: Option<HistoricalPeriodDto>,
}

/// Historical time window
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct HistoricalPeriodDto {
    #[schema(example = -27)]
    pub start_year: Option<i32>,
    #[schema(example = 476)]
    pub end_year: Option<i32>,
    #[schema(example = "Roman Empire")]
    pub era_name: Option<String>,
    #[schema(example = "1st century CE")]
    pub century: Option<String>,
}

impl From<HistoricalPeriodDto> for HistoricalPeriod {
    fn from(dto: HistoricalPeriodDto) -> Self {
        Self {
            start_year: dto.start_year,
            end_year: dto.end_year,
            era_name: dto.era_name,
            century: dto.century,
        }
    }
}

impl From<HistoricalPeriod> for HistoricalPeriodDto {
    fn from(period: HistoricalPeriod) -> Self {
        Self {
            start_year: period.start_year,
            end_year: period.end_year,
            era_name: period.era_name,
            century: period.century,
        }
    }
}

/// Cited web document
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SourceDto {
    #[schema(example = "https://en.wikipedia.org/wiki/Pompeii")]
    pub url: String,
    #[schema(example = "Pompeii")]
    pub title: String,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub date_published: Option<String>,
    #[schema(example = "2024-03-15")]
    pub date_accessed: String,
    #[schema(example = 0.8)]
    pub credibility_score: f64,
    #[schema(example = "tier2")]
    pub tier: String,
}

impl From<Source> for SourceDto {
    fn from(source: Source) -> Self {
        Self {
            url: source.url,
            title: source.title,
            author: source.author,
            publisher: source.publisher,
            date_published: source.date_published,
            date_accessed: source.date_accessed,
            credibility_score: source.credibility_score,
            tier: source.tier.to_string(),
        }
    }
}

/// Research result
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResearchResponse {
    pub query: String,
    pub findings: String,
    pub sources: Vec<SourceDto>,
    pub citations: Vec<String>,
    #[schema(example = 0.85)]
    pub confidence: f64,
    #[schema(example = "tier2")]
    pub tier_used: String,
    #[schema(example = 5230.4)]
    pub execution_time_ms: f64,
    pub historical_period: Option<HistoricalPeriodDto>,
    pub gaps: Vec<String>,
    pub source_count: usize,
    pub is_high_confidence: bool,
    pub is_low_confidence: bool,
}

impl From<ResearchResult> for ResearchResponse {
    fn from(result: ResearchResult) -> Self {
        let source_count = result.source_count();
        let is_high_confidence = result.is_high_confidence();
        let is_low_confidence = result.is_low_confidence();
        Self {
            query: result.query,
            findings: result.findings,
            sources: result.sources.into_iter().map(SourceDto::from).collect(),
            citations: result.citations,
            confidence: result.confidence,
            tier_used: result.tier_used.to_string(),
            execution_time_ms: result.execution_time_ms,
            historical_period: result.historical_period.map(HistoricalPeriodDto::from),
            gaps: result.gaps,
            source_count,
            is_high_confidence,
            is_low_confidence,
        }
    }
}

/// Narrative-ready context
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StoryContextDto {
    #[schema(example = "During the Roman Empire")]
    pub setting: String,
    pub key_figures: Vec<String>,
    pub major_events: Vec<String>,
    pub atmosphere: String,
    pub daily_life_details: Vec<String>,
    pub sources: Vec<SourceDto>,
}

impl From<StoryContext> for StoryContextDto {
    fn from(context: StoryContext) -> Self {
        Self {
            setting: context.setting,
            key_figures: context.key_figures,
            major_events: context.major_events,
            atmosphere: context.atmosphere,
            daily_life_details: context.daily_life_details,
            sources: context.sources.into_iter().map(SourceDto::from).collect(),
        }
    }
}

/// Research result together with its story context
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResearchContextResponse {
    pub result: ResearchResponse,
    pub story_context: StoryContextDto,
}
