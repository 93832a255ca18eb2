//! Story context derived from research results

use chronicle_core::{
    complete_structured, ChatMessage, HistoricalPeriod, LlmProvider, ResearchResult, StoryContext,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

pub const GENERIC_SETTING: &str = "Historical period from research findings";
pub const GENERIC_ATMOSPHERE: &str = "Authentic historical atmosphere based on research";

/// Findings longer than this are truncated before being sent to the LLM
const MAX_FINDINGS_CHARS: usize = 12_000;

const STORY_SYSTEM_PROMPT: &str = "You extract narrative building blocks from historical research. \
Only use facts present in the findings. Answer with JSON only.";

#[derive(Debug, Deserialize)]
struct StoryDetails {
    #[serde(default)]
    key_figures: Vec<String>,
    #[serde(default)]
    major_events: Vec<String>,
    #[serde(default)]
    daily_life_details: Vec<String>,
    #[serde(default)]
    atmosphere: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StoryContextBuilder;

impl StoryContextBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Deterministic context: setting from the period, generic atmosphere, empty lists
    pub fn build(&self, result: &ResearchResult, period: Option<&HistoricalPeriod>) -> StoryContext {
        let period = period.or(result.historical_period.as_ref());
        StoryContext {
            setting: setting_for(period),
            key_figures: Vec::new(),
            major_events: Vec::new(),
            atmosphere: GENERIC_ATMOSPHERE.to_string(),
            daily_life_details: Vec::new(),
            sources: result.sources.clone(),
        }
    }

    /// Ask the LLM for figures, events and daily-life details
    ///
    /// Any LLM or parsing error falls back to [`StoryContextBuilder::build`].
    pub async fn build_with_llm(
        &self,
        llm: &dyn LlmProvider,
        result: &ResearchResult,
        period: Option<&HistoricalPeriod>,
    ) -> StoryContext {
        let base = self.build(result, period);
        if result.findings.trim().is_empty() {
            return base;
        }

        let findings: String = result.findings.chars().take(MAX_FINDINGS_CHARS).collect();
        let messages = vec![
            ChatMessage::system(STORY_SYSTEM_PROMPT),
            ChatMessage::user(format!(
                "Setting: {}\nQuery: {}\n\nFindings:\n{}\n\n\
                 List the key historical figures, the major events, details of daily life \
                 and a one-sentence atmosphere description.",
                base.setting, result.query, findings
            )),
        ];

        match complete_structured::<StoryDetails>(llm, messages, &story_schema()).await {
            Ok(details) => {
                debug!(
                    figures = details.key_figures.len(),
                    events = details.major_events.len(),
                    "Story context extracted"
                );
                StoryContext {
                    key_figures: details.key_figures,
                    major_events: details.major_events,
                    daily_life_details: details.daily_life_details,
                    atmosphere: details
                        .atmosphere
                        .filter(|a| !a.trim().is_empty())
                        .unwrap_or(base.atmosphere),
                    ..base
                }
            }
            Err(e) => {
                warn!(error = %e, "Story context extraction failed, using basic context");
                base
            }
        }
    }
}

fn setting_for(period: Option<&HistoricalPeriod>) -> String {
    let Some(period) = period else {
        return GENERIC_SETTING.to_string();
    };
    if let Some(era) = period.era_name.as_deref().filter(|e| !e.trim().is_empty()) {
        return format!("During {}", era.trim());
    }
    if let Some(century) = period.century.as_deref().filter(|c| !c.trim().is_empty()) {
        return century.trim().to_string();
    }
    match (period.start_year, period.end_year) {
        (Some(start), Some(end)) => format!("Between {} and {}", year_label(start), year_label(end)),
        (Some(start), None) => format!("From {}", year_label(start)),
        (None, Some(end)) => format!("Until {}", year_label(end)),
        (None, None) => GENERIC_SETTING.to_string(),
    }
}

fn year_label(year: i32) -> String {
    if year < 0 {
        format!("{} BCE", -year)
    } else {
        year.to_string()
    }
}

fn story_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "key_figures": {"type": "array", "items": {"type": "string"}},
            "major_events": {"type": "array", "items": {"type": "string"}},
            "daily_life_details": {"type": "array", "items": {"type": "string"}},
            "atmosphere": {"type": "string"}
        },
        "required": ["key_figures", "major_events", "daily_life_details"]
    })
}
