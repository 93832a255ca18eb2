//! Research result rendering
//!
//! Turns a `ResearchResult` into JSON, Markdown or a structured JSON document that also
//! carries derived fields and a story context.

use chronicle_core::{ChronicleResult, OutputFormat, ResearchResult, StoryContext};
use serde::Serialize;

use crate::story_context::StoryContextBuilder;

/// Renders a research result into a string
pub trait ResultFormatter {
    fn format(&self, result: &ResearchResult) -> ChronicleResult<String>;

    /// MIME type of the rendered output
    fn content_type(&self) -> &'static str;
}

/// Plain serialization of the result
#[derive(Debug, Clone, Copy)]
pub struct JsonOutput {
    pub pretty: bool,
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl ResultFormatter for JsonOutput {
    fn format(&self, result: &ResearchResult) -> ChronicleResult<String> {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(result)?
        } else {
            serde_json::to_string(result)?
        };
        Ok(rendered)
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }
}

/// Human-readable report
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownOutput;

impl ResultFormatter for MarkdownOutput {
    fn format(&self, result: &ResearchResult) -> ChronicleResult<String> {
        let mut content = format!("# Research: {}\n\n", result.query);

        content.push_str("## Findings\n\n");
        if result.findings.trim().is_empty() {
            content.push_str("_No findings._\n\n");
        } else {
            content.push_str(result.findings.trim());
            content.push_str("\n\n");
        }

        content.push_str(&format!(
            "**Confidence:** {:.2} | **Tier:** {} | **Sources:** {} | **Time:** {:.1} ms\n\n",
            result.confidence,
            result.tier_used,
            result.source_count(),
            result.execution_time_ms
        ));

        if !result.gaps.is_empty() {
            content.push_str("## Information Gaps\n\n");
            for gap in &result.gaps {
                content.push_str(&format!("- {}\n", gap));
            }
            content.push('\n');
        }

        if !result.citations.is_empty() {
            content.push_str("## Sources\n\n");
            for (i, citation) in result.citations.iter().enumerate() {
                content.push_str(&format!("{}. {}\n", i + 1, citation));
            }
        }

        Ok(content.trim_end().to_string() + "\n")
    }

    fn content_type(&self) -> &'static str {
        "text/markdown; charset=utf-8"
    }
}

/// Result plus derived fields and a story context
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredOutput {
    builder: StoryContextBuilder,
}

#[derive(Debug, Serialize)]
struct StructuredDocument<'a> {
    result: &'a ResearchResult,
    summary: ResultSummary,
    story_context: StoryContext,
}

#[derive(Debug, Serialize)]
struct ResultSummary {
    source_count: usize,
    citation_count: usize,
    gap_count: usize,
    is_high_confidence: bool,
    is_low_confidence: bool,
}

impl StructuredOutput {
    pub fn new(builder: StoryContextBuilder) -> Self {
        Self { builder }
    }

    /// Render with an already built story context
    pub fn format_with_context(
        &self,
        result: &ResearchResult,
        story_context: StoryContext,
    ) -> ChronicleResult<String> {
        let document = StructuredDocument {
            result,
            summary: ResultSummary {
                source_count: result.source_count(),
                citation_count: result.citations.len(),
                gap_count: result.gaps.len(),
                is_high_confidence: result.is_high_confidence(),
                is_low_confidence: result.is_low_confidence(),
            },
            story_context,
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }
}

impl ResultFormatter for StructuredOutput {
    fn format(&self, result: &ResearchResult) -> ChronicleResult<String> {
        let context = self.builder.build(result, None);
        self.format_with_context(result, context)
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }
}

pub fn formatter_for(format: OutputFormat) -> Box<dyn ResultFormatter + Send + Sync> {
    match format {
        OutputFormat::Json => Box::new(JsonOutput::default()),
        OutputFormat::Markdown => Box::new(MarkdownOutput),
        OutputFormat::Structured => Box::new(StructuredOutput::default()),
    }
}

/// Render a result in the requested format
pub fn render(result: &ResearchResult, format: OutputFormat) -> ChronicleResult<String> {
    formatter_for(format).format(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronicle_core::{ResearchTier, Source};

    fn sample() -> ResearchResult {
        ResearchResult::new("Roman aqueducts", ResearchTier::Tier2)
            .with_findings("Aqueducts supplied Rome with water [1].")
            .with_sources(vec![Source::new("https://a.example", "Aqueducts")])
            .with_citations(vec!["\"Aqueducts.\" https://a.example.".to_string()])
            .with_confidence(0.85)
            .with_gaps(vec!["Uncertainty detected: unclear".to_string()])
            .with_execution_time_ms(42.5)
    }

    #[test]
    fn json_round_trips() {
        let rendered = render(&sample(), OutputFormat::Json).unwrap();
        let parsed: ResearchResult = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn markdown_sections() {
        let rendered = render(&sample(), OutputFormat::Markdown).unwrap();
        assert!(rendered.starts_with("# Research: Roman aqueducts\n"));
        assert!(rendered.contains("## Findings\n\nAqueducts supplied Rome"));
        assert!(rendered.contains("**Confidence:** 0.85 | **Tier:** tier2 | **Sources:** 1 | **Time:** 42.5 ms"));
        assert!(rendered.contains("## Information Gaps\n\n- Uncertainty detected: unclear"));
        assert!(rendered.contains("1. \"Aqueducts.\" https://a.example."));
    }

    #[test]
    fn markdown_skips_empty_sections() {
        let bare = ResearchResult::new("q", ResearchTier::Tier1);
        let rendered = MarkdownOutput.format(&bare).unwrap();
        assert!(rendered.contains("_No findings._"));
        assert!(!rendered.contains("## Sources"));
        assert!(!rendered.contains("## Information Gaps"));
    }

    #[test]
    fn structured_has_summary_and_context() {
        let rendered = render(&sample(), OutputFormat::Structured).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["summary"]["source_count"], 1);
        assert_eq!(value["summary"]["is_high_confidence"], true);
        assert_eq!(value["result"]["tier_used"], "tier2");
        assert_eq!(
            value["story_context"]["setting"],
            crate::story_context::GENERIC_SETTING
        );
    }

    #[test]
    fn content_types() {
        assert_eq!(formatter_for(OutputFormat::Markdown).content_type(), "text/markdown; charset=utf-8");
        assert_eq!(formatter_for(OutputFormat::Json).content_type(), "application/json");
    }
}
