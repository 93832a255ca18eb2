//! Tiered research orchestration
//!
//! One `research()` call walks a small state machine:
//!
//! - **basic**: Tier 1 search, snippet summary, heuristics
//! - **deep**: Tier 2 search and context, LLM synthesis (downgrades to basic when Tier 2 is
//!   unavailable)
//! - **auto**: basic first, then deep when the escalation strategy asks for it, with Tier 1
//!   sources merged behind the Tier 2 ones
//!
//! Collaborator failures never escape: they become a degraded result of the failing tier.

use chronicle_core::{
    log_research_request, log_research_result, log_tier_escalation, ChatMessage, ChronicleResult,
    CompletionOptions, EscalationStrategy, LlmProvider, ResearchDepth, ResearchQuery,
    ResearchResult, ResearchTier, SearchHit, Settings, Source, Tier1SearchProvider,
    Tier2SearchProvider,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::citation::{CitationFormatter, CitationOptions};
use crate::heuristics::{deep_confidence, estimate_confidence, identify_gaps};
use crate::merge::merge_sources;

/// Credibility given to every Tier 1 source
pub const TIER1_CREDIBILITY: f64 = 0.6;

pub const FAILURE_GAP: &str = "Complete research failure";

pub const NO_RESULTS_FINDINGS: &str = "No search results were found for this query.";

const RESEARCH_SYSTEM_PROMPT: &str = "You are a historical research assistant helping writers \
create historically accurate stories.

Your role:
1. Analyze the provided search material for factual historical information
2. Provide citations for all claims
3. Verify dates, events, and historical figures
4. Identify any gaps in available information
5. Assess your confidence in findings

When researching:
- Prioritize reliable sources (Wikipedia, Britannica, .edu domains, historical societies)
- Note any conflicting information from different sources
- Indicate confidence levels (high/medium/low)
- Flag when you need more sources or deeper research
- Focus on factual accuracy over creative interpretation

Output format:
- Main findings with inline citations [1], [2], etc. referring to the numbered sources
- Any gaps or uncertainties identified
- Historical period/era if applicable";

/// Orchestrator knobs taken from `Settings`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrchestratorConfig {
    pub enable_auto_escalation: bool,
    pub tier1_max_sources: usize,
    pub tier2_max_sources: usize,
    pub tier2_context_max_tokens: usize,
    pub citation: CitationOptions,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            enable_auto_escalation: true,
            tier1_max_sources: 10,
            tier2_max_sources: 20,
            tier2_context_max_tokens: 4000,
            citation: CitationOptions::default(),
        }
    }
}

impl OrchestratorConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            enable_auto_escalation: settings.enable_auto_escalation,
            tier1_max_sources: settings.tier1_max_sources,
            tier2_max_sources: settings.tier2_max_sources,
            tier2_context_max_tokens: settings.tier2_context_max_tokens,
            citation: CitationOptions::from_settings(settings),
        }
    }
}

/// Drives Tier 1, escalation, Tier 2 and merging for each query
pub struct ResearchOrchestrator {
    tier1: Arc<dyn Tier1SearchProvider>,
    tier2: Arc<dyn Tier2SearchProvider>,
    llm: Arc<dyn LlmProvider>,
    strategy: Arc<dyn EscalationStrategy>,
    config: OrchestratorConfig,
}

impl ResearchOrchestrator {
    pub fn new(
        tier1: Arc<dyn Tier1SearchProvider>,
        tier2: Arc<dyn Tier2SearchProvider>,
        llm: Arc<dyn LlmProvider>,
        strategy: Arc<dyn EscalationStrategy>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            tier1,
            tier2,
            llm,
            strategy,
            config,
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn llm(&self) -> &Arc<dyn LlmProvider> {
        &self.llm
    }

    pub fn tier1_name(&self) -> &str {
        self.tier1.name()
    }

    pub fn tier2_available(&self) -> bool {
        self.tier2.is_available()
    }

    /// Research with the configured citation options
    pub async fn research(&self, query: &ResearchQuery) -> ResearchResult {
        self.research_with_options(query, self.config.citation).await
    }

    /// Research with per-request citation options; never fails
    pub async fn research_with_options(
        &self,
        query: &ResearchQuery,
        citation: CitationOptions,
    ) -> ResearchResult {
        let span = info_span!("research", query = %query.query, depth = %query.depth);
        async move {
            log_research_request(&query.query, query.depth);
            let start = Instant::now();
            let formatter = CitationFormatter::new(citation);

            let result = match self.effective_depth(query.depth) {
                ResearchDepth::Basic => self.run_basic(query, &formatter).await,
                ResearchDepth::Deep => self.run_deep(query, &formatter).await,
                ResearchDepth::Auto => self.run_auto(query, &formatter).await,
            };

            let result = result.with_execution_time_ms(elapsed_ms(start));
            log_research_result(&result);
            result
        }
        .instrument(span)
        .await
    }

    fn effective_depth(&self, requested: ResearchDepth) -> ResearchDepth {
        match requested {
            ResearchDepth::Deep if !self.tier2.is_available() => {
                warn!("Tier 2 unavailable, downgrading deep research to basic");
                ResearchDepth::Basic
            }
            ResearchDepth::Auto if !self.config.enable_auto_escalation => {
                debug!("Auto escalation disabled, running basic research");
                ResearchDepth::Basic
            }
            depth => depth,
        }
    }

    async fn run_basic(&self, query: &ResearchQuery, formatter: &CitationFormatter) -> ResearchResult {
        let start = Instant::now();
        let outcome = self
            .tier1_research(query, formatter)
            .instrument(info_span!("tier1", backend = self.tier1.name()))
            .await;
        let result = outcome.unwrap_or_else(|e| {
            e.log();
            degraded(query, ResearchTier::Tier1, &e.to_string())
        });
        result.with_execution_time_ms(elapsed_ms(start))
    }

    async fn run_deep(&self, query: &ResearchQuery, formatter: &CitationFormatter) -> ResearchResult {
        let start = Instant::now();
        let outcome = self
            .tier2_research(query, formatter)
            .instrument(info_span!("tier2"))
            .await;
        let result = outcome.unwrap_or_else(|e| {
            e.log();
            degraded(query, ResearchTier::Tier2, &e.to_string())
        });
        result.with_execution_time_ms(elapsed_ms(start))
    }

    async fn run_auto(&self, query: &ResearchQuery, formatter: &CitationFormatter) -> ResearchResult {
        let r1 = self.run_basic(query, formatter).await;

        if !self.tier2.is_available() {
            debug!("Tier 2 unavailable, returning Tier 1 result");
            return r1;
        }

        let decision = info_span!("evaluate").in_scope(|| self.strategy.evaluate(&r1, query));
        if !decision.should_escalate {
            info!(
                quality_score = decision.quality_score,
                "Tier 1 result accepted: {}", decision.reason
            );
            return r1;
        }

        log_tier_escalation(&query.query, &decision.reason, decision.quality_score);
        let r2 = self.run_deep(query, formatter).await;

        info_span!("merge").in_scope(|| {
            let sources = merge_sources(r2.sources.clone(), r1.sources);
            let citations = formatter.format(&sources);
            debug!(
                tier2_sources = r2.source_count(),
                merged_sources = sources.len(),
                "Merged Tier 1 sources into Tier 2 result"
            );
            r2.with_sources_and_citations(sources, citations)
        })
    }

    async fn tier1_research(
        &self,
        query: &ResearchQuery,
        formatter: &CitationFormatter,
    ) -> ChronicleResult<ResearchResult> {
        let max_results = query.max_sources.unwrap_or(self.config.tier1_max_sources);
        let hits = self.tier1.search(&query.query, max_results).await?;
        info!("Tier 1 returned {} hits", hits.len());

        let sources: Vec<Source> = hits
            .iter()
            .take(max_results)
            .map(|hit| {
                Source::new(hit.url.clone(), hit.title.clone())
                    .with_credibility(TIER1_CREDIBILITY)
                    .with_tier(ResearchTier::Tier1)
            })
            .collect();

        let findings = if hits.is_empty() {
            NO_RESULTS_FINDINGS.to_string()
        } else {
            let material = snippet_material(&hits[..sources.len()]);
            self.synthesize(&query.query, &material).await?
        };

        Ok(self.assemble(
            query,
            ResearchTier::Tier1,
            findings,
            sources,
            formatter,
            estimate_confidence,
        ))
    }

    async fn tier2_research(
        &self,
        query: &ResearchQuery,
        formatter: &CitationFormatter,
    ) -> ChronicleResult<ResearchResult> {
        let max_results = query.max_sources.unwrap_or(self.config.tier2_max_sources);
        let sources = self.tier2.search(&query.query, max_results).await?;
        let context = self
            .tier2
            .search_context(&query.query, self.config.tier2_context_max_tokens)
            .await?;
        info!(
            "Tier 2 returned {} sources and {} chars of context",
            sources.len(),
            context.len()
        );

        let material = context_material(&sources, &context);
        let findings = self.synthesize(&query.query, &material).await?;

        Ok(self.assemble(
            query,
            ResearchTier::Tier2,
            findings,
            sources,
            formatter,
            deep_confidence,
        ))
    }

    async fn synthesize(&self, question: &str, material: &str) -> ChronicleResult<String> {
        let messages = vec![
            ChatMessage::system(RESEARCH_SYSTEM_PROMPT),
            ChatMessage::user(format!(
                "Research question: {}\n\n{}\n\nWrite the findings with inline citation markers \
                 such as [1] that refer to the numbered sources above.",
                question, material
            )),
        ];
        let findings = self
            .llm
            .complete(messages, CompletionOptions::default())
            .instrument(info_span!(
                "synthesize",
                provider = self.llm.provider_name(),
                model = self.llm.model_name()
            ))
            .await?;
        Ok(findings.trim().to_string())
    }

    fn assemble(
        &self,
        query: &ResearchQuery,
        tier: ResearchTier,
        findings: String,
        sources: Vec<Source>,
        formatter: &CitationFormatter,
        confidence: fn(usize) -> f64,
    ) -> ResearchResult {
        let gaps = identify_gaps(&findings);
        let citations = formatter.format(&sources);
        ResearchResult::new(query.query.clone(), tier)
            .with_confidence(confidence(sources.len()))
            .with_findings(findings)
            .with_sources(sources)
            .with_citations(citations)
            .with_gaps(gaps)
            .with_historical_period(query.historical_period.clone())
    }
}

/// Zero-confidence result describing a failed tier
pub fn degraded(query: &ResearchQuery, tier: ResearchTier, error: &str) -> ResearchResult {
    ResearchResult::new(query.query.clone(), tier)
        .with_findings(format!("Research failed: {}", error))
        .with_confidence(0.0)
        .with_gaps(vec![FAILURE_GAP.to_string()])
        .with_historical_period(query.historical_period.clone())
}

fn snippet_material(hits: &[SearchHit]) -> String {
    let mut material = String::from("Search results:\n");
    for (i, hit) in hits.iter().enumerate() {
        material.push_str(&format!(
            "[{}] {} ({})\n{}\n",
            i + 1,
            hit.title,
            hit.url,
            hit.snippet.trim()
        ));
    }
    material
}

fn context_material(sources: &[Source], context: &str) -> String {
    let mut material = String::from("Sources:\n");
    for (i, source) in sources.iter().enumerate() {
        material.push_str(&format!("[{}] {} ({})\n", i + 1, source.title, source.url));
    }
    material.push_str("\nSearch context:\n");
    material.push_str(context);
    material
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degraded_result_shape() {
        let query = ResearchQuery::new("Carthage");
        let result = degraded(&query, ResearchTier::Tier2, "timeout");
        assert_eq!(result.findings, "Research failed: timeout");
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.gaps, vec![FAILURE_GAP.to_string()]);
        assert!(result.sources.is_empty());
        assert!(result.citations.is_empty());
        assert_eq!(result.tier_used, ResearchTier::Tier2);
    }

    #[test]
    fn materials_number_their_sources() {
        let hits = vec![
            SearchHit {
                title: "Carthage".into(),
                url: "https://a".into(),
                snippet: " Punic city ".into(),
            },
            SearchHit {
                title: "Hannibal".into(),
                url: "https://b".into(),
                snippet: "General".into(),
            },
        ];
        let material = snippet_material(&hits);
        assert!(material.contains("[1] Carthage (https://a)\nPunic city"));
        assert!(material.contains("[2] Hannibal (https://b)"));

        let sources = vec![Source::new("https://c", "Zama")];
        let material = context_material(&sources, "Battle of Zama, 202 BCE");
        assert!(material.starts_with("Sources:\n[1] Zama (https://c)"));
        assert!(material.ends_with("Battle of Zama, 202 BCE"));
    }

    #[test]
    fn config_from_settings() {
        let settings = Settings {
            enable_auto_escalation: false,
            tier1_max_sources: 4,
            ..Settings::default()
        };
        let config = OrchestratorConfig::from_settings(&settings);
        assert!(!config.enable_auto_escalation);
        assert_eq!(config.tier1_max_sources, 4);
        assert_eq!(config.tier2_max_sources, settings.tier2_max_sources);
    }
}
