//! Production wiring from `Settings`

use async_trait::async_trait;
use chronicle_core::{
    ChronicleError, ChronicleResult, ResearchTier, SearchHit, Settings, Tier1SearchProvider,
};
use chronicle_llm::SiumaiLlmClient;
use chronicle_search::{create_tier1_provider, TavilySearch};
use std::sync::Arc;
use tracing::info;

use crate::escalation::{EscalationConfig, QualityEvaluator};
use crate::orchestrator::{OrchestratorConfig, ResearchOrchestrator};
use crate::story_context::StoryContextBuilder;

/// Tier 1 stand-in used when `tier1_enabled = false`
struct DisabledTier1;

#[async_trait]
impl Tier1SearchProvider for DisabledTier1 {
    async fn search(&self, _query: &str, _max_results: usize) -> ChronicleResult<Vec<SearchHit>> {
        Err(ChronicleError::web_search(
            ResearchTier::Tier1,
            "Tier 1 search is disabled in configuration",
        ))
    }

    fn name(&self) -> &str {
        "disabled"
    }
}

/// Build the orchestrator with the real LLM and search adapters
pub fn build_orchestrator(settings: &Settings) -> ChronicleResult<ResearchOrchestrator> {
    settings.validate()?;

    let escalation = EscalationConfig::from_settings(settings);
    escalation.validate()?;

    let llm = SiumaiLlmClient::new(settings.llm_config()?);
    let tier1: Arc<dyn Tier1SearchProvider> = if settings.tier1_enabled {
        create_tier1_provider(settings)?
    } else {
        Arc::new(DisabledTier1)
    };
    let tier2 = TavilySearch::from_settings(settings)?;

    info!(
        llm_provider = %settings.llm_provider,
        llm_model = %settings.llm_model,
        tier1 = tier1.name(),
        tier2_available = settings.is_tier2_available(),
        "Research orchestrator configured"
    );

    Ok(ResearchOrchestrator::new(
        tier1,
        Arc::new(tier2),
        Arc::new(llm),
        Arc::new(QualityEvaluator::new(escalation)),
        OrchestratorConfig::from_settings(settings),
    ))
}

/// Everything a front end needs to serve research requests
#[derive(Clone)]
pub struct ResearchServices {
    pub orchestrator: Arc<ResearchOrchestrator>,
    pub story_builder: StoryContextBuilder,
    pub tier1_available: bool,
    pub llm_provider: String,
    pub llm_model: String,
}

impl ResearchServices {
    pub fn from_settings(settings: &Settings) -> ChronicleResult<Self> {
        let orchestrator = build_orchestrator(settings)?;
        Ok(Self::new(orchestrator, settings.is_tier1_available()))
    }

    pub fn new(orchestrator: ResearchOrchestrator, tier1_available: bool) -> Self {
        let llm_provider = orchestrator.llm().provider_name().to_string();
        let llm_model = orchestrator.llm().model_name().to_string();
        Self {
            orchestrator: Arc::new(orchestrator),
            story_builder: StoryContextBuilder::new(),
            tier1_available,
            llm_provider,
            llm_model,
        }
    }

    pub fn tier2_available(&self) -> bool {
        self.orchestrator.tier2_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_build_without_tier2() {
        let services = ResearchServices::from_settings(&Settings::default()).unwrap();
        assert!(!services.tier2_available());
        assert!(services.tier1_available);
        assert_eq!(services.llm_provider, "openai");
        assert_eq!(services.orchestrator.tier1_name(), "duckduckgo");
    }

    #[test]
    fn disabled_tier1_is_reported() {
        let settings = Settings {
            tier1_enabled: false,
            ..Settings::default()
        };
        let services = ResearchServices::from_settings(&settings).unwrap();
        assert!(!services.tier1_available);
        assert_eq!(services.orchestrator.tier1_name(), "disabled");
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let settings = Settings {
            llm_provider: "nonsense".to_string(),
            ..Settings::default()
        };
        assert!(build_orchestrator(&settings).is_err());
    }

    #[tokio::test]
    async fn disabled_tier1_fails_searches() {
        let err = DisabledTier1.search("rome", 3).await.unwrap_err();
        assert_eq!(err.error_type(), "web_search_failure");
    }
}
