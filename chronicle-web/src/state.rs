//! Application state shared by every handler

use crate::WebResult;
use chronicle_core::Settings;
use chronicle_research::ResearchServices;
use std::sync::Arc;
use tracing::info;

/// Settings plus the research services built once at startup
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub services: ResearchServices,
}

impl AppState {
    /// Build the production services from settings
    pub fn new(settings: Settings) -> WebResult<Self> {
        let services = ResearchServices::from_settings(&settings)?;
        info!(
            "Research services ready (tier1: {}, tier2: {}, llm: {}/{})",
            services.tier1_available,
            services.tier2_available(),
            services.llm_provider,
            services.llm_model
        );
        Ok(Self::from_parts(settings, services))
    }

    /// Assemble state from already built services
    pub fn from_parts(settings: Settings, services: ResearchServices) -> Self {
        Self {
            settings: Arc::new(settings),
            services,
        }
    }
}
