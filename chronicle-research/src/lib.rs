//! Chronicle Research - tiered research orchestration
//!
//! Runs a cheap Tier 1 search first, scores the outcome and escalates to Tier 2 when the
//! result is not good enough. Also provides citation formatting, source validation, story
//! context building and output rendering.
//!
//! ## Architecture
//!
//! - **Pure building blocks**: `heuristics`, `escalation`, `merge`, `citation`, `validation`
//! - **Orchestration**: `orchestrator` wires collaborators behind `chronicle-core` traits
//! - **Wiring**: `factory` builds a production orchestrator from `Settings`

pub mod citation;
pub mod escalation;
pub mod factory;
pub mod heuristics;
pub mod merge;
pub mod orchestrator;
pub mod output;
pub mod story_context;
pub mod validation;

pub use citation::{CitationFormatter, CitationOptions};
pub use escalation::{evaluate, quality_score, EscalationConfig, QualityEvaluator};
pub use factory::{build_orchestrator, ResearchServices};
pub use heuristics::{estimate_confidence, identify_gaps, GAP_PHRASES};
pub use merge::merge_sources;
pub use orchestrator::{OrchestratorConfig, ResearchOrchestrator};
pub use output::{
    formatter_for, render, JsonOutput, MarkdownOutput, ResultFormatter, StructuredOutput,
};
pub use story_context::StoryContextBuilder;
pub use validation::ValidationService;
