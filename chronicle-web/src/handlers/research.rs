//! Research handlers

use super::types::{ErrorResponse, ResearchContextResponse, ResearchRequest, ResearchResponse};
use crate::{ApiError, AppState};
use axum::{
    extract::State,
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Json, Response},
    Json as JsonExtractor,
};
use chronicle_core::{
    ChronicleError, CitationStyle, OutputFormat, ResearchDepth, ResearchQuery, ResearchResult,
};
use chronicle_research::{formatter_for, CitationOptions};
use tracing::info;

/// A validated research request
struct ParsedRequest {
    query: ResearchQuery,
    output_format: OutputFormat,
    citation: CitationOptions,
}

fn parse_request(
    state: &AppState,
    request: ResearchRequest,
    forced_depth: Option<ResearchDepth>,
) -> Result<ParsedRequest, ApiError> {
    let depth = match (forced_depth, request.depth.as_deref()) {
        (Some(depth), _) => depth,
        (None, Some(depth)) => depth.parse::<ResearchDepth>()?,
        (None, None) => ResearchDepth::default(),
    };

    let output_format = match request.output_format.as_deref() {
        Some(format) => format.parse::<OutputFormat>()?,
        None => state.settings.default_output_format,
    };

    let mut citation = state.services.orchestrator.config().citation;
    if let Some(style) = request.citation_format.as_deref() {
        citation = citation.with_style(CitationStyle::parse(style));
    }

    let mut query = ResearchQuery::new(request.query).with_depth(depth);
    query.max_sources = request.max_sources;
    query.historical_period = request.historical_period.map(Into::into);
    query.validate()?;

    Ok(ParsedRequest {
        query,
        output_format,
        citation,
    })
}

fn respond(result: ResearchResult, format: OutputFormat) -> Result<Response, ApiError> {
    if format == OutputFormat::Json {
        return Ok(Json(ResearchResponse::from(result)).into_response());
    }
    let formatter = formatter_for(format);
    let body = formatter.format(&result)?;
    Ok(([(CONTENT_TYPE, formatter.content_type())], body).into_response())
}

async fn run_research(
    state: &AppState,
    request: ResearchRequest,
    forced_depth: Option<ResearchDepth>,
) -> Result<Response, ApiError> {
    let parsed = parse_request(state, request, forced_depth)?;
    info!(
        "Research request: '{}' (depth {}, format {:?})",
        parsed.query.query, parsed.query.depth, parsed.output_format
    );

    let result = state
        .services
        .orchestrator
        .research_with_options(&parsed.query, parsed.citation)
        .await;
    respond(result, parsed.output_format)
}

/// Run research at the requested depth
#[utoipa::path(
    post,
    path = "/api/research",
    tag = "Research",
    summary = "Research a historical question",
    description = "Runs Tier 1 research and escalates to Tier 2 when needed. \
                   Returns JSON by default, or Markdown when output_format is markdown.",
    request_body = ResearchRequest,
    responses(
        (status = 200, description = "Research result", body = ResearchResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    )
)]
pub async fn research(
    State(state): State<AppState>,
    JsonExtractor(request): JsonExtractor<ResearchRequest>,
) -> Result<Response, ApiError> {
    run_research(&state, request, None).await
}

/// Run Tier 1 research only
#[utoipa::path(
    post,
    path = "/api/research/basic",
    tag = "Research",
    summary = "Basic research",
    description = "Tier 1 research only, regardless of the requested depth",
    request_body = ResearchRequest,
    responses(
        (status = 200, description = "Research result", body = ResearchResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    )
)]
pub async fn research_basic(
    State(state): State<AppState>,
    JsonExtractor(request): JsonExtractor<ResearchRequest>,
) -> Result<Response, ApiError> {
    run_research(&state, request, Some(ResearchDepth::Basic)).await
}

/// Run Tier 2 research directly
#[utoipa::path(
    post,
    path = "/api/research/deep",
    tag = "Research",
    summary = "Deep research",
    description = "Tier 2 research directly; fails when Tier 2 is not configured",
    request_body = ResearchRequest,
    responses(
        (status = 200, description = "Research result", body = ResearchResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 503, description = "Tier 2 unavailable", body = ErrorResponse)
    )
)]
pub async fn research_deep(
    State(state): State<AppState>,
    JsonExtractor(request): JsonExtractor<ResearchRequest>,
) -> Result<Response, ApiError> {
    if !state.services.tier2_available() {
        return Err(ChronicleError::tier2_unavailable(
            "Tier 2 is not configured; set TIER2_ENABLED and TAVILY_API_KEY",
        )
        .into());
    }
    run_research(&state, request, Some(ResearchDepth::Deep)).await
}

/// Run research and derive a story context from it
#[utoipa::path(
    post,
    path = "/api/research/context",
    tag = "Research",
    summary = "Research with story context",
    description = "Runs research, then extracts setting, figures, events and daily-life details",
    request_body = ResearchRequest,
    responses(
        (status = 200, description = "Research result with story context", body = ResearchContextResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    )
)]
pub async fn research_context(
    State(state): State<AppState>,
    JsonExtractor(request): JsonExtractor<ResearchRequest>,
) -> Result<Json<ResearchContextResponse>, ApiError> {
    let parsed = parse_request(&state, request, None)?;
    let orchestrator = &state.services.orchestrator;

    let result = orchestrator
        .research_with_options(&parsed.query, parsed.citation)
        .await;
    let story_context = state
        .services
        .story_builder
        .build_with_llm(
            orchestrator.llm().as_ref(),
            &result,
            parsed.query.historical_period.as_ref(),
        )
        .await;

    Ok(Json(ResearchContextResponse {
        result: result.into(),
        story_context: story_context.into(),
    }))
}
