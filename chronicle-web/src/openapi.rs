//! OpenAPI specification for the Chronicle API

use axum::response::Json;
use utoipa::OpenApi;

use crate::handlers::{
    ErrorResponse, HealthResponse, HistoricalPeriodDto, ResearchContextResponse, ResearchRequest,
    ResearchResponse, SourceDto, StoryContextDto,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Chronicle API",
        version = "0.1.0",
        description = "Tiered historical research with citations",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    paths(
        crate::handlers::health_check,
        crate::handlers::research,
        crate::handlers::research_basic,
        crate::handlers::research_deep,
        crate::handlers::research_context,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorResponse,
            ResearchRequest,
            ResearchResponse,
            ResearchContextResponse,
            HistoricalPeriodDto,
            SourceDto,
            StoryContextDto,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Research", description = "Tiered research operations"),
    )
)]
pub struct ApiDoc;

/// Serve the OpenAPI document
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
