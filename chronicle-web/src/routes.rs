//! Route definitions for the Chronicle web server

use crate::{handlers, openapi, AppState};
use axum::{
    routing::{get, post},
    Router,
};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/research", post(handlers::research))
        .route("/research/basic", post(handlers::research_basic))
        .route("/research/deep", post(handlers::research_deep))
        .route("/research/context", post(handlers::research_context))
        .route("/openapi.json", get(openapi::openapi_json))
}
