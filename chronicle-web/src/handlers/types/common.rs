//! Types shared by several handlers

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    pub tier1_available: bool,
    pub tier2_available: bool,
    #[schema(example = "openai")]
    pub llm_provider: String,
    #[schema(example = "gpt-4")]
    pub llm_model: String,
    #[schema(example = "0.1.0")]
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error body returned for every failed request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "query: must not be empty")]
    pub detail: String,
    #[schema(example = "validation_failure")]
    pub error_type: String,
}
