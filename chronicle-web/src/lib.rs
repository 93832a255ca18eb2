//! Chronicle Web Server
//!
//! HTTP API in front of the tiered research orchestrator.

pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod state;

pub use server::ChronicleServer;
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    http::{header::CONTENT_TYPE, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    Router,
};
use chronicle_core::{ChronicleError, LoggingConfig, Settings};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

use handlers::ErrorResponse;

/// Maximum accepted request body size
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.settings.cors_origins);

    Router::new()
        .nest("/api", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
}

/// Error types for the web server
#[derive(thiserror::Error, Debug)]
pub enum WebError {
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    #[error("Research setup error: {0}")]
    Research(#[from] ChronicleError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for web operations
pub type WebResult<T> = Result<T, WebError>;

/// Failed request, rendered as `{detail, error_type}`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
    pub error_type: String,
}

impl From<ChronicleError> for ApiError {
    fn from(error: ChronicleError) -> Self {
        let status = match &error {
            ChronicleError::Validation { .. } => StatusCode::BAD_REQUEST,
            ChronicleError::Tier2Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        error.log();
        Self {
            status,
            detail: error.to_string(),
            error_type: error.error_type().to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            detail: self.detail,
            error_type: self.error_type,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Initialize logging for the web server from settings
pub fn init_logging(settings: &Settings, level_override: Option<&str>) -> WebResult<()> {
    let mut config = LoggingConfig::from_settings(settings);
    if let Some(level) = level_override {
        config.level = level.to_lowercase();
    }
    config.filter_directives.push("tower_http=info".to_string());
    chronicle_core::init_logging(&config).map_err(|e| WebError::Config(e.to_string()))
}
