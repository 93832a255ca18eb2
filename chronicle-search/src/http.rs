//! Shared HTTP client construction and response error handling

use chronicle_core::{ChronicleError, ChronicleResult, ErrorContext, ResearchTier};
use std::collections::HashMap;

/// Browser-like user agent; several result pages refuse obvious bots
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Configuration for outgoing HTTP clients
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
    /// Maximum number of redirects to follow
    pub max_redirects: usize,
    /// Additional headers
    pub headers: HashMap<String, String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: "chronicle/0.1".to_string(),
            max_redirects: 10,
            headers: HashMap::new(),
        }
    }
}

impl HttpClientConfig {
    /// Configuration for fetching human-facing HTML pages
    pub fn browser() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: BROWSER_USER_AGENT.to_string(),
            ..Default::default()
        }
        .with_header(
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )
        .with_header("Accept-Language", "en-US,en;q=0.5")
    }

    /// Set additional header
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }
}

fn client_error(message: String, source: Box<dyn std::error::Error + Send + Sync>) -> ChronicleError {
    ChronicleError::Network {
        message,
        source: Some(source),
        context: ErrorContext::new("http_client").with_operation("create_client"),
    }
}

/// Build a reqwest client with default headers, timeout and redirect policy
pub fn create_http_client(config: &HttpClientConfig) -> ChronicleResult<reqwest::Client> {
    let mut headers = reqwest::header::HeaderMap::new();

    headers.insert(
        reqwest::header::USER_AGENT,
        reqwest::header::HeaderValue::from_str(&config.user_agent)
            .map_err(|e| client_error(format!("Invalid user agent: {}", e), Box::new(e)))?,
    );

    for (key, value) in &config.headers {
        let header_name = reqwest::header::HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
            client_error(format!("Invalid header name '{}': {}", key, e), Box::new(e))
        })?;

        let header_value = reqwest::header::HeaderValue::from_str(value).map_err(|e| {
            client_error(format!("Invalid header value for '{}': {}", key, e), Box::new(e))
        })?;

        headers.insert(header_name, header_value);
    }

    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.timeout_seconds))
        .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
        .default_headers(headers)
        .build()
        .map_err(|e| client_error(format!("Failed to create HTTP client: {}", e), Box::new(e)))
}

/// Turn a transport error into a search error for the given tier
pub fn send_error(tier: ResearchTier, service: &str, err: reqwest::Error) -> ChronicleError {
    let message = if err.is_timeout() {
        format!("{} request timed out", service)
    } else {
        format!("{} request failed: {}", service, err)
    };
    ChronicleError::WebSearch {
        tier,
        message,
        source: Some(Box::new(err)),
        context: ErrorContext::new("web_search")
            .with_operation(service)
            .with_suggestion("Check network connectivity and search provider status"),
    }
}

/// Turn a non-success HTTP response into a search error for the given tier
pub async fn handle_response_error(
    response: reqwest::Response,
    tier: ResearchTier,
    service: &str,
) -> ChronicleError {
    let status = response.status();
    let url = response.url().clone();

    let error_body = response.text().await.unwrap_or_default();
    let detail: String = if error_body.is_empty() {
        status.canonical_reason().unwrap_or("Unknown error").to_string()
    } else {
        error_body.chars().take(200).collect()
    };

    ChronicleError::WebSearch {
        tier,
        message: format!("{} HTTP {} for {}: {}", service, status.as_u16(), url, detail),
        source: None,
        context: ErrorContext::new("web_search")
            .with_operation(service)
            .with_metadata("status", &status.as_u16().to_string())
            .with_suggestion(match status.as_u16() {
                401 | 403 => "Check the API key for the search provider",
                429 => "Rate limited by the search provider; retry later",
                _ => "Check network connectivity and search provider status",
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_clients_from_config() {
        assert!(create_http_client(&HttpClientConfig::default()).is_ok());
        assert!(create_http_client(&HttpClientConfig::browser().with_timeout(5)).is_ok());
    }

    #[test]
    fn rejects_invalid_header_names() {
        let config = HttpClientConfig::default().with_header("bad header", "x");
        let err = create_http_client(&config).unwrap_err();
        assert_eq!(err.error_type(), "network");
    }
}
