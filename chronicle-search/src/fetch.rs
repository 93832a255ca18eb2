//! Page fetching for content extraction

use chronicle_core::{
    retry_async, ChronicleError, ChronicleResult, ContentExtractor, ErrorContext, PageMetadata,
    RetryConfig,
};
use futures::FutureExt;
use log::{debug, warn};

use crate::http::{create_http_client, HttpClientConfig};

/// Fetches HTML pages with browser-like headers
#[derive(Clone)]
pub struct WebScraper {
    client: reqwest::Client,
    retry: RetryConfig,
}

impl WebScraper {
    pub fn new() -> ChronicleResult<Self> {
        Self::with_config(&HttpClientConfig::browser())
    }

    pub fn with_config(config: &HttpClientConfig) -> ChronicleResult<Self> {
        Ok(Self {
            client: create_http_client(config)?,
            retry: RetryConfig::default()
                .with_max_attempts(2)
                .with_initial_delay_ms(500),
        })
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Fetch the HTML body of `url`
    pub async fn fetch(&self, url: &str) -> ChronicleResult<String> {
        let parsed = url::Url::parse(url)
            .map_err(|e| ChronicleError::content_extraction(url, format!("invalid URL: {}", e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ChronicleError::content_extraction(
                url,
                format!("unsupported scheme '{}'", parsed.scheme()),
            ));
        }

        debug!("Fetching {}", url);

        let client = self.client.clone();
        let target = url.to_string();
        retry_async(
            move || fetch_once(client.clone(), target.clone()).boxed(),
            self.retry.clone(),
            "scraper_fetch",
        )
        .await
    }

    /// Fetch `url` and read its citation metadata
    pub async fn fetch_metadata(
        &self,
        url: &str,
        extractor: &dyn ContentExtractor,
    ) -> ChronicleResult<PageMetadata> {
        let html = self.fetch(url).await?;
        Ok(extractor.metadata(&html))
    }

    /// Fetch `url` and extract its readable text
    pub async fn fetch_text(&self, url: &str, extractor: &dyn ContentExtractor) -> ChronicleResult<String> {
        let html = self.fetch(url).await?;
        extractor.extract(&html).map_err(|e| match e {
            ChronicleError::ContentExtraction { reason, context, .. } => {
                ChronicleError::ContentExtraction {
                    url: url.to_string(),
                    reason,
                    context,
                }
            }
            other => other,
        })
    }
}

async fn fetch_once(client: reqwest::Client, url: String) -> ChronicleResult<String> {
    let response = client.get(&url).send().await.map_err(|e| {
        let message = if e.is_timeout() {
            format!("Timed out fetching {}", url)
        } else {
            format!("Failed to fetch {}: {}", url, e)
        };
        ChronicleError::Network {
            message,
            source: Some(Box::new(e)),
            context: ErrorContext::new("web_scraper").with_operation("fetch"),
        }
    })?;

    let status = response.status();
    if status.is_server_error() || status.as_u16() == 429 {
        return Err(ChronicleError::Network {
            message: format!("HTTP {} fetching {}", status.as_u16(), url),
            source: None,
            context: ErrorContext::new("web_scraper")
                .with_operation("fetch")
                .with_suggestion("The site may be overloaded; retry later"),
        });
    }
    if !status.is_success() {
        return Err(ChronicleError::content_extraction(
            url.as_str(),
            format!("HTTP {}", status.as_u16()),
        ));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_lowercase();
    if !content_type.is_empty() && !content_type.contains("html") && !content_type.contains("text") {
        warn!("Skipping non-HTML content at {} ({})", url, content_type);
        return Err(ChronicleError::content_extraction(
            url.as_str(),
            format!("unsupported content type '{}'", content_type),
        ));
    }

    response.text().await.map_err(|e| ChronicleError::Network {
        message: format!("Failed to read body of {}: {}", url, e),
        source: Some(Box::new(e)),
        context: ErrorContext::new("web_scraper").with_operation("read_body"),
    })
}
