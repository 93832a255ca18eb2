//! Tavily search API backend

use async_trait::async_trait;
use chronicle_core::{
    retry_async, ChronicleError, ChronicleResult, ContentExtractor, ResearchTier, RetryConfig,
    SearchDepth, Settings, Source, Tier2SearchProvider,
};
use futures::FutureExt;
use log::{debug, info, warn};
use serde::Deserialize;
use std::sync::Arc;

use crate::extractor::HtmlContentExtractor;
use crate::fetch::WebScraper;
use crate::http::{create_http_client, handle_response_error, send_error, HttpClientConfig};

pub const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";

/// Credibility assigned to Tier 2 sources when Tavily omits a score
pub const DEFAULT_TIER2_CREDIBILITY: f64 = 0.8;

/// Rough characters-per-token ratio used to bound the search context
const CHARS_PER_TOKEN: usize = 4;

/// Number of results gathered when building a search context
const CONTEXT_RESULTS: usize = 10;

#[derive(Debug, Clone)]
pub struct TavilyConfig {
    pub api_key: Option<String>,
    pub enabled: bool,
    pub search_depth: SearchDepth,
    /// Fetch page metadata for this many top results; 0 disables enrichment
    pub enrich_top_k: usize,
}

impl TavilyConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            api_key: settings.tavily_api_key.clone(),
            enabled: settings.tier2_enabled,
            search_depth: settings.tier2_search_depth,
            enrich_top_k: settings.tier2_enrich_top_k,
        }
    }
}

/// Tier 2 search through the Tavily API
pub struct TavilySearch {
    client: reqwest::Client,
    config: TavilyConfig,
    endpoint: String,
    retry: RetryConfig,
    scraper: Option<WebScraper>,
    extractor: Arc<dyn ContentExtractor>,
}

#[derive(Debug, Deserialize)]
struct TavilySearchResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Clone, Deserialize)]
struct TavilyResult {
    url: String,
    title: Option<String>,
    content: Option<String>,
    score: Option<f64>,
    published_date: Option<String>,
}

impl TavilyResult {
    fn into_source(self) -> Source {
        let title = self
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| self.url.clone());
        let mut source = Source::new(self.url, title)
            .with_tier(ResearchTier::Tier2)
            .with_credibility(self.score.unwrap_or(DEFAULT_TIER2_CREDIBILITY));
        if let Some(date) = self.published_date.filter(|d| !d.trim().is_empty()) {
            source = source.with_date_published(date);
        }
        source
    }
}

impl TavilySearch {
    pub fn new(config: TavilyConfig) -> ChronicleResult<Self> {
        let client = create_http_client(
            &HttpClientConfig::default()
                .with_timeout(60)
                .with_header("Content-Type", "application/json"),
        )?;
        let scraper = if config.enrich_top_k > 0 {
            Some(WebScraper::new()?)
        } else {
            None
        };

        Ok(Self {
            client,
            config: TavilyConfig {
                api_key: config.api_key.filter(|k| !k.trim().is_empty()),
                ..config
            },
            endpoint: TAVILY_SEARCH_URL.to_string(),
            retry: RetryConfig::default(),
            scraper,
            extractor: Arc::new(HtmlContentExtractor::new()),
        })
    }

    pub fn from_settings(settings: &Settings) -> ChronicleResult<Self> {
        Self::new(TavilyConfig::from_settings(settings))
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn ContentExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    fn api_key(&self) -> ChronicleResult<String> {
        if !self.config.enabled {
            return Err(ChronicleError::tier2_unavailable("Tier 2 is disabled"));
        }
        self.config
            .api_key
            .clone()
            .ok_or_else(|| ChronicleError::tier2_unavailable("Tavily API key not configured"))
    }

    async fn raw_search(&self, query: &str, max_results: usize) -> ChronicleResult<Vec<TavilyResult>> {
        let api_key = self.api_key()?;
        let body = serde_json::json!({
            "query": query,
            "max_results": max_results,
            "search_depth": self.config.search_depth.as_str(),
            "include_answer": false,
            "include_raw_content": false,
        });

        let client = self.client.clone();
        let endpoint = self.endpoint.clone();

        let parsed: TavilySearchResponse = retry_async(
            move || {
                let request = client
                    .post(&endpoint)
                    .header(reqwest::header::AUTHORIZATION, format!("Bearer {}", api_key))
                    .json(&body);
                async move {
                    let response = request
                        .send()
                        .await
                        .map_err(|e| send_error(ResearchTier::Tier2, "tavily", e))?;
                    if !response.status().is_success() {
                        return Err(handle_response_error(response, ResearchTier::Tier2, "tavily").await);
                    }
                    response
                        .json::<TavilySearchResponse>()
                        .await
                        .map_err(|e| send_error(ResearchTier::Tier2, "tavily", e))
                }
                .boxed()
            },
            self.retry.clone(),
            "tavily_search",
        )
        .await?;

        Ok(parsed.results)
    }

    /// Fill missing author/publisher/date on the top sources from their pages
    async fn enrich(&self, mut sources: Vec<Source>) -> Vec<Source> {
        let Some(scraper) = &self.scraper else {
            return sources;
        };
        let top_k = self.config.enrich_top_k.min(sources.len());
        if top_k == 0 {
            return sources;
        }

        let extractor = self.extractor.as_ref();
        let lookups = sources[..top_k]
            .iter()
            .map(|s| scraper.fetch_metadata(&s.url, extractor));
        let metadata = futures::future::join_all(lookups).await;

        for (source, meta) in sources.iter_mut().zip(metadata) {
            match meta {
                Ok(meta) => {
                    if source.author.is_none() {
                        source.author = meta.author;
                    }
                    if source.publisher.is_none() {
                        source.publisher = meta.publisher;
                    }
                    if source.date_published.is_none() {
                        source.date_published = meta.date;
                    }
                }
                Err(e) => warn!("Metadata enrichment failed for {}: {}", source.url, e),
            }
        }
        sources
    }
}

/// Concatenate result contents until the character budget is spent
fn build_context(results: &[TavilyResult], max_tokens: usize) -> String {
    let budget = max_tokens.saturating_mul(CHARS_PER_TOKEN);
    let mut context = String::new();

    for result in results {
        let Some(content) = result.content.as_deref().filter(|c| !c.trim().is_empty()) else {
            continue;
        };
        let entry = format!(
            "Source: {}\nTitle: {}\n{}\n\n",
            result.url,
            result.title.as_deref().unwrap_or(""),
            content.trim()
        );
        let remaining = budget.saturating_sub(context.chars().count());
        if remaining == 0 {
            break;
        }
        if entry.chars().count() > remaining {
            context.extend(entry.chars().take(remaining));
            break;
        }
        context.push_str(&entry);
    }

    context.trim_end().to_string()
}

#[async_trait]
impl Tier2SearchProvider for TavilySearch {
    fn is_available(&self) -> bool {
        self.config.enabled && self.config.api_key.is_some()
    }

    async fn search(&self, query: &str, max_results: usize) -> ChronicleResult<Vec<Source>> {
        debug!("Tavily search: {}", query);
        let results = self.raw_search(query, max_results).await?;
        let sources: Vec<Source> = results
            .into_iter()
            .take(max_results)
            .map(TavilyResult::into_source)
            .collect();
        info!("Tavily returned {} sources for '{}'", sources.len(), query);
        Ok(self.enrich(sources).await)
    }

    async fn search_context(&self, query: &str, max_tokens: usize) -> ChronicleResult<String> {
        debug!("Tavily search context: {} (max {} tokens)", query, max_tokens);
        let results = self.raw_search(query, CONTEXT_RESULTS).await?;
        Ok(build_context(&results, max_tokens))
    }
}
