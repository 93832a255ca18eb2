//! Brave Search API backend

use async_trait::async_trait;
use chronicle_core::{ChronicleError, ChronicleResult, ResearchTier, SearchHit, Tier1SearchProvider};
use log::{debug, info};
use serde::Deserialize;

use super::finish_hits;
use crate::http::{create_http_client, handle_response_error, send_error, HttpClientConfig};

pub const BRAVE_SEARCH_URL: &str = "https://api.search.brave.com/res/v1/web/search";

/// Brave caps `count` at this value
const BRAVE_MAX_COUNT: usize = 20;

/// Tier 1 search through the Brave Search API
pub struct BraveSearch {
    client: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
    allowed_domains: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct BraveWebSearchResponse {
    web: Option<BraveWeb>,
}

#[derive(Debug, Deserialize)]
struct BraveWeb {
    results: Option<Vec<BraveWebResult>>,
}

#[derive(Debug, Deserialize)]
struct BraveWebResult {
    url: String,
    title: Option<String>,
    description: Option<String>,
}

impl BraveSearch {
    pub fn new(api_key: Option<String>) -> ChronicleResult<Self> {
        let client = create_http_client(
            &HttpClientConfig::default()
                .with_timeout(20)
                .with_header("Accept", "application/json"),
        )?;
        Ok(Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            endpoint: BRAVE_SEARCH_URL.to_string(),
            allowed_domains: Vec::new(),
        })
    }

    pub fn with_allowed_domains(mut self, domains: Vec<String>) -> Self {
        self.allowed_domains = domains;
        self
    }
}

fn hits_from_response(parsed: BraveWebSearchResponse) -> Vec<SearchHit> {
    parsed
        .web
        .and_then(|w| w.results)
        .unwrap_or_default()
        .into_iter()
        .map(|r| SearchHit {
            title: r.title.unwrap_or_else(|| r.url.clone()),
            url: r.url,
            snippet: r.description.unwrap_or_default(),
        })
        .collect()
}

#[async_trait]
impl Tier1SearchProvider for BraveSearch {
    async fn search(&self, query: &str, max_results: usize) -> ChronicleResult<Vec<SearchHit>> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            ChronicleError::web_search(ResearchTier::Tier1, "Brave API key not configured")
        })?;

        debug!("Brave search: {}", query);

        let count = max_results.clamp(1, BRAVE_MAX_COUNT).to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .header("X-Subscription-Token", api_key)
            .query(&[("q", query), ("count", count.as_str())])
            .send()
            .await
            .map_err(|e| send_error(ResearchTier::Tier1, "brave", e))?;

        if !response.status().is_success() {
            return Err(handle_response_error(response, ResearchTier::Tier1, "brave").await);
        }

        let parsed: BraveWebSearchResponse = response
            .json()
            .await
            .map_err(|e| send_error(ResearchTier::Tier1, "brave", e))?;

        let hits = finish_hits(hits_from_response(parsed), &self.allowed_domains, max_results);
        info!("Brave returned {} results for '{}'", hits.len(), query);
        Ok(hits)
    }

    fn name(&self) -> &str {
        "brave"
    }
}
