//! DuckDuckGo HTML search (no API key)

use async_trait::async_trait;
use chronicle_core::{ChronicleResult, ResearchTier, SearchHit, Tier1SearchProvider};
use log::{debug, info};

use super::finish_hits;
use crate::http::{create_http_client, handle_response_error, send_error, HttpClientConfig};

pub const DUCKDUCKGO_HTML_URL: &str = "https://html.duckduckgo.com/html/";

/// Tier 1 search through the DuckDuckGo HTML endpoint
pub struct DuckDuckGoSearch {
    client: reqwest::Client,
    endpoint: String,
    allowed_domains: Vec<String>,
}

impl DuckDuckGoSearch {
    pub fn new() -> ChronicleResult<Self> {
        let client = create_http_client(&HttpClientConfig::browser().with_timeout(20))?;
        Ok(Self {
            client,
            endpoint: DUCKDUCKGO_HTML_URL.to_string(),
            allowed_domains: Vec::new(),
        })
    }

    pub fn with_allowed_domains(mut self, domains: Vec<String>) -> Self {
        self.allowed_domains = domains;
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }
}

#[async_trait]
impl Tier1SearchProvider for DuckDuckGoSearch {
    async fn search(&self, query: &str, max_results: usize) -> ChronicleResult<Vec<SearchHit>> {
        debug!("DuckDuckGo search: {}", query);

        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("q", query)])
            .send()
            .await
            .map_err(|e| send_error(ResearchTier::Tier1, "duckduckgo", e))?;

        if !response.status().is_success() {
            return Err(handle_response_error(response, ResearchTier::Tier1, "duckduckgo").await);
        }

        let body = response
            .text()
            .await
            .map_err(|e| send_error(ResearchTier::Tier1, "duckduckgo", e))?;

        let hits = finish_hits(parse_results(&body), &self.allowed_domains, max_results);
        info!("DuckDuckGo returned {} results for '{}'", hits.len(), query);
        Ok(hits)
    }

    fn name(&self) -> &str {
        "duckduckgo"
    }
}

/// Parse the result list of a DuckDuckGo HTML page
pub fn parse_results(html: &str) -> Vec<SearchHit> {
    let doc = ::scraper::Html::parse_document(html);

    let (Ok(result_sel), Ok(link_sel), Ok(snippet_sel)) = (
        ::scraper::Selector::parse(".result"),
        ::scraper::Selector::parse("a.result__a"),
        ::scraper::Selector::parse("a.result__snippet, .result__snippet"),
    ) else {
        return Vec::new();
    };

    let mut hits = Vec::new();
    for result in doc.select(&result_sel) {
        let Some(link) = result.select(&link_sel).next() else {
            continue;
        };
        let title = collapse_whitespace(&link.text().collect::<String>());
        let url = extract_ddg_url(link.value().attr("href").unwrap_or(""));
        let snippet = result
            .select(&snippet_sel)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .unwrap_or_default();

        if title.is_empty() || !url.starts_with("http") {
            continue;
        }
        hits.push(SearchHit {
            title,
            url,
            snippet,
        });
    }
    hits
}

/// Unwrap `//duckduckgo.com/l/?uddg=<encoded>&rut=...` redirect links
pub fn extract_ddg_url(href: &str) -> String {
    if let Some(pos) = href.find("uddg=") {
        let start = pos + 5;
        let end = href[start..]
            .find('&')
            .map(|i| start + i)
            .unwrap_or(href.len());
        let encoded = &href[start..end];
        if !encoded.is_empty() {
            if let Ok(decoded) = urlencoding::decode(encoded) {
                return decoded.into_owned();
            }
        }
    }
    if let Some(rest) = href.strip_prefix("//") {
        return format!("https://{}", rest);
    }
    href.to_string()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
