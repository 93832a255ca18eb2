//! Chronicle Search - web search and page extraction adapters
//!
//! Tier 1 talks to a keyless or cheap search backend, Tier 2 to Tavily. The scraper and
//! extractor turn result pages into text and citation metadata.

pub mod extractor;
pub mod http;
pub mod fetch;
pub mod tier1;
pub mod tier2;

pub use extractor::HtmlContentExtractor;
pub use http::HttpClientConfig;
pub use fetch::WebScraper;
pub use tier1::{create_tier1_provider, BraveSearch, DuckDuckGoSearch};
pub use tier2::TavilySearch;
