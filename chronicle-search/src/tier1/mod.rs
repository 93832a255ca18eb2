//! Tier 1 search backends

use chronicle_core::{ChronicleResult, SearchHit, Settings, Tier1Backend, Tier1SearchProvider};
use std::sync::Arc;

pub mod brave;
pub mod duckduckgo;

pub use brave::BraveSearch;
pub use duckduckgo::DuckDuckGoSearch;

/// Create the Tier 1 backend selected in settings
pub fn create_tier1_provider(settings: &Settings) -> ChronicleResult<Arc<dyn Tier1SearchProvider>> {
    let domains = settings.tier1_allowed_domains.clone();
    let provider: Arc<dyn Tier1SearchProvider> = match settings.tier1_backend {
        Tier1Backend::DuckDuckGo => Arc::new(DuckDuckGoSearch::new()?.with_allowed_domains(domains)),
        Tier1Backend::Brave => Arc::new(
            BraveSearch::new(settings.brave_api_key.clone())?.with_allowed_domains(domains),
        ),
    };
    Ok(provider)
}

/// Whether `url` belongs to one of `domains` (exact host or a subdomain)
pub fn is_allowed(url: &str, domains: &[String]) -> bool {
    if domains.is_empty() {
        return true;
    }
    let Some(host) = url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
    else {
        return false;
    };
    domains.iter().any(|d| {
        let d = d.trim().to_lowercase();
        host == d || host.ends_with(&format!(".{}", d))
    })
}

/// Keep hits from allowed domains, then cut to `max_results`
pub(crate) fn finish_hits(hits: Vec<SearchHit>, domains: &[String], max_results: usize) -> Vec<SearchHit> {
    hits.into_iter()
        .filter(|h| is_allowed(&h.url, domains))
        .take(max_results)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(url: &str) -> SearchHit {
        SearchHit {
            title: "t".to_string(),
            url: url.to_string(),
            snippet: String::new(),
        }
    }

    #[test]
    fn empty_domain_list_allows_everything() {
        assert!(is_allowed("https://anything.example/page", &[]));
    }

    #[test]
    fn subdomains_match_but_lookalikes_do_not() {
        let domains = vec!["wikipedia.org".to_string()];
        assert!(is_allowed("https://en.wikipedia.org/wiki/Rome", &domains));
        assert!(is_allowed("https://wikipedia.org/", &domains));
        assert!(!is_allowed("https://notwikipedia.org/", &domains));
        assert!(!is_allowed("not a url", &domains));
    }

    #[test]
    fn configured_domains_ignore_case() {
        let domains = vec!["Wikipedia.org".to_string(), " BRITANNICA.COM ".to_string()];
        assert!(is_allowed("https://en.wikipedia.org/wiki/Rome", &domains));
        assert!(is_allowed("https://www.britannica.com/place/Rome", &domains));
        assert!(!is_allowed("https://example.com/", &domains));
    }

    #[test]
    fn finish_hits_filters_then_truncates() {
        let domains = vec!["britannica.com".to_string()];
        let hits = vec![
            hit("https://example.com/a"),
            hit("https://www.britannica.com/a"),
            hit("https://www.britannica.com/b"),
            hit("https://www.britannica.com/c"),
        ];
        let kept = finish_hits(hits, &domains, 2);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].url, "https://www.britannica.com/a");
    }

    #[test]
    fn factory_selects_backend() {
        let settings = Settings::default();
        assert_eq!(create_tier1_provider(&settings).unwrap().name(), "duckduckgo");

        let brave = Settings {
            tier1_backend: Tier1Backend::Brave,
            brave_api_key: Some("key".to_string()),
            ..Settings::default()
        };
        assert_eq!(create_tier1_provider(&brave).unwrap().name(), "brave");
    }
}
