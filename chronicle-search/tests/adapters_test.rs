//! Public-API tests for the search adapters

use chronicle_core::{ContentExtractor, Settings, Tier2SearchProvider};
use chronicle_search::{create_tier1_provider, HtmlContentExtractor, TavilySearch};
use std::sync::Arc;

#[test]
fn tier2_from_default_settings_is_unavailable() {
    let tavily = TavilySearch::from_settings(&Settings::default()).unwrap();
    assert!(!tavily.is_available());
}

#[test]
fn tier2_from_configured_settings_is_available() {
    let settings = Settings {
        tier2_enabled: true,
        tavily_api_key: Some("tvly-test".to_string()),
        tier2_enrich_top_k: 2,
        ..Settings::default()
    };
    let tavily = TavilySearch::from_settings(&settings).unwrap();
    assert!(tavily.is_available());
}

#[test]
fn extractor_works_behind_trait_object() {
    let extractor: Arc<dyn ContentExtractor> = Arc::new(HtmlContentExtractor::new());
    let html = r#"<html><head><title>Magna Carta</title><meta name="publisher" content="British Library"></head>
        <body><main><p>Sealed at Runnymede in 1215.</p></main></body></html>"#;

    let text = extractor.extract(html).unwrap();
    assert!(text.contains("Runnymede"));

    let meta = extractor.metadata(html);
    assert_eq!(meta.title.as_deref(), Some("Magna Carta"));
    assert_eq!(meta.publisher.as_deref(), Some("British Library"));
}

#[test]
fn tier1_factory_respects_backend_choice() {
    let provider = create_tier1_provider(&Settings::default()).unwrap();
    assert_eq!(provider.name(), "duckduckgo");
}
