//! Property checks over the public research building blocks

use chronicle_core::{CitationStyle, ResearchQuery, ResearchResult, ResearchTier, Source};
use chronicle_research::{
    evaluate, identify_gaps, merge_sources, CitationFormatter, CitationOptions, EscalationConfig,
    ValidationService,
};
use proptest::prelude::*;

fn sources(urls: &[String]) -> Vec<Source> {
    urls.iter().map(|u| Source::new(u.clone(), "title")).collect()
}

proptest! {
    #[test]
    fn derived_fields_track_sources_and_confidence(count in 0usize..20, confidence in 0.0f64..=1.0) {
        let urls: Vec<String> = (0..count).map(|i| format!("https://{}.example", i)).collect();
        let result = ResearchResult::new("q", ResearchTier::Tier1)
            .with_sources(sources(&urls))
            .with_confidence(confidence);
        prop_assert_eq!(result.source_count(), result.sources.len());
        prop_assert_eq!(result.is_high_confidence(), confidence >= 0.8);
        prop_assert_eq!(result.is_low_confidence(), confidence < 0.6);
    }

    #[test]
    fn citations_contain_author_verbatim(author in "[A-Z][a-z]{1,12}( [A-Z][a-z]{1,12})?", apa in any::<bool>()) {
        let style = if apa { CitationStyle::Apa } else { CitationStyle::Mla };
        let formatter = CitationFormatter::new(CitationOptions::new(style, true));
        let source = Source::new("https://example.org/page", "A Title").with_author(author.clone());
        let citations = formatter.format(&[source]);
        prop_assert_eq!(citations.len(), 1);
        prop_assert!(citations[0].contains(&author));
    }

    #[test]
    fn merge_output_is_bounded(a in prop::collection::vec("https://[a-f]\\.x", 0..6), b in prop::collection::vec("https://[a-f]\\.x", 0..6)) {
        let merged = merge_sources(sources(&a), sources(&b));
        prop_assert!(merged.len() <= a.len() + b.len());
        for url in &a {
            prop_assert!(merged.iter().any(|s| &s.url == url));
        }
    }

    #[test]
    fn credibility_stays_in_unit_range(
        trusted in any::<bool>(),
        author in any::<bool>(),
        publisher in any::<bool>(),
        accessed in any::<bool>(),
    ) {
        let url = if trusted { "https://www.britannica.com/event" } else { "https://blog.example.com/post" };
        let mut source = Source::new(url, "Title");
        if author {
            source = source.with_author("Historian");
        }
        if publisher {
            source = source.with_publisher("Press");
        }
        if !accessed {
            source = source.with_date_accessed("");
        }
        let score = ValidationService::new().assess_source_credibility(&source);
        prop_assert!((0.0..=1.0).contains(&score));
        prop_assert_eq!(score == 1.0, trusted && author && publisher && accessed);
    }

    #[test]
    fn repeated_phrases_count_once(repeats in 1usize..6) {
        let findings = "unclear and contradictory. ".repeat(repeats);
        prop_assert_eq!(identify_gaps(&findings).len(), 2);
    }
}

#[test]
fn apa_includes_publication_year() {
    let formatter = CitationFormatter::new(CitationOptions::new(CitationStyle::Apa, true));
    let source = Source::new("https://example.org", "Title").with_date_published("2020");
    assert!(formatter.format(&[source])[0].contains("(2020)"));
}

#[test]
fn gap_trigger_dominates_weighted_score() {
    let urls: Vec<String> = (0..6).map(|i| format!("https://{}.example", i)).collect();
    let result = ResearchResult::new("q", ResearchTier::Tier1)
        .with_sources(sources(&urls))
        .with_confidence(1.0)
        .with_gaps(vec!["Uncertainty detected: unknown".to_string()]);

    let decision = evaluate(&result, &ResearchQuery::new("q"), &EscalationConfig::default());
    assert!(decision.quality_score > 0.9);
    assert!(decision.should_escalate);
}
