//! Source list merging by URL identity

use chronicle_core::Source;
use std::collections::HashSet;

/// Merge two source lists
///
/// All of `primary` is kept in order. Each `secondary` source whose URL is not yet present
/// is appended in its original order; the first occurrence of a URL wins.
pub fn merge_sources(primary: Vec<Source>, secondary: Vec<Source>) -> Vec<Source> {
    let mut seen: HashSet<String> = primary.iter().map(|s| s.url.clone()).collect();
    let mut merged = primary;
    merged.reserve(secondary.len());

    for source in secondary {
        if seen.insert(source.url.clone()) {
            merged.push(source);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn src(url: &str, title: &str) -> Source {
        Source::new(url, title)
    }

    fn urls(sources: &[Source]) -> Vec<&str> {
        sources.iter().map(|s| s.url.as_str()).collect()
    }

    #[test]
    fn primary_first_then_unseen_secondary() {
        let primary = vec![src("https://a", "A2"), src("https://b", "B2")];
        let secondary = vec![src("https://c", "C1"), src("https://a", "A1"), src("https://d", "D1")];
        let merged = merge_sources(primary, secondary);
        assert_eq!(urls(&merged), vec!["https://a", "https://b", "https://c", "https://d"]);
        assert_eq!(merged[0].title, "A2");
    }

    #[test]
    fn empty_inputs() {
        assert!(merge_sources(Vec::new(), Vec::new()).is_empty());
        assert_eq!(merge_sources(Vec::new(), vec![src("https://x", "X")]).len(), 1);
        assert_eq!(merge_sources(vec![src("https://x", "X")], Vec::new()).len(), 1);
    }

    #[test]
    fn duplicates_inside_secondary_collapse() {
        let merged = merge_sources(
            vec![src("https://a", "A")],
            vec![src("https://b", "first"), src("https://b", "second")],
        );
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[1].title, "first");
    }

    fn url_list() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("https://[a-e]\\.example", 0..8)
    }

    fn unique(urls: Vec<String>) -> Vec<Source> {
        let mut seen = HashSet::new();
        urls.into_iter()
            .filter(|u| seen.insert(u.clone()))
            .map(|u| Source::new(u, "t"))
            .collect()
    }

    proptest! {
        #[test]
        fn self_merge_is_identity(list in url_list()) {
            let sources = unique(list);
            let merged = merge_sources(sources.clone(), sources.clone());
            prop_assert_eq!(merged, sources);
        }

        #[test]
        fn never_drops_primary_nor_duplicates(a in url_list(), b in url_list()) {
            let primary = unique(a);
            let secondary: Vec<Source> = b.into_iter().map(|u| Source::new(u, "t")).collect();
            let merged = merge_sources(primary.clone(), secondary.clone());

            prop_assert!(merged.len() <= primary.len() + secondary.len());
            prop_assert_eq!(&merged[..primary.len()], &primary[..]);

            let mut seen = HashSet::new();
            for s in &merged {
                prop_assert!(seen.insert(s.url.clone()), "duplicate url {}", s.url);
            }
            for s in &secondary {
                prop_assert!(seen.contains(&s.url));
            }
        }
    }
}
