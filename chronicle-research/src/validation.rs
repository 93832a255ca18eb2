//! Historical date sanity checks, source credibility and fact cross-referencing

use chrono::Datelike;
use chronicle_core::Source;

/// Earliest year accepted by `validate_historical_date`
pub const EARLIEST_YEAR: i32 = -3000;

/// URL fragments that mark a well-known reference publisher
pub const HIGH_CREDIBILITY_DOMAINS: [&str; 6] = [
    "wikipedia.org",
    "britannica.com",
    ".edu",
    ".gov",
    "jstor.org",
    "archive.org",
];

/// Sources needed before a fact counts as verified
pub const MIN_CORROBORATING_SOURCES: usize = 2;

const BASE_CREDIBILITY: f64 = 0.5;
const DOMAIN_BONUS: f64 = 0.2;
const METADATA_BONUS: f64 = 0.1;

/// Words shorter than this never count as significant fact terms
const MIN_TERM_LEN: usize = 4;

const STOP_WORDS: [&str; 12] = [
    "that", "this", "with", "from", "were", "was", "have", "been", "which", "their", "there",
    "into",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationService;

impl ValidationService {
    pub fn new() -> Self {
        Self
    }

    /// Whether `date` carries a plausible year for a historical event
    ///
    /// The year is the first `-`-separated component; a leading `-` marks BCE.
    pub fn validate_historical_date(&self, event: &str, date: &str) -> bool {
        let current_year = chrono::Local::now().year();
        let valid = leading_year(date)
            .map(|year| (EARLIEST_YEAR..=current_year).contains(&year))
            .unwrap_or(false);
        if !valid {
            tracing::debug!(event, date, "Rejected historical date");
        }
        valid
    }

    /// Credibility score in [0, 1] from domain and available metadata
    pub fn assess_source_credibility(&self, source: &Source) -> f64 {
        let url = source.url.to_lowercase();
        let mut score = BASE_CREDIBILITY;

        if HIGH_CREDIBILITY_DOMAINS.iter().any(|d| url.contains(d)) {
            score += DOMAIN_BONUS;
        }
        if has_text(&source.author) {
            score += METADATA_BONUS;
        }
        if has_text(&source.publisher) {
            score += METADATA_BONUS;
        }
        if !source.date_accessed.trim().is_empty() {
            score += METADATA_BONUS;
        }

        // summed tenths land on 0.9999.. without rounding
        ((score * 100.0).round() / 100.0).min(1.0)
    }

    /// Count the sources whose title mentions a significant term of `fact`
    ///
    /// Returns `(verified, matching_sources)`.
    pub fn cross_reference_facts(&self, fact: &str, sources: &[Source]) -> (bool, usize) {
        let terms = significant_terms(fact);
        if terms.is_empty() {
            return (false, 0);
        }

        let matching = sources
            .iter()
            .filter(|source| {
                let title = source.title.to_lowercase();
                terms.iter().any(|term| title.contains(term.as_str()))
            })
            .count();

        (matching >= MIN_CORROBORATING_SOURCES, matching)
    }
}

fn leading_year(date: &str) -> Option<i32> {
    let date = date.trim();
    let (negative, rest) = match date.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, date),
    };
    let year: i32 = rest.split('-').next()?.trim().parse().ok()?;
    Some(if negative { -year } else { year })
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

fn significant_terms(fact: &str) -> Vec<String> {
    fact.split(|c: char| !c.is_alphanumeric())
        .map(str::to_lowercase)
        .filter(|w| w.chars().count() >= MIN_TERM_LEN && !STOP_WORDS.contains(&w.as_str()))
        .collect()
}
