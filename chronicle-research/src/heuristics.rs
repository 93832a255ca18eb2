//! Confidence and gap heuristics applied to raw tier output

/// Phrases that signal uncertainty in generated findings
pub const GAP_PHRASES: [&str; 6] = [
    "unclear",
    "uncertain",
    "unknown",
    "not enough information",
    "limited sources",
    "contradictory",
];

/// Confidence cap for Tier 2 results
pub const DEEP_CONFIDENCE_CAP: f64 = 0.95;

/// Confidence bonus for Tier 2 results
pub const DEEP_CONFIDENCE_BONUS: f64 = 0.1;

/// Confidence from the number of sources found
pub fn estimate_confidence(source_count: usize) -> f64 {
    match source_count {
        0 => 0.0,
        n if n >= 5 => 0.9,
        n if n >= 3 => 0.75,
        _ => 0.5,
    }
}

/// Tier 2 confidence: the source heuristic plus a bonus, capped
pub fn deep_confidence(source_count: usize) -> f64 {
    (estimate_confidence(source_count) + DEEP_CONFIDENCE_BONUS).min(DEEP_CONFIDENCE_CAP)
}

/// One `"Uncertainty detected: <phrase>"` entry per phrase present in `findings`
pub fn identify_gaps(findings: &str) -> Vec<String> {
    let lower = findings.to_lowercase();
    GAP_PHRASES
        .iter()
        .filter(|phrase| lower.contains(*phrase))
        .map(|phrase| format!("Uncertainty detected: {}", phrase))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_steps() {
        assert_eq!(estimate_confidence(0), 0.0);
        assert_eq!(estimate_confidence(1), 0.5);
        assert_eq!(estimate_confidence(2), 0.5);
        assert_eq!(estimate_confidence(3), 0.75);
        assert_eq!(estimate_confidence(4), 0.75);
        assert_eq!(estimate_confidence(5), 0.9);
        assert_eq!(estimate_confidence(40), 0.9);
    }

    #[test]
    fn deep_confidence_is_capped() {
        assert!((deep_confidence(1) - 0.6).abs() < 1e-9);
        assert!((deep_confidence(3) - 0.85).abs() < 1e-9);
        assert_eq!(deep_confidence(5), 0.95);
        assert!((deep_confidence(0) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn gaps_are_case_insensitive_and_unique_per_phrase() {
        let gaps = identify_gaps("The date is UNCLEAR. Also unclear: who. Sources are Contradictory.");
        assert_eq!(
            gaps,
            vec![
                "Uncertainty detected: unclear".to_string(),
                "Uncertainty detected: contradictory".to_string(),
            ]
        );
    }

    #[test]
    fn clean_findings_have_no_gaps() {
        assert!(identify_gaps("Rome was founded in 753 BCE according to tradition.").is_empty());
    }

    #[test]
    fn multi_word_phrases_are_detected() {
        let gaps = identify_gaps("There is not enough information and only limited sources.");
        assert_eq!(gaps.len(), 2);
    }
}
