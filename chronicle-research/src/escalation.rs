//! Tier 1 quality scoring and escalation decisions

use chronicle_core::{
    clamp_unit, ChronicleResult, EscalationDecision, EscalationStrategy, ResearchQuery,
    ResearchResult, Settings,
};

const SOURCE_WEIGHT: f64 = 0.4;
const CONFIDENCE_WEIGHT: f64 = 0.4;
const COMPLETENESS_WEIGHT: f64 = 0.2;

/// Gap count at which the completeness score bottoms out
const MAX_EXPECTED_GAPS: f64 = 3.0;

pub const SUFFICIENT_REASON: &str = "Tier 1 results sufficient";

/// Thresholds used by the evaluator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EscalationConfig {
    /// Minimum number of sources, at least 1
    pub min_sources: usize,
    pub min_confidence: f64,
    pub quality_threshold: f64,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            min_sources: 3,
            min_confidence: 0.7,
            quality_threshold: 0.7,
        }
    }
}

impl EscalationConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            min_sources: settings.min_sources_tier1,
            min_confidence: settings.min_confidence_tier1,
            quality_threshold: settings.escalation_threshold,
        }
    }

    pub fn validate(&self) -> ChronicleResult<()> {
        if self.min_sources == 0 {
            return Err(chronicle_core::validation_error!(
                "min_sources must be at least 1",
                "min_sources",
                "escalation"
            ));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(chronicle_core::validation_error!(
                format!("min_confidence must be in [0, 1], got {}", self.min_confidence),
                "min_confidence",
                "escalation"
            ));
        }
        if !(0.0..=1.0).contains(&self.quality_threshold) {
            return Err(chronicle_core::validation_error!(
                format!("quality_threshold must be in [0, 1], got {}", self.quality_threshold),
                "quality_threshold",
                "escalation"
            ));
        }
        Ok(())
    }
}

/// Weighted quality of a result in [0, 1]
pub fn quality_score(result: &ResearchResult, config: &EscalationConfig) -> f64 {
    let min_sources = config.min_sources.max(1) as f64;
    let source_score = (result.source_count() as f64 / min_sources).min(1.0);
    let confidence_score = result.confidence;
    let gaps_penalty = (result.gaps.len() as f64 / MAX_EXPECTED_GAPS).min(1.0);
    let completeness_score = 1.0 - gaps_penalty;

    clamp_unit(
        SOURCE_WEIGHT * source_score
            + CONFIDENCE_WEIGHT * confidence_score
            + COMPLETENESS_WEIGHT * completeness_score,
    )
}

/// Decide whether a Tier 1 result must be escalated to Tier 2
///
/// Any detected gap escalates on its own, regardless of the weighted score.
pub fn evaluate(
    result: &ResearchResult,
    _query: &ResearchQuery,
    config: &EscalationConfig,
) -> EscalationDecision {
    let quality = quality_score(result, config);
    let mut reasons = Vec::new();

    if result.source_count() < config.min_sources {
        reasons.push(format!(
            "Insufficient sources ({} < {})",
            result.source_count(),
            config.min_sources
        ));
    }

    if result.confidence < config.min_confidence {
        reasons.push(format!(
            "Low confidence ({:.2} < {})",
            result.confidence, config.min_confidence
        ));
    }

    if !result.gaps.is_empty() {
        reasons.push(format!(
            "Information gaps identified: {} items",
            result.gaps.len()
        ));
    }

    if quality < config.quality_threshold {
        reasons.push(format!(
            "Overall quality score below threshold ({:.2} < {})",
            quality, config.quality_threshold
        ));
    }

    let should_escalate = !reasons.is_empty();
    let reason = if should_escalate {
        reasons.join("; ")
    } else {
        SUFFICIENT_REASON.to_string()
    };

    EscalationDecision {
        should_escalate,
        reason,
        tier1_result: Some(result.clone()),
        quality_score: quality,
    }
}

/// Rule-based evaluator over source count, confidence and gaps
#[derive(Debug, Clone, Default)]
pub struct QualityEvaluator {
    config: EscalationConfig,
}

impl QualityEvaluator {
    pub fn new(config: EscalationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EscalationConfig {
        &self.config
    }
}

impl EscalationStrategy for QualityEvaluator {
    fn evaluate(&self, result: &ResearchResult, query: &ResearchQuery) -> EscalationDecision {
        evaluate(result, query, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronicle_core::{ResearchTier, Source};
    use proptest::prelude::*;

    fn result_with(sources: usize, confidence: f64, gaps: usize) -> ResearchResult {
        ResearchResult::new("q", ResearchTier::Tier1)
            .with_sources(
                (0..sources)
                    .map(|i| Source::new(format!("https://s{}.example", i), "s"))
                    .collect(),
            )
            .with_confidence(confidence)
            .with_gaps((0..gaps).map(|i| format!("gap {}", i)).collect())
    }

    fn query() -> ResearchQuery {
        ResearchQuery::new("q")
    }

    #[test]
    fn weak_result_lists_every_reason() {
        let decision = evaluate(&result_with(1, 0.5, 0), &query(), &EscalationConfig::default());
        assert!(decision.should_escalate);
        // 0.4 * 1/3 + 0.4 * 0.5 + 0.2 * 1.0 = 0.5333
        assert_eq!(
            decision.reason,
            "Insufficient sources (1 < 3); Low confidence (0.50 < 0.7); \
             Overall quality score below threshold (0.53 < 0.7)"
        );
        assert!(decision.tier1_result.is_some());
    }

    #[test]
    fn strong_result_is_sufficient() {
        let decision = evaluate(&result_with(5, 0.9, 0), &query(), &EscalationConfig::default());
        assert!(!decision.should_escalate);
        assert_eq!(decision.reason, SUFFICIENT_REASON);
        assert!((decision.quality_score - 0.96).abs() < 1e-9);
    }

    #[test]
    fn single_gap_escalates_an_otherwise_strong_result() {
        // Pinned behaviour: a gap triggers escalation even when the weighted score passes.
        let result = result_with(5, 0.9, 1);
        let decision = evaluate(&result, &query(), &EscalationConfig::default());
        assert!(decision.quality_score >= 0.7);
        assert!(decision.should_escalate);
        assert_eq!(decision.reason, "Information gaps identified: 1 items");
    }

    #[test]
    fn quality_formula_matches_weights() {
        let config = EscalationConfig::default();
        let score = quality_score(&result_with(3, 0.75, 3), &config);
        // 0.4 * 1 + 0.4 * 0.75 + 0.2 * 0
        assert!((score - 0.7).abs() < 1e-9);
        let empty = quality_score(&result_with(0, 0.0, 5), &config);
        assert_eq!(empty, 0.0);
    }

    #[test]
    fn config_validation() {
        assert!(EscalationConfig::default().validate().is_ok());
        let zero = EscalationConfig {
            min_sources: 0,
            ..EscalationConfig::default()
        };
        assert!(zero.validate().is_err());
        let bad = EscalationConfig {
            quality_threshold: 1.5,
            ..EscalationConfig::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn strategy_delegates_to_evaluate() {
        let evaluator = QualityEvaluator::new(EscalationConfig::default());
        let result = result_with(1, 0.5, 0);
        assert_eq!(
            evaluator.evaluate(&result, &query()),
            evaluate(&result, &query(), evaluator.config())
        );
    }

    proptest! {
        #[test]
        fn evaluation_is_deterministic(sources in 0usize..10, confidence in 0.0f64..=1.0, gaps in 0usize..5) {
            let result = result_with(sources, confidence, gaps);
            let config = EscalationConfig::default();
            let first = evaluate(&result, &query(), &config);
            let second = evaluate(&result, &query(), &config);
            prop_assert_eq!(first.should_escalate, second.should_escalate);
            prop_assert_eq!(first.reason, second.reason);
            prop_assert_eq!(first.quality_score.to_bits(), second.quality_score.to_bits());
        }

        #[test]
        fn quality_is_monotonic(sources in 0usize..10, confidence in 0.0f64..0.9, gaps in 1usize..5) {
            let config = EscalationConfig::default();
            let base = quality_score(&result_with(sources, confidence, gaps), &config);
            prop_assert!(quality_score(&result_with(sources + 1, confidence, gaps), &config) >= base);
            prop_assert!(quality_score(&result_with(sources, confidence + 0.1, gaps), &config) >= base);
            prop_assert!(quality_score(&result_with(sources, confidence, gaps - 1), &config) >= base);
        }

        #[test]
        fn quality_stays_in_unit_interval(sources in 0usize..100, confidence in 0.0f64..=1.0, gaps in 0usize..20) {
            let score = quality_score(&result_with(sources, confidence, gaps), &EscalationConfig::default());
            prop_assert!((0.0..=1.0).contains(&score));
        }
    }
}
