//! Statistical analysis - winner selection, confidence and recommendation
//!
//! The composite score and the z thresholds are fixed heuristics kept for
//! output compatibility:
//!
//! ```text
//! score      = 0.4 * conversion_rate + 0.3 * completion_rate + 0.3 * average_score
//! confidence = z < 1.645 → 90 | z < 1.96 → 95 | z < 2.576 → 99 | else 99.9
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::VariantResult;
use crate::experiment::{ExperimentDefinition, Variant};
use crate::Result;

/// Weight of conversion rate in the composite score.
pub const CONVERSION_WEIGHT: f64 = 0.4;
/// Weight of completion rate in the composite score.
pub const COMPLETION_WEIGHT: f64 = 0.3;
/// Weight of average score in the composite score.
pub const SCORE_WEIGHT: f64 = 0.3;

/// Below this many impressions on either side, confidence is 0.
pub const MIN_IMPRESSIONS_FOR_CONFIDENCE: u64 = 30;

/// Default minimum total impressions before [`should_stop`] can fire.
pub const DEFAULT_MIN_SAMPLE_SIZE: u64 = 100;

/// Recommendation when no variant is marked control.
pub const NO_CONTROL_RECOMMENDATION: &str =
    "No control variant defined. Mark one variant as control to analyze this experiment.";

/// Recommendation when control scores best.
pub const CONTROL_BEST_RECOMMENDATION: &str =
    "Control is performing best. No change recommended.";

// (upper z bound, confidence %) pairs; anything above the last bound is 99.9
const Z_LEVELS: [(f64, f64); 3] = [(1.645, 90.0), (1.96, 95.0), (2.576, 99.0)];
const MAX_CONFIDENCE: f64 = 99.9;

/// Result of analyzing an experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    /// Per-variant aggregates keyed by variant id.
    pub results: BTreeMap<String, VariantResult>,
    /// Best non-control variant, if it beat control.
    pub winner: Option<String>,
    /// Discrete confidence level in percent (0, 90, 95, 99 or 99.9).
    pub confidence: f64,
    /// Human-readable recommendation.
    pub recommendation: String,
}

impl Analysis {
    /// Sum of impressions over all variants.
    #[must_use]
    pub fn total_impressions(&self) -> u64 {
        self.results.values().map(|r| r.impressions).sum()
    }

    /// Result for one variant.
    #[must_use]
    pub fn result(&self, variant_id: &str) -> Option<&VariantResult> {
        self.results.get(variant_id)
    }

    /// Export as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if encoding fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Weighted blend of conversion rate, completion rate and average score.
#[must_use]
pub fn composite_score(result: &VariantResult) -> f64 {
    CONVERSION_WEIGHT * result.conversion_rate
        + COMPLETION_WEIGHT * result.completion_rate
        + SCORE_WEIGHT * result.average_score
}

/// Two-proportion z-test on conversion rates, bucketed to a confidence level.
///
/// Returns 0 when either side has fewer than
/// [`MIN_IMPRESSIONS_FOR_CONFIDENCE`] impressions or the standard error is 0.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn confidence(control: &VariantResult, challenger: &VariantResult) -> f64 {
    if control.impressions < MIN_IMPRESSIONS_FOR_CONFIDENCE
        || challenger.impressions < MIN_IMPRESSIONS_FOR_CONFIDENCE
    {
        return 0.0;
    }

    let n1 = control.impressions as f64;
    let n2 = challenger.impressions as f64;
    let p1 = control.conversion_rate / 100.0;
    let p2 = challenger.conversion_rate / 100.0;

    let pooled = (p1 * n1 + p2 * n2) / (n1 + n2);
    let se = (pooled * (1.0 - pooled) * (1.0 / n1 + 1.0 / n2)).sqrt();
    // Also rejects NaN from rates above 100%
    if se.is_nan() || se <= 0.0 {
        return 0.0;
    }

    let z = (p2 - p1).abs() / se;
    Z_LEVELS
        .iter()
        .find(|(bound, _)| z < *bound)
        .map_or(MAX_CONFIDENCE, |(_, level)| *level)
}

/// Relative conversion improvement of `winner` over `control`, in percent.
///
/// `None` when the control rate is 0.
#[must_use]
pub fn relative_improvement(control: &VariantResult, winner: &VariantResult) -> Option<f64> {
    if control.conversion_rate <= 0.0 {
        None
    } else {
        Some((winner.conversion_rate - control.conversion_rate) / control.conversion_rate * 100.0)
    }
}

fn improvement_phrase(control: &VariantResult, winner: &VariantResult) -> String {
    relative_improvement(control, winner).map_or_else(
        || {
            format!(
                "a {:.2}% conversion rate against a 0% control baseline",
                winner.conversion_rate
            )
        },
        |improvement| format!("a {improvement:.1}% improvement over control"),
    )
}

/// Recommendation text for an analysis outcome.
#[must_use]
pub fn recommendation(
    winner: Option<(&Variant, &VariantResult)>,
    control: &VariantResult,
    confidence: f64,
) -> String {
    let Some((variant, result)) = winner else {
        return CONTROL_BEST_RECOMMENDATION.to_string();
    };

    let name = variant.name();
    let phrase = improvement_phrase(control, result);

    if confidence < 90.0 {
        format!(
            "{name} shows {phrase}, but needs more data to be conclusive \
             (confidence: {confidence}%). Keep the experiment running."
        )
    } else if confidence >= 95.0 {
        format!(
            "Strong recommendation to implement {name}: {phrase} \
             with {confidence}% confidence."
        )
    } else {
        format!(
            "Moderate recommendation for {name}: {phrase} \
             with {confidence}% confidence. Consider collecting more data before rolling out."
        )
    }
}

/// Pick a winner, score confidence and write a recommendation.
///
/// Control is the initial best and is only displaced by a strictly greater
/// composite score, so ties keep `winner = None`. Variants missing from
/// `results` count as unobserved.
#[must_use]
pub fn analyze(
    experiment: &ExperimentDefinition,
    results: BTreeMap<String, VariantResult>,
) -> Analysis {
    let Some(control) = experiment.control() else {
        tracing::warn!(
            experiment_id = experiment.id(),
            "no control variant defined, skipping significance analysis"
        );
        return Analysis {
            results,
            winner: None,
            confidence: 0.0,
            recommendation: NO_CONTROL_RECOMMENDATION.to_string(),
        };
    };

    let result_of = |variant: &Variant| {
        results
            .get(variant.id())
            .cloned()
            .unwrap_or_else(|| VariantResult::empty(variant.id()))
    };

    let control_result = result_of(control);
    let mut best = (control, control_result.clone());
    let mut best_score = composite_score(&control_result);

    for variant in experiment.variants().iter().filter(|v| !v.is_control()) {
        let result = result_of(variant);
        let score = composite_score(&result);
        if score > best_score {
            best_score = score;
            best = (variant, result);
        }
    }

    let (best_variant, best_result) = best;
    let confidence = confidence(&control_result, &best_result);
    let winner = (best_variant.id() != control.id()).then_some((best_variant, &best_result));
    let recommendation = recommendation(winner, &control_result, confidence);

    tracing::debug!(
        experiment_id = experiment.id(),
        best_variant = best_variant.id(),
        best_score,
        confidence,
        "experiment analyzed"
    );

    Analysis {
        winner: winner.map(|(variant, _)| variant.id().to_string()),
        results,
        confidence,
        recommendation,
    }
}

/// Whether an experiment has enough evidence to stop.
///
/// - never before `min_sample_size` total impressions
/// - yes once a winner reaches 95% confidence
/// - yes after `10 * min_sample_size` impressions still below 80% confidence
#[must_use]
pub fn should_stop(analysis: &Analysis, min_sample_size: u64) -> bool {
    let total = analysis.total_impressions();
    if total < min_sample_size {
        return false;
    }
    if analysis.confidence >= 95.0 && analysis.winner.is_some() {
        return true;
    }
    total > min_sample_size.saturating_mul(10) && analysis.confidence < 80.0
}
