//! Metric aggregation - events to per-variant results

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::experiment::{EventType, ExperimentDefinition, ExperimentEvent};

/// Aggregated metrics for one variant.
///
/// Rates are percentages. Every ratio with a zero denominator is 0, never
/// NaN or infinity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariantResult {
    /// Variant the numbers belong to.
    pub variant_id: String,
    /// Impression events.
    pub impressions: u64,
    /// Conversion events.
    pub conversions: u64,
    /// Completion events.
    pub completions: u64,
    /// `100 * conversions / impressions`.
    pub conversion_rate: f64,
    /// `100 * completions / impressions`.
    pub completion_rate: f64,
    /// Mean of positive completion scores.
    pub average_score: f64,
    /// Mean completion time in seconds.
    pub average_time_seconds: f64,
}

impl VariantResult {
    /// A result with no observations.
    #[must_use]
    pub fn empty(variant_id: impl Into<String>) -> Self {
        Self {
            variant_id: variant_id.into(),
            ..Self::default()
        }
    }

    /// Build a result from raw conversion counts (no completion data).
    #[must_use]
    pub fn from_counts(variant_id: impl Into<String>, impressions: u64, conversions: u64) -> Self {
        Self {
            variant_id: variant_id.into(),
            impressions,
            conversions,
            conversion_rate: percentage(conversions, impressions),
            ..Self::default()
        }
    }
}

#[derive(Default)]
struct Tally {
    impressions: u64,
    conversions: u64,
    completions: u64,
    time_total: f64,
    score_total: f64,
    scored: u64,
}

impl Tally {
    fn observe(&mut self, event_type: EventType) {
        match event_type {
            EventType::Impression => self.impressions += 1,
            EventType::Conversion => self.conversions += 1,
            EventType::Completion {
                time_seconds,
                score,
            } => {
                self.completions += 1;
                self.time_total += time_seconds;
                if let Some(score) = score.filter(|s| *s > 0.0) {
                    self.score_total += score;
                    self.scored += 1;
                }
            }
        }
    }

    fn finish(&self, variant_id: &str) -> VariantResult {
        VariantResult {
            variant_id: variant_id.to_string(),
            impressions: self.impressions,
            conversions: self.conversions,
            completions: self.completions,
            conversion_rate: percentage(self.conversions, self.impressions),
            completion_rate: percentage(self.completions, self.impressions),
            average_score: mean(self.score_total, self.scored),
            average_time_seconds: mean(self.time_total, self.completions),
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * count as f64 / total as f64
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(sum: f64, count: u64) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Aggregate an event log into one [`VariantResult`] per variant.
///
/// Every variant of `experiment` gets an entry, observed or not. Events
/// from other experiments, or naming variants the experiment does not
/// define, are ignored.
#[must_use]
pub fn aggregate(
    experiment: &ExperimentDefinition,
    events: &[ExperimentEvent],
) -> BTreeMap<String, VariantResult> {
    let mut tallies: FxHashMap<&str, Tally> = experiment
        .variants()
        .iter()
        .map(|v| (v.id(), Tally::default()))
        .collect();

    for event in events
        .iter()
        .filter(|e| e.experiment_id() == experiment.id())
    {
        if let Some(tally) = tallies.get_mut(event.variant_id()) {
            tally.observe(event.event_type());
        }
    }

    tallies
        .iter()
        .map(|(id, tally)| ((*id).to_string(), tally.finish(id)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::{EntityType, Variant};

    fn experiment() -> ExperimentDefinition {
        ExperimentDefinition::builder("exp", "Exp", EntityType::Question)
            .variant(Variant::control("a", "A", 1.0))
            .variant(Variant::new("b", "B", 1.0))
            .build()
            .unwrap()
    }

    #[test]
    fn test_aggregate_zero_impressions() {
        let results = aggregate(&experiment(), &[]);

        assert_eq!(results.len(), 2);
        let a = &results["a"];
        assert_eq!(a.impressions, 0);
        assert!(a.conversion_rate.abs() < f64::EPSILON);
        assert!(a.completion_rate.abs() < f64::EPSILON);
        assert!(a.average_score.abs() < f64::EPSILON);
        assert!(a.average_time_seconds.abs() < f64::EPSILON);
    }

    #[test]
    fn test_aggregate_rates() {
        let mut events = Vec::new();
        for i in 0..4 {
            events.push(ExperimentEvent::impression("exp", "a", format!("u{i}")));
        }
        events.push(ExperimentEvent::conversion("exp", "a", "u0"));
        events.push(ExperimentEvent::completion("exp", "a", "u0", 10.0, Some(6.0)));
        events.push(ExperimentEvent::completion("exp", "a", "u1", 20.0, None));
        events.push(ExperimentEvent::completion("exp", "a", "u2", 30.0, Some(0.0)));

        let results = aggregate(&experiment(), &events);
        let a = &results["a"];

        assert_eq!(a.impressions, 4);
        assert_eq!(a.conversions, 1);
        assert_eq!(a.completions, 3);
        assert!((a.conversion_rate - 25.0).abs() < 1e-9);
        assert!((a.completion_rate - 75.0).abs() < 1e-9);
        assert!((a.average_time_seconds - 20.0).abs() < 1e-9);
        // Only the positive score counts
        assert!((a.average_score - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_aggregate_ignores_foreign_events() {
        let events = vec![
            ExperimentEvent::impression("other-exp", "a", "u1"),
            ExperimentEvent::impression("exp", "ghost", "u1"),
            ExperimentEvent::impression("exp", "b", "u1"),
        ];

        let results = aggregate(&experiment(), &events);
        assert_eq!(results["a"].impressions, 0);
        assert_eq!(results["b"].impressions, 1);
        assert!(!results.contains_key("ghost"));
    }

    #[test]
    fn test_from_counts() {
        let result = VariantResult::from_counts("x", 40, 10);
        assert!((result.conversion_rate - 25.0).abs() < 1e-9);
        assert!(VariantResult::from_counts("x", 0, 3).conversion_rate.abs() < f64::EPSILON);
    }
}
