//! Property-based tests for abtest-engine
//!
//! Invariants checked over generated inputs:
//! - Test mathematical invariants
//! - Test data integrity properties
//! - Run with ProptestConfig::with_cases(100)
//! - Must complete in <30 seconds for pre-commit hook

use abtest_engine::analysis::{aggregate, analyze, confidence, format_report, VariantResult};
use abtest_engine::experiment::{EntityType, ExperimentDefinition, ExperimentEvent, Variant};
use abtest_engine::EngineBuilder;
use proptest::prelude::*;

// ============================================================================
// Property Test Generators (Strategies)
// ============================================================================

/// Generate a valid experiment with 2..=5 variants, the first being control
fn arb_experiment() -> impl Strategy<Value = ExperimentDefinition> {
    proptest::collection::vec(0.0f64..100.0, 2..=5).prop_map(|weights| {
        let variants = weights.iter().enumerate().map(|(i, w)| {
            if i == 0 {
                Variant::control("v0", "Variant 0", *w)
            } else {
                Variant::new(format!("v{i}"), format!("Variant {i}"), *w)
            }
        });
        ExperimentDefinition::builder("prop", "Property", EntityType::Quiz)
            .variants(variants)
            .build()
            .unwrap()
    })
}

/// Generate an event log against variants v0..v4
fn arb_events() -> impl Strategy<Value = Vec<ExperimentEvent>> {
    let event = (0usize..5, 0u8..3, 0.0f64..600.0, proptest::option::of(-5.0f64..10.0)).prop_map(
        |(variant, kind, time, score)| {
            let variant_id = format!("v{variant}");
            match kind {
                0 => ExperimentEvent::impression("prop", variant_id, "s"),
                1 => ExperimentEvent::conversion("prop", variant_id, "s"),
                _ => ExperimentEvent::completion("prop", variant_id, "s", time, score),
            }
        },
    );
    proptest::collection::vec(event, 0..300)
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: assignment is sticky for every subject
    #[test]
    fn prop_assignment_sticky(experiment in arb_experiment(), seed in any::<u64>(), subject in "[a-z0-9]{1,12}") {
        let mut engine = EngineBuilder::new().seed(seed).build_in_memory();
        let first = engine.assign(&experiment, &subject).id().to_string();
        for _ in 0..5 {
            prop_assert_eq!(engine.assign(&experiment, &subject).id(), first.as_str());
        }
    }

    /// Property: every assigned variant belongs to the experiment
    #[test]
    fn prop_assignment_in_experiment(experiment in arb_experiment(), seed in any::<u64>()) {
        let mut engine = EngineBuilder::new().seed(seed).build_in_memory();
        for i in 0..20 {
            let id = engine.assign(&experiment, &format!("s{i}")).id().to_string();
            prop_assert!(experiment.variant(&id).is_some());
        }
    }

    /// Property: aggregated metrics are always finite and non-negative
    #[test]
    fn prop_aggregate_finite(experiment in arb_experiment(), events in arb_events()) {
        let results = aggregate(&experiment, &events);
        prop_assert_eq!(results.len(), experiment.variants().len());
        for result in results.values() {
            for value in [
                result.conversion_rate,
                result.completion_rate,
                result.average_score,
                result.average_time_seconds,
            ] {
                prop_assert!(value.is_finite() && value >= 0.0, "bad metric {}", value);
            }
        }
    }

    /// Property: confidence is one of the discrete levels
    #[test]
    fn prop_confidence_discrete(n1 in 0u64..2000, c1 in 0u64..2000, n2 in 0u64..2000, c2 in 0u64..2000) {
        let level = confidence(
            &VariantResult::from_counts("a", n1, c1.min(n1)),
            &VariantResult::from_counts("b", n2, c2.min(n2)),
        );
        prop_assert!([0.0, 90.0, 95.0, 99.0, 99.9].contains(&level), "level {}", level);
        if n1 < 30 || n2 < 30 {
            prop_assert!(level == 0.0);
        }
    }

    /// Property: winner is never the control
    #[test]
    fn prop_winner_not_control(experiment in arb_experiment(), events in arb_events()) {
        let analysis = analyze(&experiment, aggregate(&experiment, &events));
        if let Some(winner) = analysis.winner.as_deref() {
            prop_assert_ne!(winner, "v0");
            prop_assert!(experiment.variant(winner).is_some());
        }
    }

    /// Property: report rendering is deterministic
    #[test]
    fn prop_report_deterministic(experiment in arb_experiment(), events in arb_events()) {
        let analysis = analyze(&experiment, aggregate(&experiment, &events));
        prop_assert_eq!(format_report(&experiment, &analysis), format_report(&experiment, &analysis));
    }
}
