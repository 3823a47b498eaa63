//! Assignment Tests
//!
//! Sticky assignment, weighted distribution, disabled-test bypass and
//! durability of the file-backed store.

use abtest_engine::experiment::{EntityType, ExperimentDefinition, SlotTest, Variant, VariantSlot};
use abtest_engine::sink::MemoryEventSink;
use abtest_engine::store::{AssignmentStore, FileAssignmentStore, MemoryAssignmentStore};
use abtest_engine::EngineBuilder;
use std::collections::HashMap;

fn three_arm(weights: [f64; 3]) -> ExperimentDefinition {
    ExperimentDefinition::builder("pricing", "Pricing Page", EntityType::Recommendation)
        .variant(Variant::control("control", "Current", weights[0]))
        .variant(Variant::new("annual", "Annual first", weights[1]))
        .variant(Variant::new("monthly", "Monthly first", weights[2]))
        .build()
        .unwrap()
}

// =============================================================================
// Sticky assignment
// =============================================================================

#[test]
fn test_repeated_assign_returns_same_variant() {
    let mut engine = EngineBuilder::new().seed(2024).build_in_memory();
    let experiment = three_arm([1.0, 1.0, 1.0]);

    for i in 0..100 {
        let subject = format!("user-{i}");
        let first = engine.assign(&experiment, &subject).id().to_string();
        for _ in 0..5 {
            assert_eq!(engine.assign(&experiment, &subject).id(), first);
        }
    }
}

#[test]
fn test_assignment_survives_weight_change() {
    let mut engine = EngineBuilder::new().seed(3).build_in_memory();
    let before = three_arm([1.0, 1.0, 1.0]);
    let after = three_arm([0.0, 0.0, 1.0]);

    let picks: Vec<String> = (0..50)
        .map(|i| engine.assign(&before, &format!("u{i}")).id().to_string())
        .collect();

    for (i, pick) in picks.iter().enumerate() {
        assert_eq!(engine.assign(&after, &format!("u{i}")).id(), pick);
    }

    // New subjects follow the new weights
    assert_eq!(engine.assign(&after, "newcomer").id(), "monthly");
}

#[test]
fn test_assignments_are_scoped_per_experiment() {
    let mut engine = EngineBuilder::new().seed(8).build_in_memory();
    let a = three_arm([1.0, 0.0, 0.0]);
    let b = ExperimentDefinition::builder("other", "Other", EntityType::Question)
        .variant(Variant::control("x", "X", 0.0))
        .variant(Variant::new("y", "Y", 1.0))
        .build()
        .unwrap();

    assert_eq!(engine.assign(&a, "user").id(), "control");
    assert_eq!(engine.assign(&b, "user").id(), "y");
    assert_eq!(engine.store().len(), 2);
}

// =============================================================================
// Weighted distribution
// =============================================================================

#[test]
#[allow(clippy::cast_precision_loss)]
fn test_weighted_distribution_chi_square() {
    let weights = [1.0, 2.0, 7.0];
    let experiment = three_arm(weights);
    let mut engine = EngineBuilder::new().seed(77).build_in_memory();

    let n = 20_000;
    let mut counts: HashMap<String, u64> = HashMap::new();
    for i in 0..n {
        let variant = engine.assign(&experiment, &format!("subject-{i}"));
        *counts.entry(variant.id().to_string()).or_default() += 1;
    }

    let total_weight: f64 = weights.iter().sum();
    let chi_square: f64 = experiment
        .variants()
        .iter()
        .map(|v| {
            let expected = f64::from(n) * v.weight() / total_weight;
            let observed = counts.get(v.id()).copied().unwrap_or(0) as f64;
            (observed - expected).powi(2) / expected
        })
        .sum();

    // df = 2, p = 0.001
    assert!(chi_square < 13.82, "chi-square {chi_square} too large: {counts:?}");
}

#[test]
fn test_zero_weight_variant_never_drawn() {
    let experiment = three_arm([1.0, 0.0, 1.0]);
    let mut engine = EngineBuilder::new().seed(5).build_in_memory();

    for i in 0..2_000 {
        assert_ne!(engine.assign(&experiment, &format!("s{i}")).id(), "annual");
    }
}

#[test]
fn test_all_zero_weights_fall_back_to_control() {
    let experiment = three_arm([0.0, 0.0, 0.0]);
    let mut engine = EngineBuilder::new().seed(5).build_in_memory();

    assert_eq!(engine.assign(&experiment, "user").id(), "control");
    assert_eq!(
        engine.assignment_of("pricing", "user").as_deref(),
        Some("control")
    );
}

#[test]
fn test_same_seed_same_assignments() {
    let experiment = three_arm([1.0, 1.0, 1.0]);
    let mut left = EngineBuilder::new().seed(99).build_in_memory();
    let mut right = EngineBuilder::new().seed(99).build_in_memory();

    for i in 0..200 {
        let subject = format!("user-{i}");
        assert_eq!(
            left.assign(&experiment, &subject).id(),
            right.assign(&experiment, &subject).id()
        );
    }
}

// =============================================================================
// Slot tests
// =============================================================================

#[test]
fn test_disabled_slot_test_always_control() {
    let test = SlotTest::new("banner")
        .with_weight(VariantSlot::Control, 0.0)
        .with_weight(VariantSlot::VariantB, 100.0)
        .with_enabled(false);
    let mut engine = EngineBuilder::new().seed(1).build_in_memory();

    for i in 0..500 {
        assert_eq!(engine.assign_slot(&test, &format!("u{i}")), VariantSlot::Control);
    }
    assert!(engine.store().is_empty());
}

#[test]
fn test_enabled_slot_test_splits_traffic() {
    let test = SlotTest::new("banner");
    let mut engine = EngineBuilder::new().seed(1).build_in_memory();

    let mut control = 0;
    let mut variant_a = 0;
    for i in 0..2_000 {
        match engine.assign_slot(&test, &format!("u{i}")) {
            VariantSlot::Control => control += 1,
            VariantSlot::VariantA => variant_a += 1,
            other => panic!("zero-weight slot {other} was drawn"),
        }
    }

    assert!((800..1200).contains(&control), "control = {control}");
    assert!((800..1200).contains(&variant_a), "variant_a = {variant_a}");
}

#[test]
fn test_infinite_slot_weight_still_draws_that_slot() {
    let test = SlotTest::new("banner").with_weight(VariantSlot::VariantA, f64::INFINITY);
    let mut engine = EngineBuilder::new().seed(5).build_in_memory();

    let variant_a = (0..1_000)
        .filter(|i| engine.assign_slot(&test, &format!("u{i}")) == VariantSlot::VariantA)
        .count();

    assert!(variant_a >= 990, "variant_a = {variant_a}");
}

#[test]
fn test_huge_weights_split_proportionally() {
    let experiment = three_arm([f64::MAX / 4.0, f64::MAX / 4.0, 0.0]);
    let mut engine = EngineBuilder::new().seed(9).build_in_memory();

    let annual = (0..1_000)
        .filter(|i| engine.assign(&experiment, &format!("u{i}")).id() == "annual")
        .count();

    assert!((400..600).contains(&annual), "annual = {annual}");
}

// =============================================================================
// Durable store
// =============================================================================

#[test]
fn test_file_store_keeps_assignments_across_engines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("assignments.json");
    let experiment = three_arm([1.0, 1.0, 1.0]);

    let picks: Vec<String> = {
        let store = FileAssignmentStore::open(&path).unwrap();
        let mut engine = EngineBuilder::new()
            .seed(10)
            .build(store, MemoryEventSink::new());
        (0..20)
            .map(|i| engine.assign(&experiment, &format!("u{i}")).id().to_string())
            .collect()
    };

    // Different seed: only the store can reproduce the picks
    let store = FileAssignmentStore::open(&path).unwrap();
    let mut engine = EngineBuilder::new()
        .seed(11)
        .build(store, MemoryEventSink::new());
    for (i, pick) in picks.iter().enumerate() {
        assert_eq!(engine.assign(&experiment, &format!("u{i}")).id(), pick);
    }
}

#[test]
fn test_custom_key_prefix() {
    let experiment = three_arm([1.0, 0.0, 0.0]);
    let mut engine = EngineBuilder::new()
        .key_prefix("exp")
        .build(MemoryAssignmentStore::new(), MemoryEventSink::new());

    engine.assign(&experiment, "user");
    assert_eq!(
        engine.store().get("exp:pricing:user").unwrap(),
        Some("control".to_string())
    );
}
