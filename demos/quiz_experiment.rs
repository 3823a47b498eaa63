//! Quiz Experiment Example
//!
//! Walks one experiment from definition to recommendation: assignment,
//! event recording, analysis, stop rule and report.
//!
//! Run with: cargo run --example quiz_experiment

use std::sync::Arc;

use abtest_engine::experiment::{EntityType, EventType, ExperimentDefinition, Variant};
use abtest_engine::logging::init_tracing;
use abtest_engine::sink::MemoryEventSink;
use abtest_engine::store::MemoryAssignmentStore;
use abtest_engine::EngineBuilder;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn main() -> abtest_engine::Result<()> {
    init_tracing("warn")?;

    println!("=== abtest-engine Quiz Experiment ===\n");

    // -------------------------------------------------------------------------
    // 1. Define and start the experiment
    // -------------------------------------------------------------------------
    println!("1. Defining experiment...");

    let mut experiment = ExperimentDefinition::builder("quiz-length", "Quiz Length", EntityType::Quiz)
        .variant(
            Variant::builder("long", "Ten questions")
                .weight(50.0)
                .control(true)
                .config_entry("question_count", serde_json::json!(10))
                .build(),
        )
        .variant(
            Variant::builder("short", "Five questions")
                .weight(50.0)
                .config_entry("question_count", serde_json::json!(5))
                .build(),
        )
        .target_sample_size(400)
        .metric("conversion")
        .metric("completion")
        .build()?;
    experiment.start()?;

    println!("   Experiment: {} ({})", experiment.name(), experiment.id());
    println!("   Status: {}", experiment.status());

    // -------------------------------------------------------------------------
    // 2. Assign simulated visitors and record what they do
    // -------------------------------------------------------------------------
    println!("\n2. Simulating 400 visitors...");

    let sink = Arc::new(MemoryEventSink::new());
    let mut engine = EngineBuilder::new()
        .seed(7)
        .build(MemoryAssignmentStore::new(), Arc::clone(&sink));
    let mut behaviour = StdRng::seed_from_u64(11);

    for i in 0..400 {
        let subject = format!("visitor-{i}");
        let variant = engine.assign(&experiment, &subject);
        let variant_id = variant.id().to_string();
        let (convert_p, complete_p) = if variant.is_control() { (0.20, 0.55) } else { (0.32, 0.80) };

        engine.record_event(experiment.id(), &variant_id, &subject, EventType::Impression, None);
        if behaviour.gen_bool(complete_p) {
            let event_type = EventType::Completion {
                time_seconds: behaviour.gen_range(40.0..240.0),
                score: Some(behaviour.gen_range(1.0..10.0)),
            };
            engine.record_event(experiment.id(), &variant_id, &subject, event_type, None);
        }
        if behaviour.gen_bool(convert_p) {
            engine.record_event(experiment.id(), &variant_id, &subject, EventType::Conversion, None);
        }
    }

    println!("   Assignments stored: {}", engine.store().len());
    println!("   Events recorded: {}", sink.len());

    // -------------------------------------------------------------------------
    // 3. Analyze
    // -------------------------------------------------------------------------
    println!("\n3. Analyzing...\n");

    let events = sink.events()?;
    let analysis = engine.analyze(&experiment, &events);
    println!("{}", engine.report(&experiment, &analysis));

    println!("\n   Stop now? {}", engine.should_stop(&analysis));
    println!("\n   JSON export:\n{}", analysis.to_json()?);

    Ok(())
}
