//! Experiment engine
//!
//! Ties together the assignment store, event sink, RNG and a registry of
//! named experiments. None of the hot-path operations (`assign`,
//! `variant_for`, `record_event`) return errors: experiment exposure must
//! never block the feature under test, so backend failures are logged and
//! absorbed here.

use std::collections::HashMap;

use crate::analysis::{self, Analysis};
use crate::assignment::{Assigner, SelectionMode};
use crate::config::EngineConfig;
use crate::experiment::{
    EventType, ExperimentDefinition, ExperimentEvent, SlotTest, Variant, VariantSlot,
};
use crate::sink::{EventSink, TracingEventSink};
use crate::store::{AssignmentStore, MemoryAssignmentStore};
use crate::Result;

/// Variant id returned for experiments the registry does not know.
pub const CONTROL_VARIANT_ID: &str = "control";

/// A/B experiment engine.
///
/// # Example
///
/// ```rust
/// use abtest_engine::experiment::{EntityType, EventType, ExperimentDefinition, Variant};
/// use abtest_engine::Engine;
///
/// let mut engine = Engine::builder().seed(7).build_in_memory();
///
/// let experiment = ExperimentDefinition::builder("cta", "CTA Copy", EntityType::Recommendation)
///     .variant(Variant::control("control", "Original", 50.0))
///     .variant(Variant::new("bold", "Bold copy", 50.0))
///     .build()?;
///
/// let variant = engine.assign(&experiment, "user-42").id().to_string();
/// assert_eq!(engine.assign(&experiment, "user-42").id(), variant);
///
/// engine.record_event("cta", &variant, "user-42", EventType::Impression, None);
/// # Ok::<(), abtest_engine::Error>(())
/// ```
#[derive(Debug)]
pub struct ExperimentEngine<S, K> {
    assigner: Assigner<S>,
    sink: K,
    config: EngineConfig,
    registry: HashMap<String, ExperimentDefinition>,
}

/// Engine over the in-memory store and the tracing sink.
pub type Engine = ExperimentEngine<MemoryAssignmentStore, TracingEventSink>;

impl Engine {
    /// Create a new engine builder
    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

impl<S: AssignmentStore, K: EventSink> ExperimentEngine<S, K> {
    /// Create an engine from explicit parts.
    #[must_use]
    pub fn new(store: S, sink: K, config: EngineConfig) -> Self {
        Self {
            assigner: Assigner::new(store, config.rng_seed, config.key_prefix.clone()),
            sink,
            config,
            registry: HashMap::new(),
        }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get the assignment store.
    #[must_use]
    pub const fn store(&self) -> &S {
        self.assigner.store()
    }

    /// Get the event sink.
    #[must_use]
    pub const fn sink(&self) -> &K {
        &self.sink
    }

    // ------------------------------------------------------------------
    // Assignment
    // ------------------------------------------------------------------

    /// Assign `subject_id` to a variant of `experiment`.
    ///
    /// The first call draws a weighted variant and stores it; later calls
    /// return the stored variant even if weights changed in between. A
    /// stored variant that no longer exists is replaced by a fresh draw.
    pub fn assign<'a>(&mut self, experiment: &'a ExperimentDefinition, subject_id: &str) -> &'a Variant {
        self.assigner
            .assign(
                experiment.id(),
                experiment.variants(),
                subject_id,
                SelectionMode::Weighted,
            )
            .unwrap_or_else(|| fallback(experiment))
    }

    /// Assign `subject_id` to one slot of a [`SlotTest`].
    ///
    /// A disabled test returns [`VariantSlot::Control`] without touching
    /// weights or the store.
    pub fn assign_slot(&mut self, test: &SlotTest, subject_id: &str) -> VariantSlot {
        let mode = if test.is_enabled() {
            SelectionMode::Weighted
        } else {
            SelectionMode::ForceControl
        };
        let variants = test.variants();

        self.assigner
            .assign(test.id(), &variants, subject_id, mode)
            .and_then(|variant| VariantSlot::from_id(variant.id()))
            .unwrap_or(VariantSlot::Control)
    }

    /// Look up the stored assignment without creating one.
    #[must_use]
    pub fn assignment_of(&self, experiment_id: &str, subject_id: &str) -> Option<String> {
        self.assigner
            .stored(&self.assigner.key(experiment_id, subject_id))
    }

    /// Forget every stored assignment.
    ///
    /// # Errors
    ///
    /// Returns the store's error if it cannot be cleared.
    pub fn clear_assignments(&self) -> Result<()> {
        self.assigner.store().clear_all()?;
        tracing::info!("cleared all experiment assignments");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Registry
    // ------------------------------------------------------------------

    /// Register an experiment under its name, returning any definition it
    /// replaced.
    pub fn register(&mut self, experiment: ExperimentDefinition) -> Option<ExperimentDefinition> {
        tracing::debug!(
            experiment_id = experiment.id(),
            name = experiment.name(),
            status = %experiment.status(),
            "registered experiment"
        );
        self.registry.insert(experiment.name().to_string(), experiment)
    }

    /// Get a registered experiment by name.
    #[must_use]
    pub fn experiment(&self, name: &str) -> Option<&ExperimentDefinition> {
        self.registry.get(name)
    }

    /// Get a registered experiment by name, mutably (lifecycle changes).
    pub fn experiment_mut(&mut self, name: &str) -> Option<&mut ExperimentDefinition> {
        self.registry.get_mut(name)
    }

    /// Variant id for a subject in a registered experiment.
    ///
    /// Unknown names log a warning and return [`CONTROL_VARIANT_ID`].
    /// Experiments that are not running are treated as disabled and return
    /// their control variant without persisting anything.
    pub fn variant_for(&mut self, name: &str, subject_id: &str) -> String {
        let Some(experiment) = self.registry.get(name) else {
            tracing::warn!(name, subject_id, "unknown experiment, serving control");
            return CONTROL_VARIANT_ID.to_string();
        };

        let mode = if experiment.is_running() {
            SelectionMode::Weighted
        } else {
            SelectionMode::ForceControl
        };

        self.assigner
            .assign(experiment.id(), experiment.variants(), subject_id, mode)
            .unwrap_or_else(|| fallback(experiment))
            .id()
            .to_string()
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Record one event. Delivery failures are logged and dropped.
    pub fn record_event(
        &self,
        experiment_id: &str,
        variant_id: &str,
        subject_id: &str,
        event_type: EventType,
        metadata: Option<serde_json::Value>,
    ) {
        let mut event = ExperimentEvent::new(experiment_id, variant_id, subject_id, event_type);
        if let Some(metadata) = metadata {
            event = event.with_metadata(metadata);
        }
        self.emit(&event);
    }

    /// Deliver a prebuilt event. Delivery failures are logged and dropped.
    pub fn emit(&self, event: &ExperimentEvent) {
        if let Err(e) = self.sink.emit(event) {
            tracing::warn!(
                experiment_id = event.experiment_id(),
                variant_id = event.variant_id(),
                event_type = event.event_type().as_str(),
                error = %e,
                "dropped experiment event"
            );
        }
    }

    // ------------------------------------------------------------------
    // Analysis
    // ------------------------------------------------------------------

    /// Aggregate `events` and analyze the experiment.
    #[must_use]
    pub fn analyze(&self, experiment: &ExperimentDefinition, events: &[ExperimentEvent]) -> Analysis {
        analysis::analyze(experiment, analysis::aggregate(experiment, events))
    }

    /// Stop rule with the configured minimum sample size.
    #[must_use]
    pub fn should_stop(&self, analysis: &Analysis) -> bool {
        analysis::should_stop(analysis, self.config.min_sample_size)
    }

    /// Render a text report.
    #[must_use]
    pub fn report(&self, experiment: &ExperimentDefinition, analysis: &Analysis) -> String {
        analysis::format_report(experiment, analysis)
    }
}

/// Control, or the first variant. Definitions are never empty, so the
/// first-variant index cannot fail.
fn fallback(experiment: &ExperimentDefinition) -> &Variant {
    experiment
        .control()
        .unwrap_or_else(|| &experiment.variants()[0])
}

/// Builder for [`ExperimentEngine`].
#[derive(Debug, Default)]
pub struct EngineBuilder {
    config: EngineConfig,
}

impl EngineBuilder {
    /// Create a builder with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Seed the assignment RNG (reproducible assignment in tests).
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.config.rng_seed = Some(seed);
        self
    }

    /// Set the minimum sample size for the stop rule.
    #[must_use]
    pub const fn min_sample_size(mut self, size: u64) -> Self {
        self.config.min_sample_size = size;
        self
    }

    /// Set the assignment-store key prefix.
    #[must_use]
    pub fn key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.key_prefix = prefix.into();
        self
    }

    /// Build the engine over the given store and sink.
    #[must_use]
    pub fn build<S: AssignmentStore, K: EventSink>(self, store: S, sink: K) -> ExperimentEngine<S, K> {
        ExperimentEngine::new(store, sink, self.config)
    }

    /// Build an engine with an in-memory store and a tracing sink.
    #[must_use]
    pub fn build_in_memory(self) -> ExperimentEngine<MemoryAssignmentStore, TracingEventSink> {
        self.build(MemoryAssignmentStore::new(), TracingEventSink::new())
    }
}
