//! Experiment Schema
//!
//! This module provides the data structures the engine assigns from and
//! aggregates over.
//!
//! ## Schema Overview
//!
//! ```text
//! ExperimentDefinition (1) ──< Variant (N, ordered, ≤1 control)
//!          │
//!          └──< ExperimentEvent (N) [append-only, caller-owned]
//!
//! SlotTest ──> 4 fixed slots {control, variant_a, variant_b, variant_c}
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use abtest_engine::experiment::{EntityType, ExperimentDefinition, ExperimentEvent, Variant};
//!
//! let mut experiment = ExperimentDefinition::builder("quiz-length", "Quiz Length", EntityType::Quiz)
//!     .variant(Variant::control("long", "Ten questions", 50.0))
//!     .variant(Variant::new("short", "Five questions", 50.0))
//!     .build()?;
//! experiment.start()?;
//!
//! let event = ExperimentEvent::completion(experiment.id(), "short", "user-42", 95.0, Some(8.0));
//! assert_eq!(event.variant_id(), "short");
//! # Ok::<(), abtest_engine::Error>(())
//! ```

mod definition;
mod event;
mod slot;
mod variant;

pub use definition::{EntityType, ExperimentDefinition, ExperimentDefinitionBuilder, ExperimentStatus};
pub use event::{EventType, ExperimentEvent};
pub use slot::{SlotTest, VariantSlot, MAX_SLOT_WEIGHT};
pub use variant::{Variant, VariantBuilder};
