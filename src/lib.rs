//! # abtest-engine: Embedded A/B Experiment Engine
//!
//! **Version**: 0.1.0
//!
//! Sticky weighted variant assignment, event aggregation, significance
//! scoring and recommendation text for product experiments.
//!
//! ## Design Principles (Toyota Way Aligned)
//!
//! - **Poka-Yoke**: Definitions are validated on construction and on
//!   deserialization; completion events cannot omit their duration
//! - **Jidoka**: Backend failures never stop the line; assignment and event
//!   recording degrade to control/drop and log instead of erroring
//! - **Genchi Genbutsu**: Analysis is a pure function of the event log the
//!   caller actually collected
//!
//! ## Example Usage
//!
//! ```rust
//! use abtest_engine::experiment::{EntityType, ExperimentDefinition, ExperimentEvent, Variant};
//! use abtest_engine::Engine;
//!
//! let mut engine = Engine::builder().seed(42).build_in_memory();
//!
//! let experiment = ExperimentDefinition::builder("quiz-length", "Quiz Length", EntityType::Quiz)
//!     .variant(Variant::control("long", "Ten questions", 50.0))
//!     .variant(Variant::new("short", "Five questions", 50.0))
//!     .build()?;
//!
//! let mut events = Vec::new();
//! for i in 0..200 {
//!     let subject = format!("user-{i}");
//!     let variant = engine.assign(&experiment, &subject);
//!     events.push(ExperimentEvent::impression(experiment.id(), variant.id(), subject.as_str()));
//! }
//!
//! let analysis = engine.analyze(&experiment, &events);
//! println!("{}", engine.report(&experiment, &analysis));
//! # Ok::<(), abtest_engine::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod analysis;
pub mod assignment;
pub mod config;
pub mod engine;
pub mod error;
pub mod experiment;
pub mod logging;
pub mod sink;
pub mod store;

pub use config::EngineConfig;
pub use engine::{Engine, EngineBuilder, ExperimentEngine, CONTROL_VARIANT_ID};
pub use error::{Error, Result};
