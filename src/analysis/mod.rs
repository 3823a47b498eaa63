//! Experiment analysis
//!
//! ```text
//! events ──aggregate──> VariantResult per variant ──analyze──> Analysis
//!                                                               │
//!                                       should_stop <───────────┤
//!                                       format_report <─────────┘
//! ```
//!
//! Every step is a pure function of its inputs; nothing here touches the
//! assignment store or the event sink.
//!
//! ## Example
//!
//! ```rust
//! use abtest_engine::analysis::{aggregate, analyze, format_report, should_stop};
//! use abtest_engine::experiment::{EntityType, ExperimentDefinition, ExperimentEvent, Variant};
//!
//! let experiment = ExperimentDefinition::builder("cta", "CTA Copy", EntityType::Recommendation)
//!     .variant(Variant::control("control", "Original", 1.0))
//!     .variant(Variant::new("bold", "Bold copy", 1.0))
//!     .build()?;
//!
//! let events = vec![
//!     ExperimentEvent::impression("cta", "bold", "user-1"),
//!     ExperimentEvent::conversion("cta", "bold", "user-1"),
//! ];
//!
//! let analysis = analyze(&experiment, aggregate(&experiment, &events));
//! assert_eq!(analysis.winner.as_deref(), Some("bold"));
//! assert!(!should_stop(&analysis, 100));
//! println!("{}", format_report(&experiment, &analysis));
//! # Ok::<(), abtest_engine::Error>(())
//! ```

mod aggregate;
mod report;
mod stats;

pub use aggregate::{aggregate, VariantResult};
pub use report::{format_report, Report};
pub use stats::{
    analyze, composite_score, confidence, recommendation, relative_improvement, should_stop,
    Analysis, COMPLETION_WEIGHT, CONTROL_BEST_RECOMMENDATION, CONVERSION_WEIGHT,
    DEFAULT_MIN_SAMPLE_SIZE, MIN_IMPRESSIONS_FOR_CONFIDENCE, NO_CONTROL_RECOMMENDATION,
    SCORE_WEIGHT,
};
