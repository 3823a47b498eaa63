//! Error types for abtest-engine
//!
//! Toyota Way: Clear error messages with actionable guidance (Respect for People)
//!
//! Only definition, lifecycle and I/O errors surface to callers. Store and
//! sink failures hit during assignment or event recording are absorbed by
//! the engine and logged.

use thiserror::Error;

use crate::experiment::ExperimentStatus;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// abtest-engine error types
#[derive(Error, Debug)]
pub enum Error {
    /// Experiment definition failed validation
    #[error("Invalid experiment definition: {0}\nCheck the variant list (non-empty, unique ids, at most one control, finite non-negative weights)")]
    InvalidExperiment(String),

    /// Lifecycle transition not allowed from the current status
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition {
        /// Status the experiment was in
        from: ExperimentStatus,
        /// Status that was requested
        to: ExperimentStatus,
    },

    /// Assignment store read/write failed
    #[error("Assignment store error: {0}")]
    StoreError(String),

    /// Event sink rejected an event
    #[error("Event sink error: {0}")]
    SinkError(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
