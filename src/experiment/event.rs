//! Experiment Event - append-only exposure and outcome records

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of experiment event.
///
/// Completion events carry the time the subject spent in the flow and an
/// optional score, so a completion without a duration cannot be built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum EventType {
    /// Subject was exposed to a variant.
    Impression,
    /// Subject performed the targeted action.
    Conversion,
    /// Subject finished the experiment-scoped flow.
    Completion {
        /// Time spent in the flow, in seconds.
        time_seconds: f64,
        /// Outcome score; absent or non-positive scores are not averaged.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        score: Option<f64>,
    },
}

impl EventType {
    /// Get event type name as string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Impression => "impression",
            Self::Conversion => "conversion",
            Self::Completion { .. } => "completion",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Experiment Event represents one observation for a (variant, subject) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExperimentEvent {
    experiment_id: String,
    variant_id: String,
    subject_id: String,
    #[serde(flatten)]
    event_type: EventType,
    timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    metadata: Option<serde_json::Value>,
}

impl ExperimentEvent {
    /// Create a new event stamped with the current time.
    #[must_use]
    pub fn new(
        experiment_id: impl Into<String>,
        variant_id: impl Into<String>,
        subject_id: impl Into<String>,
        event_type: EventType,
    ) -> Self {
        Self {
            experiment_id: experiment_id.into(),
            variant_id: variant_id.into(),
            subject_id: subject_id.into(),
            event_type,
            timestamp: Utc::now(),
            metadata: None,
        }
    }

    /// Create an impression event.
    #[must_use]
    pub fn impression(
        experiment_id: impl Into<String>,
        variant_id: impl Into<String>,
        subject_id: impl Into<String>,
    ) -> Self {
        Self::new(experiment_id, variant_id, subject_id, EventType::Impression)
    }

    /// Create a conversion event.
    #[must_use]
    pub fn conversion(
        experiment_id: impl Into<String>,
        variant_id: impl Into<String>,
        subject_id: impl Into<String>,
    ) -> Self {
        Self::new(experiment_id, variant_id, subject_id, EventType::Conversion)
    }

    /// Create a completion event.
    #[must_use]
    pub fn completion(
        experiment_id: impl Into<String>,
        variant_id: impl Into<String>,
        subject_id: impl Into<String>,
        time_seconds: f64,
        score: Option<f64>,
    ) -> Self {
        Self::new(
            experiment_id,
            variant_id,
            subject_id,
            EventType::Completion {
                time_seconds,
                score,
            },
        )
    }

    /// Attach free-form metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Override the timestamp (useful for replaying logs/testing).
    #[must_use]
    pub const fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Get the experiment ID.
    #[must_use]
    pub fn experiment_id(&self) -> &str {
        &self.experiment_id
    }

    /// Get the variant ID.
    #[must_use]
    pub fn variant_id(&self) -> &str {
        &self.variant_id
    }

    /// Get the subject ID.
    #[must_use]
    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    /// Get the event type.
    #[must_use]
    pub const fn event_type(&self) -> EventType {
        self.event_type
    }

    /// Get the event timestamp.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Get the metadata, if any.
    #[must_use]
    pub const fn metadata(&self) -> Option<&serde_json::Value> {
        self.metadata.as_ref()
    }
}
