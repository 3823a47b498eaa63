//! Event Sink Module
//!
//! Fire-and-forget destinations for experiment events. The engine never
//! reads events back; aggregation takes a caller-supplied event log.
//!
//! Sinks:
//! - [`TracingEventSink`]: structured `tracing` record per event
//! - [`MemoryEventSink`]: collects events in memory
//! - [`JsonLinesEventSink`]: one JSON object per line to any writer

mod json_lines;
mod memory;

pub use json_lines::JsonLinesEventSink;
pub use memory::MemoryEventSink;

use crate::experiment::{EventType, ExperimentEvent};
use crate::Result;
use std::sync::Arc;

/// Tracing target used by [`TracingEventSink`].
pub const EVENT_TARGET: &str = "abtest_engine::events";

/// Destination for experiment events.
pub trait EventSink: Send + Sync {
    /// Deliver one event.
    ///
    /// # Errors
    ///
    /// Returns `SinkError`/`Io` on delivery failure. The engine logs and
    /// drops such errors.
    fn emit(&self, event: &ExperimentEvent) -> Result<()>;
}

impl<K: EventSink + ?Sized> EventSink for Arc<K> {
    fn emit(&self, event: &ExperimentEvent) -> Result<()> {
        (**self).emit(event)
    }
}

/// Sink that emits each event as a flat `tracing` record.
///
/// Route it to an analytics collector by subscribing to [`EVENT_TARGET`].
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl TracingEventSink {
    /// Create a tracing sink.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl EventSink for TracingEventSink {
    fn emit(&self, event: &ExperimentEvent) -> Result<()> {
        let (time_seconds, score) = match event.event_type() {
            EventType::Completion {
                time_seconds,
                score,
            } => (Some(time_seconds), score),
            EventType::Impression | EventType::Conversion => (None, None),
        };

        tracing::info!(
            target: EVENT_TARGET,
            experiment_id = event.experiment_id(),
            variant_id = event.variant_id(),
            subject_id = event.subject_id(),
            event_type = event.event_type().as_str(),
            timestamp = %event.timestamp().to_rfc3339(),
            time_seconds = ?time_seconds,
            score = ?score,
            "experiment event"
        );
        Ok(())
    }
}
