//! In-memory event sink.

use std::sync::Mutex;

use super::EventSink;
use crate::experiment::ExperimentEvent;
use crate::{Error, Result};

/// Event sink that keeps every event in memory.
///
/// Useful for tests and for feeding [`crate::analysis::aggregate`] directly
/// from what the engine recorded.
#[derive(Debug, Default)]
pub struct MemoryEventSink {
    events: Mutex<Vec<ExperimentEvent>>,
}

impl MemoryEventSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of collected events (0 if the lock is poisoned).
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().map_or(0, |events| events.len())
    }

    /// Check if no events were collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy out all collected events in arrival order.
    ///
    /// # Errors
    ///
    /// Returns `SinkError` if the lock is poisoned.
    pub fn events(&self) -> Result<Vec<ExperimentEvent>> {
        self.events
            .lock()
            .map(|events| events.clone())
            .map_err(|e| Error::SinkError(format!("event buffer lock poisoned: {e}")))
    }

    /// Remove and return all collected events.
    ///
    /// # Errors
    ///
    /// Returns `SinkError` if the lock is poisoned.
    pub fn drain(&self) -> Result<Vec<ExperimentEvent>> {
        self.events
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .map_err(|e| Error::SinkError(format!("event buffer lock poisoned: {e}")))
    }
}

impl EventSink for MemoryEventSink {
    fn emit(&self, event: &ExperimentEvent) -> Result<()> {
        self.events
            .lock()
            .map_err(|e| Error::SinkError(format!("event buffer lock poisoned: {e}")))?
            .push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_collects_in_order() {
        let sink = MemoryEventSink::new();
        assert!(sink.is_empty());

        sink.emit(&ExperimentEvent::impression("exp", "a", "u1"))
            .unwrap();
        sink.emit(&ExperimentEvent::conversion("exp", "a", "u1"))
            .unwrap();

        let events = sink.events().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].event_type().as_str(), "conversion");
    }

    #[test]
    fn test_memory_sink_drain() {
        let sink = MemoryEventSink::new();
        sink.emit(&ExperimentEvent::impression("exp", "a", "u1"))
            .unwrap();

        assert_eq!(sink.drain().unwrap().len(), 1);
        assert!(sink.is_empty());
    }
}
