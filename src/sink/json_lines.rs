//! JSON Lines event sink.

use std::io::Write;
use std::sync::Mutex;

use super::EventSink;
use crate::experiment::ExperimentEvent;
use crate::{Error, Result};

/// Event sink writing one JSON object per line.
///
/// # Example
///
/// ```rust
/// use abtest_engine::experiment::ExperimentEvent;
/// use abtest_engine::sink::{EventSink, JsonLinesEventSink};
///
/// let sink = JsonLinesEventSink::new(Vec::new());
/// sink.emit(&ExperimentEvent::impression("exp", "control", "user-1")).unwrap();
///
/// let bytes = sink.into_inner().unwrap();
/// assert!(String::from_utf8(bytes).unwrap().ends_with('\n'));
/// ```
#[derive(Debug)]
pub struct JsonLinesEventSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesEventSink<W> {
    /// Wrap a writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Unwrap the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns `SinkError` if the lock is poisoned.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| Error::SinkError(format!("event writer lock poisoned: {e}")))
    }
}

impl<W: Write + Send> EventSink for JsonLinesEventSink<W> {
    fn emit(&self, event: &ExperimentEvent) -> Result<()> {
        let mut line = serde_json::to_vec(event)?;
        line.push(b'\n');

        let mut writer = self
            .writer
            .lock()
            .map_err(|e| Error::SinkError(format!("event writer lock poisoned: {e}")))?;
        writer.write_all(&line)?;
        writer.flush()?;
        Ok(())
    }
}
