//! Tracing subscriber setup
//!
//! The library only emits `tracing` records; binaries and tests opt in to
//! output by calling [`init_tracing`]. Experiment events from
//! [`crate::sink::TracingEventSink`] use target `abtest_engine::events`, so
//! `RUST_LOG=abtest_engine::events=info` isolates them.

use tracing_subscriber::EnvFilter;

use crate::{Error, Result};

/// Install a fmt subscriber filtered by `RUST_LOG`, or `default_directive`
/// when `RUST_LOG` is unset or invalid.
///
/// # Errors
///
/// Returns `Other` if a global subscriber is already installed.
pub fn init_tracing(default_directive: &str) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| Error::Other(format!("tracing subscriber already installed: {e}")))
}
