//! Engine configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::DEFAULT_MIN_SAMPLE_SIZE;
use crate::Result;

/// Default prefix of assignment-store keys.
pub const DEFAULT_KEY_PREFIX: &str = "ab_test";

/// Engine configuration.
///
/// Every field has a default, so a config file only lists what it changes:
///
/// ```json
/// { "min_sample_size": 500, "rng_seed": 42 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Minimum total impressions before the stop rule may fire.
    pub min_sample_size: u64,
    /// Seed for the assignment RNG; `None` seeds from the OS.
    pub rng_seed: Option<u64>,
    /// Prefix of assignment-store keys.
    pub key_prefix: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_sample_size: DEFAULT_MIN_SAMPLE_SIZE,
            rng_seed: None,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

impl EngineConfig {
    /// Parse a config from JSON.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` on malformed JSON or unknown fields.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a config from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read, `Serialization` if it
    /// cannot be parsed.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}
