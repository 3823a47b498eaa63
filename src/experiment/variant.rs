//! Variant - one treatment arm of an experiment

use serde::{Deserialize, Serialize};

/// Variant represents one arm of an experiment.
///
/// `weight` is relative probability mass: a variant with weight 2 is picked
/// twice as often as one with weight 1. `config` is an opaque payload handed
/// back to the caller and never interpreted by the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Variant {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    weight: f64,
    #[serde(default)]
    is_control: bool,
    #[serde(default)]
    config: serde_json::Map<String, serde_json::Value>,
}

impl Variant {
    /// Create a non-control variant with the given weight.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, weight: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            weight,
            is_control: false,
            config: serde_json::Map::new(),
        }
    }

    /// Create a control variant with the given weight.
    #[must_use]
    pub fn control(id: impl Into<String>, name: impl Into<String>, weight: f64) -> Self {
        Self {
            is_control: true,
            ..Self::new(id, name, weight)
        }
    }

    /// Create a builder for a variant with optional fields.
    #[must_use]
    pub fn builder(id: impl Into<String>, name: impl Into<String>) -> VariantBuilder {
        VariantBuilder::new(id, name)
    }

    /// Get the variant ID (unique within its experiment).
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the variant name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the variant description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Get the relative selection weight.
    #[must_use]
    pub const fn weight(&self) -> f64 {
        self.weight
    }

    /// Whether this variant is the experiment's baseline.
    #[must_use]
    pub const fn is_control(&self) -> bool {
        self.is_control
    }

    /// Get the opaque caller configuration.
    #[must_use]
    pub const fn config(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.config
    }

    /// Look up a single configuration value.
    #[must_use]
    pub fn config_value(&self, key: &str) -> Option<&serde_json::Value> {
        self.config.get(key)
    }

    /// Replace the selection weight. Callers validate the new weight.
    pub(crate) fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }
}

/// Builder for `Variant`.
#[derive(Debug)]
pub struct VariantBuilder {
    variant: Variant,
}

impl VariantBuilder {
    /// Create a new builder with required fields. Weight defaults to 1.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            variant: Variant::new(id, name, 1.0),
        }
    }

    /// Set the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.variant.description = description.into();
        self
    }

    /// Set the selection weight.
    #[must_use]
    pub const fn weight(mut self, weight: f64) -> Self {
        self.variant.weight = weight;
        self
    }

    /// Mark the variant as control.
    #[must_use]
    pub const fn control(mut self, is_control: bool) -> Self {
        self.variant.is_control = is_control;
        self
    }

    /// Add one configuration entry.
    #[must_use]
    pub fn config_entry(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.variant.config.insert(key.into(), value);
        self
    }

    /// Build the `Variant`.
    #[must_use]
    pub fn build(self) -> Variant {
        self.variant
    }
}
