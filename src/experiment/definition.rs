//! Experiment Definition - root entity for A/B experiments

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Variant;
use crate::{Error, Result};

/// Category of product surface an experiment applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    /// A whole quiz flow.
    Quiz,
    /// A single question inside a quiz.
    Question,
    /// A recommendation surface.
    Recommendation,
}

impl EntityType {
    /// Get entity type name as string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Quiz => "quiz",
            Self::Question => "question",
            Self::Recommendation => "recommendation",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of an experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperimentStatus {
    /// Defined but not yet serving traffic.
    #[default]
    Draft,
    /// Serving traffic and collecting events.
    Running,
    /// Finished; no further assignment through the registry.
    Completed,
    /// Temporarily halted.
    Paused,
}

impl ExperimentStatus {
    /// Get status name as string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Paused => "paused",
        }
    }
}

impl fmt::Display for ExperimentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Experiment Definition describes one A/B experiment and its variants.
///
/// A definition always holds at least one variant, unique variant ids and
/// at most one control. These invariants are checked by
/// [`ExperimentDefinitionBuilder::build`] and on deserialization, so every
/// value of this type can be assigned from without further checks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "DefinitionRecord")]
pub struct ExperimentDefinition {
    id: String,
    name: String,
    entity_type: EntityType,
    status: ExperimentStatus,
    variants: Vec<Variant>,
    target_sample_size: Option<u64>,
    metrics: BTreeSet<String>,
    created_at: DateTime<Utc>,
}

impl ExperimentDefinition {
    /// Create a builder for an experiment definition.
    ///
    /// # Arguments
    ///
    /// * `id` - Stable identifier, also used in assignment-store keys
    /// * `name` - Human-readable name, used for registry lookup
    /// * `entity_type` - Surface the experiment applies to
    #[must_use]
    pub fn builder(
        id: impl Into<String>,
        name: impl Into<String>,
        entity_type: EntityType,
    ) -> ExperimentDefinitionBuilder {
        ExperimentDefinitionBuilder::new(id, name, entity_type)
    }

    /// Get the experiment ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the experiment name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the entity type.
    #[must_use]
    pub const fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    /// Get the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> ExperimentStatus {
        self.status
    }

    /// Get the variants in definition order (never empty).
    #[must_use]
    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    /// Find a variant by ID.
    #[must_use]
    pub fn variant(&self, variant_id: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.id() == variant_id)
    }

    /// Get the control variant, if one is defined.
    #[must_use]
    pub fn control(&self) -> Option<&Variant> {
        self.variants.iter().find(|v| v.is_control())
    }

    /// Get the target sample size, if any.
    #[must_use]
    pub const fn target_sample_size(&self) -> Option<u64> {
        self.target_sample_size
    }

    /// Get the tracked metric names.
    #[must_use]
    pub const fn metrics(&self) -> &BTreeSet<String> {
        &self.metrics
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether the experiment is currently serving traffic.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status == ExperimentStatus::Running
    }

    /// Change the weight of one variant.
    ///
    /// Existing assignments are unaffected; only subjects assigned after
    /// the change see the new distribution.
    ///
    /// # Errors
    ///
    /// Returns error if the variant does not exist or the weight is
    /// negative or non-finite.
    pub fn set_weight(&mut self, variant_id: &str, weight: f64) -> Result<()> {
        check_weight(variant_id, weight)?;
        if self.variant(variant_id).is_none() {
            return Err(Error::InvalidExperiment(format!(
                "unknown variant '{variant_id}'"
            )));
        }
        check_total(self.variants.iter().map(|v| {
            if v.id() == variant_id {
                weight
            } else {
                v.weight()
            }
        }))?;
        if let Some(variant) = self.variants.iter_mut().find(|v| v.id() == variant_id) {
            variant.set_weight(weight);
        }
        Ok(())
    }

    /// Start serving traffic (draft or paused -> running).
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` from any other status.
    pub fn start(&mut self) -> Result<()> {
        self.transition(
            &[ExperimentStatus::Draft, ExperimentStatus::Paused],
            ExperimentStatus::Running,
        )
    }

    /// Pause a running experiment.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the experiment is running.
    pub fn pause(&mut self) -> Result<()> {
        self.transition(&[ExperimentStatus::Running], ExperimentStatus::Paused)
    }

    /// Complete a running or paused experiment.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` from draft or completed.
    pub fn complete(&mut self) -> Result<()> {
        self.transition(
            &[ExperimentStatus::Running, ExperimentStatus::Paused],
            ExperimentStatus::Completed,
        )
    }

    fn transition(&mut self, allowed: &[ExperimentStatus], to: ExperimentStatus) -> Result<()> {
        if !allowed.contains(&self.status) {
            return Err(Error::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }
}

pub(super) fn check_weight(variant_id: &str, weight: f64) -> Result<()> {
    if weight.is_finite() && weight >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidExperiment(format!(
            "variant '{variant_id}' has invalid weight {weight}"
        )))
    }
}

pub(super) fn check_total(weights: impl Iterator<Item = f64>) -> Result<()> {
    let total: f64 = weights.sum();
    if total.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidExperiment(format!(
            "variant weights sum to {total}"
        )))
    }
}

fn validate(variants: &[Variant]) -> Result<()> {
    if variants.is_empty() {
        return Err(Error::InvalidExperiment(
            "experiment has no variants".to_string(),
        ));
    }

    let mut seen = HashSet::with_capacity(variants.len());
    for variant in variants {
        if !seen.insert(variant.id()) {
            return Err(Error::InvalidExperiment(format!(
                "duplicate variant id '{}'",
                variant.id()
            )));
        }
        check_weight(variant.id(), variant.weight())?;
    }
    check_total(variants.iter().map(Variant::weight))?;

    let controls = variants.iter().filter(|v| v.is_control()).count();
    if controls > 1 {
        return Err(Error::InvalidExperiment(format!(
            "{controls} variants are marked as control, at most one is allowed"
        )));
    }

    Ok(())
}

/// Wire shape of a definition before validation.
#[derive(Deserialize)]
struct DefinitionRecord {
    id: String,
    name: String,
    entity_type: EntityType,
    #[serde(default)]
    status: ExperimentStatus,
    variants: Vec<Variant>,
    #[serde(default)]
    target_sample_size: Option<u64>,
    #[serde(default)]
    metrics: BTreeSet<String>,
    #[serde(default = "Utc::now")]
    created_at: DateTime<Utc>,
}

impl TryFrom<DefinitionRecord> for ExperimentDefinition {
    type Error = Error;

    fn try_from(record: DefinitionRecord) -> Result<Self> {
        validate(&record.variants)?;
        Ok(Self {
            id: record.id,
            name: record.name,
            entity_type: record.entity_type,
            status: record.status,
            variants: record.variants,
            target_sample_size: record.target_sample_size,
            metrics: record.metrics,
            created_at: record.created_at,
        })
    }
}

/// Builder for `ExperimentDefinition`.
#[derive(Debug)]
pub struct ExperimentDefinitionBuilder {
    id: String,
    name: String,
    entity_type: EntityType,
    status: ExperimentStatus,
    variants: Vec<Variant>,
    target_sample_size: Option<u64>,
    metrics: BTreeSet<String>,
    created_at: DateTime<Utc>,
}

impl ExperimentDefinitionBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, entity_type: EntityType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            entity_type,
            status: ExperimentStatus::Draft,
            variants: Vec::new(),
            target_sample_size: None,
            metrics: BTreeSet::new(),
            created_at: Utc::now(),
        }
    }

    /// Append a variant (definition order is selection order).
    #[must_use]
    pub fn variant(mut self, variant: Variant) -> Self {
        self.variants.push(variant);
        self
    }

    /// Append several variants.
    #[must_use]
    pub fn variants(mut self, variants: impl IntoIterator<Item = Variant>) -> Self {
        self.variants.extend(variants);
        self
    }

    /// Set the initial status.
    #[must_use]
    pub const fn status(mut self, status: ExperimentStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the target sample size.
    #[must_use]
    pub const fn target_sample_size(mut self, size: u64) -> Self {
        self.target_sample_size = Some(size);
        self
    }

    /// Track a metric name.
    #[must_use]
    pub fn metric(mut self, metric: impl Into<String>) -> Self {
        self.metrics.insert(metric.into());
        self
    }

    /// Set a custom creation timestamp (useful for deserialization/testing).
    #[must_use]
    pub const fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Build the `ExperimentDefinition`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidExperiment` if the variant list is empty, has
    /// duplicate ids, more than one control, or a negative/non-finite weight.
    pub fn build(self) -> Result<ExperimentDefinition> {
        validate(&self.variants)?;
        Ok(ExperimentDefinition {
            id: self.id,
            name: self.name,
            entity_type: self.entity_type,
            status: self.status,
            variants: self.variants,
            target_sample_size: self.target_sample_size,
            metrics: self.metrics,
            created_at: self.created_at,
        })
    }
}
