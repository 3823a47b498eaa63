//! Variant assignment
//!
//! One selection algorithm serves both full experiments and slot tests:
//!
//! 1. `ForceControl` short-circuits to the control variant (or the first
//!    variant when none is marked control). Nothing is persisted.
//! 2. Otherwise a stored assignment for `(experiment, subject)` wins, as long
//!    as it still names an existing variant.
//! 3. Otherwise draw `r ∈ [0, Σweight)` and walk the variants in definition
//!    order, picking the first whose cumulative weight reaches `r`. If the
//!    walk exhausts (all weights zero, float edge), fall back as in 1.
//!    The pick is written to the store before it is returned.
//!
//! Store failures never reach the caller: a failed read is treated as
//! "unassigned", a failed write still returns the pick.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::experiment::Variant;
use crate::store::{assignment_key, AssignmentStore};

/// How a variant is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// Weighted random pick, sticky through the assignment store.
    #[default]
    Weighted,
    /// Always return control; the test is administratively disabled.
    ForceControl,
}

/// Control variant, or the first variant when none is marked control.
#[must_use]
pub fn fallback_variant(variants: &[Variant]) -> Option<&Variant> {
    variants
        .iter()
        .find(|v| v.is_control())
        .or_else(|| variants.first())
}

/// Pick a variant without consulting any store.
///
/// Returns `None` only for an empty slice.
pub fn select_variant<'a, R: Rng>(
    variants: &'a [Variant],
    rng: &mut R,
    mode: SelectionMode,
) -> Option<&'a Variant> {
    if mode == SelectionMode::ForceControl {
        return fallback_variant(variants);
    }

    let total_weight: f64 = variants.iter().map(Variant::weight).sum();
    if total_weight > 0.0 && total_weight.is_finite() {
        let r = rng.gen_range(0.0..total_weight);
        let mut cumulative = 0.0;
        for variant in variants {
            cumulative += variant.weight();
            if cumulative >= r {
                return Some(variant);
            }
        }
    }

    let fallback = fallback_variant(variants);
    if let Some(variant) = fallback {
        tracing::warn!(
            total_weight,
            variant_id = variant.id(),
            "weighted selection exhausted, using fallback variant"
        );
    }
    fallback
}

/// Sticky assigner: assignment store plus the random source it draws from.
#[derive(Debug)]
pub struct Assigner<S> {
    store: S,
    rng: StdRng,
    key_prefix: String,
}

impl<S: AssignmentStore> Assigner<S> {
    /// Create an assigner. `seed = None` draws the RNG seed from the OS.
    #[must_use]
    pub fn new(store: S, seed: Option<u64>, key_prefix: impl Into<String>) -> Self {
        let rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Self {
            store,
            rng,
            key_prefix: key_prefix.into(),
        }
    }

    /// Get the underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Store key for one `(experiment, subject)` pair.
    #[must_use]
    pub fn key(&self, experiment_id: &str, subject_id: &str) -> String {
        assignment_key(&self.key_prefix, experiment_id, subject_id)
    }

    /// Assign `subject_id` to one of `variants`.
    ///
    /// Returns `None` only for an empty slice.
    pub fn assign<'a>(
        &mut self,
        experiment_id: &str,
        variants: &'a [Variant],
        subject_id: &str,
        mode: SelectionMode,
    ) -> Option<&'a Variant> {
        if mode == SelectionMode::ForceControl {
            return select_variant(variants, &mut self.rng, mode);
        }

        let key = self.key(experiment_id, subject_id);

        if let Some(variant_id) = self.stored(&key) {
            if let Some(variant) = variants.iter().find(|v| v.id() == variant_id) {
                tracing::debug!(
                    experiment_id,
                    subject_id,
                    variant_id = variant.id(),
                    "sticky assignment"
                );
                return Some(variant);
            }
            tracing::warn!(
                experiment_id,
                subject_id,
                variant_id = %variant_id,
                "stored variant no longer exists, reassigning"
            );
        }

        let variant = select_variant(variants, &mut self.rng, mode)?;
        if let Err(e) = self.store.set(&key, variant.id()) {
            tracing::warn!(
                experiment_id,
                subject_id,
                variant_id = variant.id(),
                error = %e,
                "assignment not persisted"
            );
        }
        tracing::debug!(
            experiment_id,
            subject_id,
            variant_id = variant.id(),
            "new assignment"
        );
        Some(variant)
    }

    /// Read the stored variant id, treating store errors as "unassigned".
    #[must_use]
    pub fn stored(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "assignment lookup failed, treating as unassigned");
                None
            }
        }
    }
}
