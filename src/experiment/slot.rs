//! Slot tests - fixed four-slot tests behind an enabled flag

use std::fmt;

use serde::{Deserialize, Serialize};

use super::definition::{check_total, check_weight};
use super::Variant;
use crate::{Error, Result};

/// Largest weight one slot can carry; four of them still sum to a finite total.
pub const MAX_SLOT_WEIGHT: f64 = f64::MAX / 4.0;

/// One of the four fixed variant slots of a [`SlotTest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantSlot {
    /// Baseline.
    Control,
    /// First challenger.
    VariantA,
    /// Second challenger.
    VariantB,
    /// Third challenger.
    VariantC,
}

impl VariantSlot {
    /// All slots in selection order.
    pub const ALL: [Self; 4] = [Self::Control, Self::VariantA, Self::VariantB, Self::VariantC];

    /// Get slot name as string (also the variant id it maps to)
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Control => "control",
            Self::VariantA => "variant_a",
            Self::VariantB => "variant_b",
            Self::VariantC => "variant_c",
        }
    }

    /// Parse a slot from its variant id.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.as_str() == id)
    }
}

impl fmt::Display for VariantSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lightweight test over the four fixed slots.
///
/// A disabled test always resolves to [`VariantSlot::Control`] without
/// consulting weights or the assignment store. Slots with zero weight are
/// never picked except through the zero-total fallback (which picks control).
///
/// Deserialization rejects negative, non-finite and overflowing weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SlotTestRecord")]
pub struct SlotTest {
    id: String,
    enabled: bool,
    weights: [f64; 4],
}

impl SlotTest {
    /// Create an enabled control/variant_a test with an even split.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            enabled: true,
            weights: [50.0, 50.0, 0.0, 0.0],
        }
    }

    /// Set the weight of one slot.
    ///
    /// Clamped into `[0, MAX_SLOT_WEIGHT]`; NaN counts as 0.
    #[must_use]
    pub fn with_weight(mut self, slot: VariantSlot, weight: f64) -> Self {
        self.weights[slot as usize] = if weight.is_nan() {
            0.0
        } else {
            weight.clamp(0.0, MAX_SLOT_WEIGHT)
        };
        self
    }

    /// Enable or disable the test.
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Get the test ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether the test is administratively enabled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Get the weight of one slot.
    #[must_use]
    pub const fn weight(&self, slot: VariantSlot) -> f64 {
        self.weights[slot as usize]
    }

    /// Expand into selectable variants (control first, zero weights kept).
    #[must_use]
    pub fn variants(&self) -> Vec<Variant> {
        VariantSlot::ALL
            .into_iter()
            .map(|slot| {
                let weight = self.weight(slot);
                if slot == VariantSlot::Control {
                    Variant::control(slot.as_str(), slot.as_str(), weight)
                } else {
                    Variant::new(slot.as_str(), slot.as_str(), weight)
                }
            })
            .collect()
    }
}

/// Wire shape of a slot test before validation.
#[derive(Deserialize)]
struct SlotTestRecord {
    id: String,
    enabled: bool,
    weights: [f64; 4],
}

impl TryFrom<SlotTestRecord> for SlotTest {
    type Error = Error;

    fn try_from(record: SlotTestRecord) -> Result<Self> {
        for slot in VariantSlot::ALL {
            check_weight(slot.as_str(), record.weights[slot as usize])?;
        }
        check_total(record.weights.into_iter())?;
        Ok(Self {
            id: record.id,
            enabled: record.enabled,
            weights: record.weights,
        })
    }
}
