// SPDX-License-Identifier: MIT OR Apache-2.0
//! Breakdown keys.
//!
//! A breakdown is an in-between key whose value sits between the previous
//! and next keys at a weight. Computing a breakdown is split into a pure
//! [`plan_breakdown`] step and [`BreakdownPlan::apply`], so a batch can be
//! validated before any curve is touched.

use crate::curve::{CurveId, KeyframeCurve};
use crate::error::{CurveError, Result};
use crate::keyframe::{Keyframe, TangentType};
use serde::{Deserialize, Serialize};

/// How a breakdown is placed on the curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub enum BreakdownMode {
    /// Set or insert a key at the target time, other keys stay put
    #[default]
    Overwrite,
    /// Shift later keys one frame and insert after the existing key
    Ripple,
}

impl BreakdownMode {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Overwrite => "Overwrite",
            Self::Ripple => "Ripple",
        }
    }
}

/// Keys surrounding a target time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyNeighbors {
    /// Key exactly at the target time
    pub original: Option<usize>,
    /// Key before the target time
    pub previous: Option<usize>,
    /// Key after the target time
    pub next: Option<usize>,
}

impl KeyNeighbors {
    /// Locate the neighbours of `time` on `curve`
    pub fn locate(curve: &KeyframeCurve, time: f64) -> Self {
        let Some(last) = curve.len().checked_sub(1) else {
            return Self::default();
        };

        if let Some(original) = curve.find(time) {
            return Self {
                original: Some(original),
                previous: original.checked_sub(1),
                next: (original < last).then_some(original + 1),
            };
        }

        let Some(closest) = curve.find_closest(time) else {
            return Self::default();
        };
        let closest_time = curve.keys()[closest].time;
        let previous = if closest_time < time {
            Some(closest)
        } else {
            closest.checked_sub(1)
        };
        let next = if closest_time > time {
            Some(closest)
        } else {
            (closest < last).then_some(closest + 1)
        };

        Self {
            original: None,
            previous,
            next,
        }
    }
}

/// Breakdown parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreakdownOptions {
    /// Interpolation weight, 0 is the previous key and 1 the next key
    pub weight: f64,
    /// Placement mode
    pub mode: BreakdownMode,
    /// Set the breakdown marker on the resulting key
    pub mark_special: bool,
}

impl Default for BreakdownOptions {
    fn default() -> Self {
        Self {
            weight: 0.5,
            mode: BreakdownMode::Overwrite,
            mark_special: false,
        }
    }
}

impl BreakdownOptions {
    /// Set the weight
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Set the mode
    pub fn with_mode(mut self, mode: BreakdownMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the breakdown marker flag
    pub fn with_mark_special(mut self, mark_special: bool) -> Self {
        self.mark_special = mark_special;
        self
    }
}

/// Where a planned breakdown lands
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Placement {
    /// Overwrite the value of the key at `index`
    Overwrite {
        /// Existing key index
        index: usize,
    },
    /// Insert a new key at `time`
    Insert {
        /// Target time
        time: f64,
    },
    /// Shift keys after `anchor` and insert one frame after it
    Ripple {
        /// Existing key index
        anchor: usize,
    },
}

/// A computed breakdown not yet applied to its curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownPlan {
    /// Curve the plan was computed for
    pub curve: CurveId,
    /// Requested target time
    pub time: f64,
    /// Placement mode
    pub mode: BreakdownMode,
    /// Breakdown value
    pub value: f64,
    /// Where the value goes
    pub placement: Placement,
    /// Set the breakdown marker when applied
    pub mark_special: bool,
    /// Out-tangent type for inserted keys
    pub out_tangent: TangentType,
}

impl BreakdownPlan {
    /// Whether a key already existed at the target time
    pub fn has_original_key(&self) -> bool {
        matches!(
            self.placement,
            Placement::Overwrite { .. } | Placement::Ripple { .. }
        )
    }

    /// Apply the plan to the curve it was computed for
    pub fn apply(&self, curve: &mut KeyframeCurve) -> Result<BreakdownResult> {
        let (index, created_new_key) = match self.placement {
            Placement::Overwrite { index } => {
                curve.set_value(index, self.value)?;
                (index, false)
            }
            Placement::Insert { time } => (curve.insert_key(self.new_key(time))?, true),
            Placement::Ripple { anchor } => {
                let time = curve.time(anchor)? + 1.0;
                curve.shift_keys_from(anchor + 1, 1.0)?;
                (curve.insert_key(self.new_key(time))?, true)
            }
        };

        let time = curve.time(index)?;
        let previous_marker = if self.mark_special {
            Some(curve.set_special_marker(index, true)?)
        } else {
            None
        };

        Ok(BreakdownResult {
            index,
            value: self.value,
            mode: self.mode,
            created_new_key,
            time,
            playhead: time,
            previous_marker,
        })
    }

    fn new_key(&self, time: f64) -> Keyframe {
        Keyframe::new(time, self.value).with_tangent_types(TangentType::Global, self.out_tangent)
    }
}

/// Outcome of an applied breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownResult {
    /// Index of the breakdown key
    pub index: usize,
    /// Breakdown value
    pub value: f64,
    /// Placement mode
    pub mode: BreakdownMode,
    /// A key was inserted rather than overwritten
    pub created_new_key: bool,
    /// Time of the breakdown key
    pub time: f64,
    /// Time the playhead should move to
    pub playhead: f64,
    /// Marker value before it was set, when marking was requested
    pub previous_marker: Option<bool>,
}

/// Compute a breakdown at `time` without touching the curve
pub fn plan_breakdown(
    curve: &KeyframeCurve,
    time: f64,
    options: &BreakdownOptions,
) -> Result<BreakdownPlan> {
    let neighbors = KeyNeighbors::locate(curve, time);
    let next = neighbors
        .next
        .ok_or(CurveError::NoKeyAfterTarget { time })?;

    let (anchor, placement) = match (options.mode, neighbors.original) {
        (BreakdownMode::Ripple, Some(original)) => {
            (original, Placement::Ripple { anchor: original })
        }
        (mode, original) => {
            let previous = neighbors
                .previous
                .ok_or(CurveError::NoKeyBeforeTarget { time })?;
            let placement = match (mode, original) {
                (BreakdownMode::Overwrite, Some(index)) => Placement::Overwrite { index },
                _ => Placement::Insert { time },
            };
            (previous, placement)
        }
    };

    let prev_value = curve.value(anchor)?;
    let next_value = curve.value(next)?;
    let (value, out_tangent) = if curve.is_boolean() {
        (prev_value, TangentType::Step)
    } else {
        (
            prev_value + (next_value - prev_value) * options.weight,
            TangentType::Global,
        )
    };

    Ok(BreakdownPlan {
        curve: curve.id,
        time,
        mode: options.mode,
        value,
        placement,
        mark_special: options.mark_special,
        out_tangent,
    })
}

/// Compute and apply a breakdown at `time`
pub fn insert_breakdown(
    curve: &mut KeyframeCurve,
    time: f64,
    options: &BreakdownOptions,
) -> Result<BreakdownResult> {
    plan_breakdown(curve, time, options)?.apply(curve)
}

/// Check that a ripple batch is all with or all without original keys.
///
/// Overwrite batches always pass.
pub fn check_ripple_uniformity<'a>(
    plans: impl IntoIterator<Item = &'a BreakdownPlan>,
) -> Result<()> {
    let mut ripple = plans
        .into_iter()
        .filter(|p| p.mode == BreakdownMode::Ripple);
    let Some(first) = ripple.next() else {
        return Ok(());
    };
    let expected = first.has_original_key();
    if ripple.any(|p| p.has_original_key() != expected) {
        return Err(CurveError::NonUniformRippleKeys { time: first.time });
    }
    Ok(())
}
