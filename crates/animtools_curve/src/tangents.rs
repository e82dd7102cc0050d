// SPDX-License-Identifier: MIT OR Apache-2.0
//! Tangent cleaning.
//!
//! Peaks and valleys get flat tangents. Every other interior key is splined,
//! and splines next to a peak or valley are softened and reweighted to avoid
//! overshoot. The first and last keys take the boundary tangent type.

use crate::cleaner::CleanOptions;
use crate::curve::KeyframeCurve;
use crate::error::Result;
use crate::keyframe::{TangentSide, TangentType};

/// Mark keys that are local peaks or valleys.
///
/// Runs of equal values compare against the nearest differing value on each
/// side. The first and last keys are never marked.
pub fn classify_peaks(values: &[f64]) -> Vec<bool> {
    let mut peaks = vec![false; values.len()];
    if values.len() < 3 {
        return peaks;
    }

    let mut prev_inequal = values[0];
    for i in 1..values.len() - 1 {
        let current = values[i];
        if current != values[i - 1] {
            prev_inequal = values[i - 1];
        }

        let next_inequal = if current != values[i + 1] {
            values[i + 1]
        } else {
            values[i + 2..]
                .iter()
                .copied()
                .find(|&v| v != current)
                .unwrap_or(current)
        };

        peaks[i] = (current <= prev_inequal && current <= next_inequal)
            || (current >= prev_inequal && current >= next_inequal);
    }
    peaks
}

/// Slope angle in radians between two points
fn slope_angle(time1: f64, value1: f64, time2: f64, value2: f64) -> f64 {
    ((value2 - value1) / (time2 - time1)).atan()
}

/// Tangent angle for a splined key.
///
/// The smaller magnitude of the two slopes wins. Softness moves it towards
/// the other slope by `smoothness` of their difference.
pub fn spline_angle(angle_in: f64, angle_out: f64, smoothness: f64, soften: bool) -> f64 {
    let base = if angle_out.abs() > angle_in.abs() {
        angle_in
    } else {
        angle_out
    };
    if !soften {
        return base;
    }

    let softness = (angle_out - angle_in).abs() * smoothness;
    // The sign follows the in-slope only, whichever slope is steeper.
    let rising = angle_in > 0.0 || (angle_in == 0.0 && angle_out > 0.0);
    if rising {
        base + softness
    } else {
        base - softness
    }
}

/// Clean the tangents of every key on `curve`.
///
/// Returns `false` when the curve has no keys.
pub fn clean_tangents(curve: &mut KeyframeCurve, options: &CleanOptions) -> Result<bool> {
    let len = curve.len();
    if len == 0 {
        return Ok(false);
    }

    let boundary = options.boundary_tangent.tangent_type();
    curve.key_mut(0)?.set_tangent_types(boundary);
    curve.key_mut(len - 1)?.set_tangent_types(boundary);
    if len < 3 {
        return Ok(true);
    }

    let times: Vec<f64> = curve.times().collect();
    let values = curve.canonical_values();
    let peaks = classify_peaks(&values);

    for i in 1..len - 1 {
        let key = curve.key_mut(i)?;
        if peaks[i] {
            key.set_tangent_types(TangentType::Flat);
            continue;
        }

        let angle_in = slope_angle(times[i - 1], values[i - 1], times[i], values[i]);
        let angle_out = slope_angle(times[i], values[i], times[i + 1], values[i + 1]);
        let soften = options.smooth_all_splines || peaks[i - 1] || peaks[i + 1];
        let angle = spline_angle(angle_in, angle_out, options.smoothness, soften);

        key.set_tangent_types(TangentType::Spline);
        key.with_unlocked(|k| {
            k.set_angle(TangentSide::In, angle);
            k.set_angle(TangentSide::Out, angle);
            if soften {
                let in_weight = (times[i] - times[i - 1]) / angle.cos() * options.weight_factor;
                let out_weight = (times[i + 1] - times[i]) / angle.cos() * options.weight_factor;
                k.set_weight(TangentSide::In, in_weight);
                k.set_weight(TangentSide::Out, out_weight);
                tracing::trace!(index = i, in_weight, out_weight, "Reweighted spline tangent");
            }
        });
    }

    Ok(true)
}
