// SPDX-License-Identifier: MIT OR Apache-2.0
//! Redundant key removal.

use crate::curve::KeyframeCurve;
use crate::error::Result;

/// Remove interior keys whose value equals both neighbours.
///
/// Values are compared exactly in canonical units. The first and last keys
/// are never removed. Returns the number of keys removed.
pub fn remove_redundant_keys(curve: &mut KeyframeCurve) -> Result<usize> {
    if curve.len() < 3 {
        return Ok(0);
    }

    let times: Vec<f64> = curve.times().collect();
    let values = curve.canonical_values();
    let mut prev_value = values[0];
    let mut removed = 0;

    for i in 1..values.len() - 1 {
        let current = values[i];
        if current == prev_value && current == values[i + 1] {
            if let Some(index) = curve.find(times[i]) {
                curve.remove_key(index)?;
                removed += 1;
                tracing::trace!(curve = %curve.name, time = times[i], "Removed redundant key");
            }
        } else {
            prev_value = current;
        }
    }

    Ok(removed)
}
