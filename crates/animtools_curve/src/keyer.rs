// SPDX-License-Identifier: MIT OR Apache-2.0
//! Setting keys and breakdown markers at a time.

use crate::curve::KeyframeCurve;
use crate::error::{CurveError, Result};
use crate::keyframe::{Keyframe, TangentType};
use serde::{Deserialize, Serialize};

/// Whether keys are written or only re-marked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub enum SetKeyMode {
    /// Write a key, then mark it
    #[default]
    Create,
    /// Only change the marker of existing keys
    Edit,
}

/// Set key parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SetKeyOptions {
    /// Create or edit
    pub mode: SetKeyMode,
    /// Leave curves without keys alone
    pub ignore_unkeyed: bool,
    /// Marker value written to the key at the time
    pub mark_special: bool,
}

/// Outcome of setting a key on one curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SetKeyResult {
    /// Key at the time after the operation
    pub index: Option<usize>,
    /// A key was inserted
    pub created_new_key: bool,
    /// Marker value before it was written, when a key was marked
    pub previous_marker: Option<bool>,
}

impl SetKeyResult {
    /// Whether the marker pass touched this curve
    pub fn marked(&self) -> bool {
        self.previous_marker.is_some()
    }
}

/// Write `value` at `time`, overwriting an existing key.
///
/// Returns the key index and whether it was inserted.
pub fn write_key(curve: &mut KeyframeCurve, time: f64, value: f64) -> Result<(usize, bool)> {
    if let Some(index) = curve.find(time) {
        curve.set_value(index, value)?;
        return Ok((index, false));
    }
    let out_tangent = if curve.is_boolean() {
        TangentType::Step
    } else {
        TangentType::Global
    };
    let key = Keyframe::new(time, value).with_tangent_types(TangentType::Global, out_tangent);
    Ok((curve.insert_key(key)?, true))
}

/// Set a key at `time` and write its marker.
///
/// `value` is ignored in edit mode.
pub fn set_key(
    curve: &mut KeyframeCurve,
    time: f64,
    value: f64,
    options: &SetKeyOptions,
) -> Result<SetKeyResult> {
    let mut result = SetKeyResult::default();

    let skip = options.ignore_unkeyed && curve.is_empty();
    if options.mode == SetKeyMode::Create && !skip {
        let (_, created) = write_key(curve, time, value)?;
        result.created_new_key = created;
    }

    if let Some(index) = curve.find(time) {
        result.index = Some(index);
        result.previous_marker = Some(curve.set_special_marker(index, options.mark_special)?);
    }
    Ok(result)
}

/// Count marked curves, failing when none were touched
pub fn require_marked(results: &[SetKeyResult], time: f64) -> Result<usize> {
    match results.iter().filter(|r| r.marked()).count() {
        0 => Err(CurveError::NoKeyAtTime { time }),
        count => Ok(count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::CurveKind;
    use crate::error::ErrorKind;

    #[test]
    fn test_create_inserts_and_marks() {
        let mut c = KeyframeCurve::from_points("tx", CurveKind::Scalar, &[(0.0, 0.0), (10.0, 1.0)]).unwrap();
        let options = SetKeyOptions {
            mark_special: true,
            ..SetKeyOptions::default()
        };
        let result = set_key(&mut c, 5.0, 0.25, &options).unwrap();

        assert!(result.created_new_key);
        assert_eq!(result.index, Some(1));
        assert_eq!(result.previous_marker, Some(false));
        let key = c.key(1).unwrap();
        assert_eq!(key.value, 0.25);
        assert!(key.special_marker);
    }

    #[test]
    fn test_boolean_key_steps() {
        let mut c = KeyframeCurve::new("visibility", CurveKind::Boolean);
        let (index, created) = write_key(&mut c, 3.0, 1.0).unwrap();
        assert!(created);
        assert_eq!(c.key(index).unwrap().out_tangent_type, TangentType::Step);
    }

    #[test]
    fn test_edit_only_marks_existing() {
        let mut c = KeyframeCurve::from_points("tx", CurveKind::Scalar, &[(0.0, 0.0), (10.0, 1.0)]).unwrap();
        c.set_special_marker(1, true).unwrap();
        let options = SetKeyOptions {
            mode: SetKeyMode::Edit,
            ..SetKeyOptions::default()
        };

        let result = set_key(&mut c, 10.0, 99.0, &options).unwrap();
        assert_eq!(result.previous_marker, Some(true));
        assert!(!c.key(1).unwrap().special_marker);
        assert_eq!(c.value(1).unwrap(), 1.0);

        let result = set_key(&mut c, 4.0, 99.0, &options).unwrap();
        assert!(!result.marked());
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn test_ignore_unkeyed() {
        let mut c = KeyframeCurve::new("ty", CurveKind::Scalar);
        let options = SetKeyOptions {
            ignore_unkeyed: true,
            ..SetKeyOptions::default()
        };
        let result = set_key(&mut c, 1.0, 2.0, &options).unwrap();
        assert!(c.is_empty());
        assert!(!result.marked());

        let err = require_marked(&[result], 1.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoKeyAtTime);
    }
}
