// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe curve definitions.

use crate::binding::CurveBinding;
use crate::error::{CurveError, Result};
use crate::keyframe::Keyframe;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurveId(pub Uuid);

impl CurveId {
    /// Create a new random curve ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CurveId {
    fn default() -> Self {
        Self::new()
    }
}

/// Kind of attribute a curve animates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub enum CurveKind {
    /// Plain numeric attribute
    #[default]
    Scalar,
    /// Rotation stored in radians
    Angular,
    /// Boolean or enum attribute, never interpolated
    Boolean,
}

impl CurveKind {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Scalar => "Scalar",
            Self::Angular => "Angular",
            Self::Boolean => "Boolean",
        }
    }
}

/// An ordered sequence of keyframes with strictly increasing times
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyframeCurve {
    /// Unique curve ID
    pub id: CurveId,
    /// Curve name
    pub name: String,
    /// Attribute kind
    pub kind: CurveKind,
    /// Attribute binding
    pub binding: Option<CurveBinding>,
    /// Keyframes sorted by time
    keys: Vec<Keyframe>,
}

impl KeyframeCurve {
    /// Create a new empty curve
    pub fn new(name: impl Into<String>, kind: CurveKind) -> Self {
        Self {
            id: CurveId::new(),
            name: name.into(),
            kind,
            binding: None,
            keys: Vec::new(),
        }
    }

    /// Create a curve from keyframes.
    ///
    /// Keys must already be sorted with strictly increasing times.
    pub fn from_keys(name: impl Into<String>, kind: CurveKind, keys: Vec<Keyframe>) -> Result<Self> {
        if let Some(pair) = keys.windows(2).find(|pair| pair[1].time <= pair[0].time) {
            return Err(CurveError::TimeCollision { time: pair[1].time });
        }
        let mut curve = Self::new(name, kind);
        curve.keys = keys;
        Ok(curve)
    }

    /// Create a curve from `(time, value)` pairs with global tangents
    pub fn from_points(name: impl Into<String>, kind: CurveKind, points: &[(f64, f64)]) -> Result<Self> {
        let keys = points
            .iter()
            .map(|&(time, value)| Keyframe::new(time, value))
            .collect();
        Self::from_keys(name, kind, keys)
    }

    /// Set the attribute binding
    pub fn with_binding(mut self, binding: CurveBinding) -> Self {
        self.binding = Some(binding);
        self
    }

    /// Get keyframe count
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Check if the curve has no keys
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Whether breakdowns on this curve hold the previous value
    pub fn is_boolean(&self) -> bool {
        self.kind == CurveKind::Boolean
    }

    /// Get all keyframes
    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    /// Get keyframe by index
    pub fn key(&self, index: usize) -> Option<&Keyframe> {
        self.keys.get(index)
    }

    /// Get the first keyframe
    pub fn first(&self) -> Option<&Keyframe> {
        self.keys.first()
    }

    /// Get the last keyframe
    pub fn last(&self) -> Option<&Keyframe> {
        self.keys.last()
    }

    /// Time of the key at `index`
    pub fn time(&self, index: usize) -> Result<f64> {
        self.checked(index).map(|k| k.time)
    }

    /// Value of the key at `index`
    pub fn value(&self, index: usize) -> Result<f64> {
        self.checked(index).map(|k| k.value)
    }

    /// Value of the key at `index` in the unit used for comparisons.
    ///
    /// Angular curves compare in degrees.
    pub fn canonical_value(&self, index: usize) -> Result<f64> {
        let value = self.value(index)?;
        Ok(match self.kind {
            CurveKind::Angular => value.to_degrees(),
            CurveKind::Scalar | CurveKind::Boolean => value,
        })
    }

    /// Canonical values of every key, in order
    pub fn canonical_values(&self) -> Vec<f64> {
        self.keys
            .iter()
            .map(|k| match self.kind {
                CurveKind::Angular => k.value.to_degrees(),
                CurveKind::Scalar | CurveKind::Boolean => k.value,
            })
            .collect()
    }

    /// Find the key exactly at `time`
    pub fn find(&self, time: f64) -> Option<usize> {
        let index = self.keys.partition_point(|k| k.time < time);
        (index < self.keys.len() && self.keys[index].time == time).then_some(index)
    }

    /// Find the key closest in time to `time`.
    ///
    /// Ties resolve to the earlier key. Returns `None` for an empty curve.
    pub fn find_closest(&self, time: f64) -> Option<usize> {
        if self.keys.is_empty() {
            return None;
        }
        let after = self.keys.partition_point(|k| k.time < time);
        if after == 0 {
            return Some(0);
        }
        if after == self.keys.len() {
            return Some(after - 1);
        }
        let before = after - 1;
        let d_before = time - self.keys[before].time;
        let d_after = self.keys[after].time - time;
        Some(if d_after < d_before { after } else { before })
    }

    /// Insert a keyframe, keeping keys sorted.
    ///
    /// Returns the index of the inserted key.
    pub fn insert_key(&mut self, key: Keyframe) -> Result<usize> {
        if self.find(key.time).is_some() {
            return Err(CurveError::TimeCollision { time: key.time });
        }
        let index = self.keys.partition_point(|k| k.time < key.time);
        self.keys.insert(index, key);
        Ok(index)
    }

    /// Remove the keyframe at `index`
    pub fn remove_key(&mut self, index: usize) -> Result<Keyframe> {
        self.checked(index)?;
        Ok(self.keys.remove(index))
    }

    /// Set the value of the key at `index`
    pub fn set_value(&mut self, index: usize, value: f64) -> Result<()> {
        self.checked_mut(index)?.value = value;
        Ok(())
    }

    /// Move the key at `index` to `time`.
    ///
    /// The new time must stay strictly between the current neighbours.
    pub fn set_time(&mut self, index: usize, time: f64) -> Result<()> {
        self.checked(index)?;
        let after_previous = index == 0 || self.keys[index - 1].time < time;
        let before_next = index + 1 >= self.keys.len() || time < self.keys[index + 1].time;
        if !(after_previous && before_next) {
            return Err(CurveError::TimeCollision { time });
        }
        self.keys[index].time = time;
        Ok(())
    }

    /// Move the keys from `first` onwards to `times`, one time per key.
    ///
    /// The resulting curve must stay strictly increasing; nothing moves otherwise.
    pub fn set_times_from(&mut self, first: usize, times: &[f64]) -> Result<()> {
        let len = self.keys.len();
        let end = first + times.len();
        if end > len {
            return Err(CurveError::IndexOutOfRange { index: end - 1, len });
        }

        let before = first.checked_sub(1).map(|i| self.keys[i].time);
        let after = self.keys.get(end).map(|k| k.time);
        let mut previous = before;
        for &time in times.iter().chain(after.iter()) {
            if previous.is_some_and(|p| p >= time) {
                return Err(CurveError::TimeCollision { time });
            }
            previous = Some(time);
        }

        for (key, &time) in self.keys[first..end].iter_mut().zip(times) {
            key.time = time;
        }
        Ok(())
    }

    /// Shift every key from `first` onwards by `delta`.
    ///
    /// Keys move in an order that never crosses a neighbour.
    pub fn shift_keys_from(&mut self, first: usize, delta: f64) -> Result<()> {
        if first >= self.keys.len() || delta == 0.0 {
            return Ok(());
        }
        if delta > 0.0 {
            for index in (first..self.keys.len()).rev() {
                let time = self.keys[index].time + delta;
                self.set_time(index, time)?;
            }
        } else {
            for index in first..self.keys.len() {
                let time = self.keys[index].time + delta;
                self.set_time(index, time)?;
            }
        }
        Ok(())
    }

    /// Set the breakdown marker on the key at `index`, returning the previous value
    pub fn set_special_marker(&mut self, index: usize, special: bool) -> Result<bool> {
        Ok(self.checked_mut(index)?.replace_special_marker(special))
    }

    /// Iterate over key times
    pub fn times(&self) -> impl Iterator<Item = f64> + '_ {
        self.keys.iter().map(|k| k.time)
    }

    pub(crate) fn key_mut(&mut self, index: usize) -> Result<&mut Keyframe> {
        self.checked_mut(index)
    }

    fn checked(&self, index: usize) -> Result<&Keyframe> {
        let len = self.keys.len();
        self.keys
            .get(index)
            .ok_or(CurveError::IndexOutOfRange { index, len })
    }

    fn checked_mut(&mut self, index: usize) -> Result<&mut Keyframe> {
        let len = self.keys.len();
        self.keys
            .get_mut(index)
            .ok_or(CurveError::IndexOutOfRange { index, len })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn curve(points: &[(f64, f64)]) -> KeyframeCurve {
        KeyframeCurve::from_points("test", CurveKind::Scalar, points).unwrap()
    }

    #[test]
    fn test_rejects_unsorted_keys() {
        let err = KeyframeCurve::from_points("bad", CurveKind::Scalar, &[(0.0, 0.0), (0.0, 1.0)])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TimeCollision);
    }

    #[test]
    fn test_find_closest() {
        let c = curve(&[(0.0, 0.0), (10.0, 1.0), (20.0, 2.0)]);
        assert_eq!(c.find_closest(-5.0), Some(0));
        assert_eq!(c.find_closest(4.0), Some(0));
        assert_eq!(c.find_closest(5.0), Some(0));
        assert_eq!(c.find_closest(6.0), Some(1));
        assert_eq!(c.find_closest(10.0), Some(1));
        assert_eq!(c.find_closest(99.0), Some(2));
        assert_eq!(KeyframeCurve::new("empty", CurveKind::Scalar).find_closest(1.0), None);
    }

    #[test]
    fn test_insert_keeps_order() {
        let mut c = curve(&[(0.0, 0.0), (10.0, 1.0)]);
        assert_eq!(c.insert_key(Keyframe::new(5.0, 0.5)).unwrap(), 1);
        assert_eq!(c.times().collect::<Vec<_>>(), vec![0.0, 5.0, 10.0]);

        let err = c.insert_key(Keyframe::new(10.0, 3.0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TimeCollision);
    }

    #[test]
    fn test_set_time_rejects_crossing() {
        let mut c = curve(&[(0.0, 0.0), (10.0, 1.0), (20.0, 2.0)]);
        assert!(c.set_time(1, 20.0).is_err());
        assert!(c.set_time(1, 0.0).is_err());
        c.set_time(1, 19.0).unwrap();
        assert_eq!(c.time(1).unwrap(), 19.0);
    }

    #[test]
    fn test_shift_keys_from() {
        let mut c = curve(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]);
        c.shift_keys_from(1, 1.0).unwrap();
        assert_eq!(c.times().collect::<Vec<_>>(), vec![0.0, 2.0, 3.0, 4.0]);

        c.shift_keys_from(2, -0.5).unwrap();
        assert_eq!(c.times().collect::<Vec<_>>(), vec![0.0, 2.0, 2.5, 3.5]);
    }

    #[test]
    fn test_set_times_from() {
        let mut c = curve(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]);
        c.set_times_from(1, &[5.0, 6.0, 7.0]).unwrap();
        assert_eq!(c.times().collect::<Vec<_>>(), vec![0.0, 5.0, 6.0, 7.0]);

        let err = c.set_times_from(1, &[0.0]).unwrap_err();
        assert!(matches!(err, CurveError::TimeCollision { time } if time == 0.0));
        let err = c.set_times_from(2, &[8.0, 7.5]).unwrap_err();
        assert!(matches!(err, CurveError::TimeCollision { .. }));
        let err = c.set_times_from(3, &[9.0, 10.0]).unwrap_err();
        assert!(matches!(err, CurveError::IndexOutOfRange { index: 4, len: 4 }));
        assert_eq!(c.times().collect::<Vec<_>>(), vec![0.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn test_angular_canonical_values() {
        let c = KeyframeCurve::from_points(
            "rotateX",
            CurveKind::Angular,
            &[(0.0, std::f64::consts::PI)],
        )
        .unwrap();
        approx::assert_relative_eq!(c.canonical_value(0).unwrap(), 180.0);
    }
}
