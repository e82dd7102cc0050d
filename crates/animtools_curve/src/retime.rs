// SPDX-License-Identifier: MIT OR Apache-2.0
//! Retiming of keys within a time range.
//!
//! The key at or before the range start is the anchor and stays put. Keys
//! after it up to the first key at or after the range end are respaced, and
//! every key past the range moves by the same amount as the last retimed key.

use crate::curve::KeyframeCurve;
use crate::error::{CurveError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Retiming parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetimeOptions {
    /// Frames between keys, or frames added to each gap when relative
    pub delta: f64,
    /// Add `delta` to the existing spacing instead of replacing it
    pub relative: bool,
    /// Move the playhead to the last retimed key instead of the anchor
    pub next_key_on_complete: bool,
}

impl Default for RetimeOptions {
    fn default() -> Self {
        Self {
            delta: 1.0,
            relative: false,
            next_key_on_complete: false,
        }
    }
}

impl RetimeOptions {
    /// Absolute spacing of `delta` frames
    pub fn absolute(delta: f64) -> Self {
        Self {
            delta,
            ..Self::default()
        }
    }

    /// Relative spacing change of `delta` frames
    pub fn relative(delta: f64) -> Self {
        Self {
            delta,
            relative: true,
            ..Self::default()
        }
    }

    /// Set the playhead behaviour
    pub fn with_next_key_on_complete(mut self, next_key_on_complete: bool) -> Self {
        self.next_key_on_complete = next_key_on_complete;
        self
    }

    /// Check the delta is usable
    pub fn validate(&self) -> Result<()> {
        if !self.delta.is_finite() || (!self.relative && self.delta < 1.0) {
            return Err(CurveError::InvalidDelta { delta: self.delta });
        }
        Ok(())
    }
}

/// Outcome of retiming one curve
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RetimeReport {
    /// Keys given a new time, not counting shifted keys past the range
    pub keys_retimed: usize,
    /// Anchor key index
    pub first_index: usize,
    /// Last retimed key index
    pub last_index: usize,
    /// Where the playhead should move, `None` when nothing moved
    pub playhead: Option<f64>,
}

/// Anchor and last key indices for a range
fn retiming_indices(curve: &KeyframeCurve, start: f64, end: f64) -> Result<(usize, usize)> {
    if start > end {
        return Err(CurveError::InvalidRange { start, end });
    }
    let degenerate = || CurveError::DegenerateCurve {
        required: 1,
        found: curve.len(),
    };

    let closest = curve.find_closest(start).ok_or_else(degenerate)?;
    let first = if curve.time(closest)? > start && closest > 0 {
        closest - 1
    } else {
        closest
    };

    let closest = curve.find_closest(end).ok_or_else(degenerate)?;
    let last = if curve.time(closest)? < end && closest + 1 < curve.len() {
        closest + 1
    } else {
        closest
    };

    if first > last {
        return Err(CurveError::InvalidRange { start, end });
    }
    Ok((first, last))
}

/// New time of a key from its original time and the previous key's move
fn next_time(options: &RetimeOptions, orig: f64, prev_orig: f64, prev_new: f64) -> f64 {
    if options.relative {
        let shifted = orig + options.delta + (prev_new - prev_orig);
        if shifted - prev_new < 1.0 {
            prev_new + 1.0
        } else {
            shifted
        }
    } else {
        prev_new + options.delta
    }
}

/// Retime the keys of `curve` in `[start, end]`
pub fn retime(
    curve: &mut KeyframeCurve,
    start: f64,
    end: f64,
    options: &RetimeOptions,
) -> Result<RetimeReport> {
    options.validate()?;
    let (first, last) = retiming_indices(curve, start, end)?;
    let mut report = RetimeReport {
        first_index: first,
        last_index: last,
        ..RetimeReport::default()
    };
    if first == last {
        return Ok(report);
    }

    let anchor = curve.time(first)?;
    let mut times = Vec::with_capacity(curve.len() - first - 1);
    let (mut prev_orig, mut prev_new) = (anchor, anchor);
    for orig in curve.times().skip(first + 1).take(last - first) {
        let new = next_time(options, orig, prev_orig, prev_new);
        times.push(new);
        prev_orig = orig;
        prev_new = new;
    }
    // Keys past the range keep their spacing to the last retimed key.
    let shift = prev_new - prev_orig;
    times.extend(curve.times().skip(last + 1).map(|t| t + shift));
    curve.set_times_from(first + 1, &times)?;

    report.keys_retimed = last - first;
    report.playhead = Some(if options.next_key_on_complete {
        prev_new
    } else {
        anchor
    });
    tracing::debug!(
        curve = %curve.name,
        keys = report.keys_retimed,
        first,
        last,
        "Retimed curve"
    );
    Ok(report)
}

/// Spacing of keys around the playhead
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TimingStrip {
    /// Playhead before the first key, `spacing` frames after animation start
    BeforeFirst {
        /// Offset of the first key from the animation start
        spacing: f64,
    },
    /// Playhead between keys
    On {
        /// Key at or before the playhead
        frame: f64,
        /// Frames to the next key
        spacing: f64,
    },
    /// Playhead on or after the last key
    End {
        /// Last key time
        frame: f64,
    },
}

impl fmt::Display for TimingStrip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BeforeFirst { spacing } => write!(f, "None on {spacing}"),
            Self::On { frame, spacing } => write!(f, "{frame} on {spacing}"),
            Self::End { frame } => write!(f, "{frame} on End"),
        }
    }
}

/// Describe the key spacing at `playhead`
pub fn timing_strip(curve: &KeyframeCurve, playhead: f64, animation_start: f64) -> Result<TimingStrip> {
    let (first, last) = retiming_indices(curve, playhead, playhead + 1.0)?;
    let first_frame = curve.time(first)?;
    let last_frame = curve.time(last)?;

    Ok(if first != last {
        TimingStrip::On {
            frame: first_frame,
            spacing: last_frame - first_frame,
        }
    } else if playhead >= last_frame {
        TimingStrip::End { frame: first_frame }
    } else {
        TimingStrip::BeforeFirst {
            spacing: first_frame - animation_start,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::CurveKind;
    use crate::error::ErrorKind;

    fn curve(times: &[f64]) -> KeyframeCurve {
        let points: Vec<_> = times.iter().map(|&t| (t, t * 2.0)).collect();
        KeyframeCurve::from_points("test", CurveKind::Scalar, &points).unwrap()
    }

    fn times(curve: &KeyframeCurve) -> Vec<f64> {
        curve.times().collect()
    }

    fn assert_increasing(curve: &KeyframeCurve) {
        let t = times(curve);
        assert!(t.windows(2).all(|w| w[0] < w[1]), "not increasing: {t:?}");
    }

    #[test]
    fn test_absolute_collapses_spacing() {
        let mut c = curve(&[4.0, 5.0, 10.0, 15.0, 20.0]);
        let report = retime(&mut c, 4.0, 15.0, &RetimeOptions::absolute(1.0)).unwrap();

        assert_eq!(times(&c), vec![4.0, 5.0, 6.0, 7.0, 12.0]);
        assert_eq!(report.keys_retimed, 3);
        assert_eq!(report.first_index, 0);
        assert_eq!(report.last_index, 3);
        assert_eq!(report.playhead, Some(4.0));
    }

    #[test]
    fn test_anchor_before_range_start() {
        let mut c = curve(&[4.0, 5.0, 10.0, 15.0]);
        let report = retime(&mut c, 4.8, 15.0, &RetimeOptions::absolute(2.0)).unwrap();

        assert_eq!(report.first_index, 0);
        assert_eq!(times(&c), vec![4.0, 6.0, 8.0, 10.0]);
    }

    #[test]
    fn test_absolute_expansion_moves_neighbors_first() {
        let mut c = curve(&[0.0, 1.0, 2.0, 3.0, 10.0]);
        let options = RetimeOptions::absolute(10.0).with_next_key_on_complete(true);
        let report = retime(&mut c, 0.0, 3.0, &options).unwrap();

        assert_eq!(times(&c), vec![0.0, 10.0, 20.0, 30.0, 37.0]);
        assert_eq!(report.playhead, Some(30.0));
        assert_eq!(c.value(4).unwrap(), 20.0);
    }

    #[test]
    fn test_relative_shifts_spacing() {
        let mut c = curve(&[0.0, 10.0, 20.0, 30.0]);
        retime(&mut c, 0.0, 20.0, &RetimeOptions::relative(2.0)).unwrap();
        assert_eq!(times(&c), vec![0.0, 12.0, 24.0, 34.0]);
    }

    #[test]
    fn test_relative_keeps_one_frame_gap() {
        let mut c = curve(&[0.0, 10.0, 12.0, 30.0]);
        retime(&mut c, 0.0, 12.0, &RetimeOptions::relative(-5.0)).unwrap();
        assert_eq!(times(&c), vec![0.0, 5.0, 6.0, 24.0]);
        assert_increasing(&c);
    }

    #[test]
    fn test_monotonic_for_many_deltas() {
        for delta in [-7.0, -3.0, -1.0, 0.0, 1.0, 2.0, 9.0] {
            let mut c = curve(&[0.0, 2.0, 3.0, 8.0, 9.0, 15.0, 40.0]);
            retime(&mut c, 2.0, 9.0, &RetimeOptions::relative(delta)).unwrap();
            assert_increasing(&c);
        }
        for delta in [1.0, 3.0, 12.0] {
            let mut c = curve(&[0.0, 2.0, 3.0, 8.0, 9.0, 15.0, 40.0]);
            retime(&mut c, 2.0, 9.0, &RetimeOptions::absolute(delta)).unwrap();
            assert_increasing(&c);
        }
    }

    #[test]
    fn test_nothing_to_retime() {
        let mut c = curve(&[0.0, 10.0]);
        let report = retime(&mut c, 12.0, 14.0, &RetimeOptions::default()).unwrap();
        assert_eq!(report.keys_retimed, 0);
        assert_eq!(report.playhead, None);
        assert_eq!(times(&c), vec![0.0, 10.0]);
    }

    #[test]
    fn test_invalid_inputs() {
        let mut c = curve(&[0.0, 10.0]);
        let err = retime(&mut c, 0.0, 10.0, &RetimeOptions::absolute(0.0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDelta);

        let err = retime(&mut c, 10.0, 0.0, &RetimeOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRange);

        let mut empty = KeyframeCurve::new("empty", CurveKind::Scalar);
        let err = retime(&mut empty, 0.0, 1.0, &RetimeOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DegenerateCurve);
    }

    #[test]
    fn test_retime_long_curve() {
        let count: u32 = 10_000;
        let keys: Vec<f64> = (0..count).map(|i| f64::from(i) * 2.0).collect();
        let mut c = curve(&keys);
        let report = retime(&mut c, 0.0, keys[keys.len() - 1], &RetimeOptions::absolute(1.0)).unwrap();

        assert_eq!(report.keys_retimed, 9_999);
        assert_eq!(c.time(9_999).unwrap(), 9_999.0);
        assert_eq!(c.time(5_000).unwrap(), 5_000.0);
        assert_increasing(&c);

        let mut c = curve(&keys);
        retime(&mut c, 0.0, 10_000.0, &RetimeOptions::relative(3.0)).unwrap();
        assert_eq!(c.time(5_000).unwrap(), 25_000.0);
        assert_eq!(c.time(9_999).unwrap(), 34_998.0);
        assert_increasing(&c);
    }

    #[test]
    fn test_timing_strip() {
        let c = curve(&[10.0, 14.0, 20.0]);

        let strip = timing_strip(&c, 12.0, 1.0).unwrap();
        assert_eq!(strip, TimingStrip::On { frame: 10.0, spacing: 4.0 });
        assert_eq!(strip.to_string(), "10 on 4");

        assert_eq!(timing_strip(&c, 20.0, 1.0).unwrap().to_string(), "20 on End");
        assert_eq!(timing_strip(&c, 25.0, 1.0).unwrap().to_string(), "20 on End");
        assert_eq!(timing_strip(&c, 2.0, 1.0).unwrap().to_string(), "None on 9");
    }
}
