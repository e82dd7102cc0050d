// SPDX-License-Identifier: MIT OR Apache-2.0
//! Curve cleaning pass combining redundant key removal and tangent cleaning.

use crate::curve::KeyframeCurve;
use crate::error::Result;
use crate::keyframe::TangentType;
use crate::reduce::remove_redundant_keys;
use crate::tangents::clean_tangents;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::AddAssign;

/// Tangent type for the first and last keys of a cleaned curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub enum BoundaryTangent {
    /// Spline tangents
    #[default]
    Spline,
    /// Flat tangents
    Flat,
}

impl BoundaryTangent {
    /// Get the keyframe tangent type
    pub fn tangent_type(&self) -> TangentType {
        match self {
            Self::Spline => TangentType::Spline,
            Self::Flat => TangentType::Flat,
        }
    }
}

/// Cleaning parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CleanOptions {
    /// Run the tangent cleaner
    pub clean_tangents: bool,
    /// Run the redundant key reducer first
    pub remove_redundant_keys: bool,
    /// Tangent type for the first and last keys
    pub boundary_tangent: BoundaryTangent,
    /// Softness applied to splines next to peaks, in `[0, 1]`
    pub smoothness: f64,
    /// Soften every spline, not only those next to peaks
    pub smooth_all_splines: bool,
    /// Scale applied to recomputed tangent weights
    pub weight_factor: f64,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            clean_tangents: true,
            remove_redundant_keys: false,
            boundary_tangent: BoundaryTangent::Spline,
            smoothness: 0.0,
            smooth_all_splines: false,
            weight_factor: 1.0 / 3.0,
        }
    }
}

impl CleanOptions {
    /// Options with tangent cleaning turned on when neither pass is requested
    pub fn normalized(mut self) -> Self {
        if !self.clean_tangents && !self.remove_redundant_keys {
            self.clean_tangents = true;
        }
        self
    }
}

/// Counts gathered by a cleaning pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CleaningReport {
    /// Curves visited
    pub curves_visited: usize,
    /// Redundant keys removed
    pub keys_removed: usize,
    /// Curves whose tangents were cleaned
    pub curves_cleaned: usize,
}

impl AddAssign for CleaningReport {
    fn add_assign(&mut self, other: Self) {
        self.curves_visited += other.curves_visited;
        self.keys_removed += other.keys_removed;
        self.curves_cleaned += other.curves_cleaned;
    }
}

impl fmt::Display for CleaningReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} curves visited, {} keys removed, {} curves cleaned",
            self.curves_visited, self.keys_removed, self.curves_cleaned
        )
    }
}

/// Clean one curve.
///
/// Redundant keys are removed before tangents are cleaned.
pub fn clean_curve(curve: &mut KeyframeCurve, options: &CleanOptions) -> Result<CleaningReport> {
    let options = options.normalized();
    let mut report = CleaningReport {
        curves_visited: 1,
        ..CleaningReport::default()
    };

    if options.remove_redundant_keys {
        report.keys_removed = remove_redundant_keys(curve)?;
    }
    if options.clean_tangents && clean_tangents(curve, &options)? {
        report.curves_cleaned = 1;
    }

    tracing::debug!(curve = %curve.name, %report, "Cleaned curve");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::CurveKind;

    #[test]
    fn test_normalized_defaults_to_tangents() {
        let options = CleanOptions {
            clean_tangents: false,
            remove_redundant_keys: false,
            ..CleanOptions::default()
        }
        .normalized();
        assert!(options.clean_tangents);

        let options = CleanOptions {
            clean_tangents: false,
            remove_redundant_keys: true,
            ..CleanOptions::default()
        }
        .normalized();
        assert!(!options.clean_tangents);
    }

    #[test]
    fn test_clean_curve_report() {
        let mut curve = KeyframeCurve::from_points(
            "translateY",
            CurveKind::Scalar,
            &[(0.0, 0.0), (5.0, 5.0), (10.0, 5.0), (15.0, 5.0), (20.0, 0.0)],
        )
        .unwrap();
        let options = CleanOptions {
            remove_redundant_keys: true,
            ..CleanOptions::default()
        };

        let report = clean_curve(&mut curve, &options).unwrap();
        assert_eq!(report.keys_removed, 1);
        assert_eq!(report.curves_cleaned, 1);
        assert_eq!(curve.len(), 4);
        assert_eq!(curve.key(1).unwrap().in_tangent_type, TangentType::Flat);
    }

    #[test]
    fn test_report_add_assign() {
        let mut total = CleaningReport::default();
        total += CleaningReport {
            curves_visited: 1,
            keys_removed: 2,
            curves_cleaned: 1,
        };
        total += CleaningReport {
            curves_visited: 1,
            keys_removed: 0,
            curves_cleaned: 0,
        };
        assert_eq!(total.curves_visited, 2);
        assert_eq!(total.keys_removed, 2);
        assert_eq!(total.curves_cleaned, 1);
    }
}
