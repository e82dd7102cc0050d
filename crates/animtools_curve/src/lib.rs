// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe curve algorithms for animtools.
//!
//! This crate provides the curve editing operations behind the tools:
//! - Breakdown keys in overwrite and ripple modes
//! - Redundant key removal
//! - Tangent cleaning with peak flattening and softened splines
//! - Retiming of key ranges
//! - Setting keys and breakdown markers
//!
//! ## Architecture
//!
//! Every operation works on a caller-owned [`KeyframeCurve`] and keeps no
//! state between calls. Curves are independent, so distinct curves can be
//! processed in any order or in parallel.

pub mod binding;
pub mod breakdown;
pub mod cleaner;
pub mod curve;
pub mod error;
pub mod keyer;
pub mod keyframe;
pub mod reduce;
pub mod retime;
pub mod tangents;

pub use binding::{CurveBinding, ObjectId};
pub use breakdown::{
    check_ripple_uniformity, insert_breakdown, plan_breakdown, BreakdownMode, BreakdownOptions,
    BreakdownPlan, BreakdownResult, KeyNeighbors, Placement,
};
pub use cleaner::{clean_curve, BoundaryTangent, CleanOptions, CleaningReport};
pub use curve::{CurveId, CurveKind, KeyframeCurve};
pub use error::{CurveError, ErrorKind, Result};
pub use keyer::{require_marked, set_key, write_key, SetKeyMode, SetKeyOptions, SetKeyResult};
pub use keyframe::{Keyframe, TangentSide, TangentType};
pub use reduce::remove_redundant_keys;
pub use retime::{retime, timing_strip, RetimeOptions, RetimeReport, TimingStrip};
pub use tangents::{classify_peaks, clean_tangents, spline_angle};
