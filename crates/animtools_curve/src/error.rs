// SPDX-License-Identifier: MIT OR Apache-2.0
//! Curve operation errors.

use serde::{Deserialize, Serialize};

/// Result type for curve operations
pub type Result<T> = std::result::Result<T, CurveError>;

/// Errors returned by curve operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CurveError {
    /// No key after the target time
    #[error("No key set after time {time}")]
    NoKeyAfterTarget {
        /// Target time
        time: f64,
    },

    /// No key before the target time
    #[error("No key set before time {time}")]
    NoKeyBeforeTarget {
        /// Target time
        time: f64,
    },

    /// Ripple batch mixes curves with and without a key at the target time
    #[error("All curves must have a key set or no key set at time {time} in ripple mode")]
    NonUniformRippleKeys {
        /// Target time
        time: f64,
    },

    /// Retiming delta is not usable
    #[error("Absolute retiming delta must be at least 1, got {delta}")]
    InvalidDelta {
        /// Requested delta
        delta: f64,
    },

    /// Curve has fewer keys than the operation needs
    #[error("Curve has {found} keys, at least {required} required")]
    DegenerateCurve {
        /// Keys required
        required: usize,
        /// Keys on the curve
        found: usize,
    },

    /// Mutation would put two keys at the same time or break ordering
    #[error("Key time {time} collides with a neighbouring key")]
    TimeCollision {
        /// Offending time
        time: f64,
    },

    /// Retiming range starts after it ends
    #[error("Range start {start} is after range end {end}")]
    InvalidRange {
        /// Range start
        start: f64,
        /// Range end
        end: f64,
    },

    /// Key index outside the curve
    #[error("Key index {index} out of range for {len} keys")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of keys
        len: usize,
    },

    /// No key exists at the requested time
    #[error("No keys set at time {time}")]
    NoKeyAtTime {
        /// Requested time
        time: f64,
    },
}

/// Fieldless classification of a [`CurveError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// See [`CurveError::NoKeyAfterTarget`]
    NoKeyAfterTarget,
    /// See [`CurveError::NoKeyBeforeTarget`]
    NoKeyBeforeTarget,
    /// See [`CurveError::NonUniformRippleKeys`]
    NonUniformRippleKeys,
    /// See [`CurveError::InvalidDelta`]
    InvalidDelta,
    /// See [`CurveError::DegenerateCurve`]
    DegenerateCurve,
    /// See [`CurveError::TimeCollision`]
    TimeCollision,
    /// See [`CurveError::InvalidRange`]
    InvalidRange,
    /// See [`CurveError::IndexOutOfRange`]
    IndexOutOfRange,
    /// See [`CurveError::NoKeyAtTime`]
    NoKeyAtTime,
}

impl CurveError {
    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoKeyAfterTarget { .. } => ErrorKind::NoKeyAfterTarget,
            Self::NoKeyBeforeTarget { .. } => ErrorKind::NoKeyBeforeTarget,
            Self::NonUniformRippleKeys { .. } => ErrorKind::NonUniformRippleKeys,
            Self::InvalidDelta { .. } => ErrorKind::InvalidDelta,
            Self::DegenerateCurve { .. } => ErrorKind::DegenerateCurve,
            Self::TimeCollision { .. } => ErrorKind::TimeCollision,
            Self::InvalidRange { .. } => ErrorKind::InvalidRange,
            Self::IndexOutOfRange { .. } => ErrorKind::IndexOutOfRange,
            Self::NoKeyAtTime { .. } => ErrorKind::NoKeyAtTime,
        }
    }
}
