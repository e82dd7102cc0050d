// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command errors.

use crate::history::HistoryError;
use animtools_curve::{CurveError, CurveId};

/// Result type for command operations
pub type Result<T> = std::result::Result<T, CommandError>;

/// Error type for command execution
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// A curve operation failed
    #[error("Curve {curve:?}: {source}")]
    Curve {
        /// Failing curve
        curve: CurveId,
        /// Underlying error
        #[source]
        source: CurveError,
    },

    /// A check over the whole batch failed
    #[error(transparent)]
    Batch(#[from] CurveError),

    /// Curve missing from the provider
    #[error("Curve not found: {0:?}")]
    CurveNotFound(CurveId),

    /// No curves to operate on
    #[error("No curves selected")]
    EmptySelection,

    /// History error
    #[error("History error: {0}")]
    History(#[from] HistoryError),
}

impl CommandError {
    /// Attach a curve id to a curve error
    pub fn curve(curve: CurveId, source: CurveError) -> Self {
        Self::Curve { curve, source }
    }

    /// The curve error behind this error, if any
    pub fn curve_error(&self) -> Option<&CurveError> {
        match self {
            Self::Curve { source, .. } | Self::Batch(source) => Some(source),
            _ => None,
        }
    }
}
