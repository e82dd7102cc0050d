// SPDX-License-Identifier: MIT OR Apache-2.0
//! Batch curve commands for animtools.
//!
//! A host integration implements [`CurveProvider`] over its own curve
//! storage (or uses the in-memory [`CurveSet`]) and runs commands through a
//! [`CommandRunner`]:
//! - Selections are de-duplicated in order before any work starts
//! - Per-curve failures follow an [`InvalidAttrPolicy`]
//! - Every run is recorded for undo/redo and rolled back when it fails
//! - [`ToolSettings`] persist tool defaults as RON

pub mod commands;
pub mod error;
pub mod history;
pub mod policy;
pub mod provider;
pub mod runner;
pub mod settings;

pub use commands::{
    BreakdownCommand, BreakdownReport, CleanCurvesCommand, CurveCommand, RetimeCommand,
    RetimeSummary, SetKeyCommand, SetKeyReport,
};
pub use error::{CommandError, Result};
pub use history::{
    CurveChange, CurveSnapshot, History, HistoryError, HistoryStats, OperationGroup, OperationId,
};
pub use policy::{plan_with_policy, InvalidAttrPolicy, Planned, PolicyOutcome, Skipped};
pub use provider::{dedup_curves, resolve_curves, resolve_ids, CurveProvider, CurveSet};
pub use runner::CommandRunner;
pub use settings::{BreakdownSettings, SettingsError, ToolSettings, SETTINGS_FORMAT_VERSION};
