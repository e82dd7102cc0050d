// SPDX-License-Identifier: MIT OR Apache-2.0
//! Curve commands.
//!
//! Each command resolves the curves it touches, computes and validates what
//! it can before mutating, then applies its operation curve by curve. Run
//! commands through [`CommandRunner`](crate::runner::CommandRunner) to get
//! undo/redo and rollback on failure.

use crate::error::{CommandError, Result};
use crate::policy::{plan_with_policy, InvalidAttrPolicy, Skipped};
use crate::provider::{dedup_curves, resolve_curves, resolve_ids, CurveProvider};
use animtools_curve::{
    check_ripple_uniformity, clean_curve, plan_breakdown, require_marked, retime, set_key,
    timing_strip, BreakdownMode, BreakdownOptions, BreakdownResult, CleanOptions, CleaningReport,
    CurveError, CurveId, KeyframeCurve, RetimeOptions, RetimeReport, SetKeyMode, SetKeyOptions,
    SetKeyResult, TimingStrip,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A batch operation over the curves of a provider
pub trait CurveCommand {
    /// Value returned by a successful run
    type Output;

    /// Get a description of this command
    fn description(&self) -> &str;

    /// Curves this command touches
    fn curves(&self, provider: &dyn CurveProvider) -> Result<Vec<CurveId>>;

    /// Execute the command on `curves`
    fn execute(&self, provider: &mut dyn CurveProvider, curves: &[CurveId]) -> Result<Self::Output>;
}

fn curve_mut(provider: &mut dyn CurveProvider, id: CurveId) -> Result<&mut KeyframeCurve> {
    provider.curve_mut(id).ok_or(CommandError::CurveNotFound(id))
}

/// Insert breakdowns on every selected curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownCommand {
    /// Target time
    pub time: f64,
    /// Weight, mode and marker
    pub options: BreakdownOptions,
    /// Failure handling
    pub policy: InvalidAttrPolicy,
    /// Skip the ripple uniformity check
    pub ignore_ripple_check: bool,
    /// Only break down highlighted attributes
    pub selected_attributes_only: bool,
}

impl BreakdownCommand {
    /// Create a breakdown at `time` with default options
    pub fn new(time: f64) -> Self {
        Self {
            time,
            options: BreakdownOptions::default(),
            policy: InvalidAttrPolicy::default(),
            ignore_ripple_check: false,
            selected_attributes_only: false,
        }
    }

    /// Set the breakdown options
    pub fn with_options(mut self, options: BreakdownOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the failure policy
    pub fn with_policy(mut self, policy: InvalidAttrPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Skip the ripple uniformity check
    pub fn with_ignore_ripple_check(mut self, ignore: bool) -> Self {
        self.ignore_ripple_check = ignore;
        self
    }

    /// Restrict to highlighted attributes
    pub fn with_selected_attributes_only(mut self, selected_only: bool) -> Self {
        self.selected_attributes_only = selected_only;
        self
    }
}

/// Outcome of a breakdown command
#[derive(Debug, Clone, PartialEq)]
pub struct BreakdownReport {
    /// Applied breakdowns in curve order
    pub results: Vec<(CurveId, BreakdownResult)>,
    /// Curves left out by the failure policy
    pub skipped: Vec<Skipped>,
    /// Where the playhead should move after a ripple
    pub playhead: Option<f64>,
}

impl CurveCommand for BreakdownCommand {
    type Output = BreakdownReport;

    fn description(&self) -> &str {
        "Breakdown"
    }

    fn curves(&self, provider: &dyn CurveProvider) -> Result<Vec<CurveId>> {
        let ids = match (self.selected_attributes_only, self.options.mode) {
            (true, BreakdownMode::Ripple) => {
                tracing::warn!("Ripple mode breaks down all selected curves, ignoring the attribute selection");
                provider.selection()
            }
            (true, BreakdownMode::Overwrite) => provider.selected_attributes(),
            (false, _) => provider.selection(),
        };
        resolve_ids(provider, ids)
    }

    fn execute(&self, provider: &mut dyn CurveProvider, curves: &[CurveId]) -> Result<BreakdownReport> {
        let outcome = plan_with_policy(&*provider, curves, self.policy, |curve| {
            plan_breakdown(curve, self.time, &self.options)
        })?;

        if !self.ignore_ripple_check {
            check_ripple_uniformity(outcome.planned.iter().map(|p| &p.value))?;
        }

        let mut results = Vec::with_capacity(outcome.planned.len());
        for planned in &outcome.planned {
            let curve = curve_mut(provider, planned.curve)?;
            let result = planned
                .value
                .apply(curve)
                .map_err(|e| CommandError::curve(planned.curve, e))?;
            results.push((planned.curve, result));
        }

        let playhead = match self.options.mode {
            BreakdownMode::Ripple => results.first().map(|(_, r)| r.playhead),
            BreakdownMode::Overwrite => None,
        };
        tracing::info!(
            breakdowns = results.len(),
            skipped = outcome.skipped.len(),
            mode = self.options.mode.name(),
            "Breakdown complete"
        );

        Ok(BreakdownReport {
            results,
            skipped: outcome.skipped,
            playhead,
        })
    }
}

/// Clean every selected curve
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CleanCurvesCommand {
    /// Cleaning options
    pub options: CleanOptions,
}

impl CleanCurvesCommand {
    /// Create a clean command
    pub fn new(options: CleanOptions) -> Self {
        Self { options }
    }
}

impl CurveCommand for CleanCurvesCommand {
    type Output = CleaningReport;

    fn description(&self) -> &str {
        "Clean Curves"
    }

    fn curves(&self, provider: &dyn CurveProvider) -> Result<Vec<CurveId>> {
        resolve_curves(provider)
    }

    fn execute(&self, provider: &mut dyn CurveProvider, curves: &[CurveId]) -> Result<CleaningReport> {
        let mut report = CleaningReport::default();
        for &id in curves {
            let curve = curve_mut(provider, id)?;
            report += clean_curve(curve, &self.options).map_err(|e| CommandError::curve(id, e))?;
        }
        tracing::info!(%report, "Clean complete");
        Ok(report)
    }
}

/// Retime keys of every selected curve within a range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetimeCommand {
    /// Range start
    pub start: f64,
    /// Range end
    pub end: f64,
    /// Delta and playhead behaviour
    pub options: RetimeOptions,
}

/// Outcome of a retime command
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RetimeSummary {
    /// Keys retimed over all curves
    pub keys_retimed: usize,
    /// Per-curve reports in curve order
    pub reports: Vec<(CurveId, RetimeReport)>,
    /// Playhead of the last curve that moved
    pub playhead: Option<f64>,
}

impl RetimeCommand {
    /// Create a retime command
    pub fn new(start: f64, end: f64, options: RetimeOptions) -> Self {
        Self {
            start,
            end,
            options,
        }
    }

    /// Describe the key spacing at `playhead` on every selected curve.
    ///
    /// Curves without keys are left out. An empty selection yields no strips.
    pub fn query(
        provider: &dyn CurveProvider,
        playhead: f64,
        animation_start: f64,
    ) -> Vec<(CurveId, TimingStrip)> {
        dedup_curves(provider.selection())
            .into_iter()
            .filter_map(|id| {
                let curve = provider.curve(id)?;
                match timing_strip(curve, playhead, animation_start) {
                    Ok(strip) => Some((id, strip)),
                    Err(error) => {
                        tracing::debug!(curve = %curve.name, %error, "No timing strip");
                        None
                    }
                }
            })
            .collect()
    }
}

impl CurveCommand for RetimeCommand {
    type Output = RetimeSummary;

    fn description(&self) -> &str {
        "Retime"
    }

    fn curves(&self, provider: &dyn CurveProvider) -> Result<Vec<CurveId>> {
        resolve_curves(provider)
    }

    fn execute(&self, provider: &mut dyn CurveProvider, curves: &[CurveId]) -> Result<RetimeSummary> {
        self.options.validate()?;
        if self.start > self.end {
            return Err(CurveError::InvalidRange {
                start: self.start,
                end: self.end,
            }
            .into());
        }

        let mut summary = RetimeSummary::default();
        for &id in curves {
            let curve = curve_mut(provider, id)?;
            let report = retime(curve, self.start, self.end, &self.options)
                .map_err(|e| CommandError::curve(id, e))?;
            summary.keys_retimed += report.keys_retimed;
            summary.playhead = report.playhead.or(summary.playhead);
            summary.reports.push((id, report));
        }

        tracing::info!(keys = summary.keys_retimed, "Retime complete");
        Ok(summary)
    }
}

/// Set keys and breakdown markers on every selected curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetKeyCommand {
    /// Key time
    pub time: f64,
    /// Attribute values at `time`, evaluated by the host
    pub values: IndexMap<CurveId, f64>,
    /// Mode and marker
    pub options: SetKeyOptions,
}

/// Outcome of a set key command
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SetKeyReport {
    /// Keys inserted
    pub keys_created: usize,
    /// Keys whose marker was written
    pub keys_marked: usize,
    /// Per-curve results in curve order
    pub results: Vec<(CurveId, SetKeyResult)>,
}

impl SetKeyCommand {
    /// Create a set key command without values
    pub fn new(time: f64, options: SetKeyOptions) -> Self {
        Self {
            time,
            values: IndexMap::new(),
            options,
        }
    }

    /// Set the value written to a curve
    pub fn with_value(mut self, curve: CurveId, value: f64) -> Self {
        self.values.insert(curve, value);
        self
    }
}

impl CurveCommand for SetKeyCommand {
    type Output = SetKeyReport;

    fn description(&self) -> &str {
        "Set Key"
    }

    fn curves(&self, provider: &dyn CurveProvider) -> Result<Vec<CurveId>> {
        resolve_curves(provider)
    }

    fn execute(&self, provider: &mut dyn CurveProvider, curves: &[CurveId]) -> Result<SetKeyReport> {
        let mut report = SetKeyReport::default();
        for &id in curves {
            let curve = curve_mut(provider, id)?;
            // Curves without a host value are only re-marked.
            let (value, options) = match self.values.get(&id) {
                Some(&value) => (value, self.options),
                None => (
                    0.0,
                    SetKeyOptions {
                        mode: SetKeyMode::Edit,
                        ..self.options
                    },
                ),
            };
            let result =
                set_key(curve, self.time, value, &options).map_err(|e| CommandError::curve(id, e))?;
            report.keys_created += usize::from(result.created_new_key);
            report.results.push((id, result));
        }

        let results: Vec<SetKeyResult> = report.results.iter().map(|(_, r)| *r).collect();
        report.keys_marked = require_marked(&results, self.time)?;
        tracing::info!(
            created = report.keys_created,
            marked = report.keys_marked,
            "Set key complete"
        );
        Ok(report)
    }
}
